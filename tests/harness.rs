//! Test harness for statdiff integration tests

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

pub use statdiff::test_utils::{Side, TreePair};

/// Run the binary from `dir`, returning (stdout, stderr, exit code).
pub fn run_statdiff(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let binary = env!("CARGO_BIN_EXE_statdiff");
    let output = Command::new(binary)
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run statdiff");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Compare `old` against `new` in a pair, with extra arguments first.
pub fn run_pair(pair: &TreePair, args: &[&str]) -> (String, String, i32) {
    let mut all: Vec<&str> = args.to_vec();
    all.push("old");
    all.push("new");
    run_statdiff(pair.path(), &all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_creates_both_roots() {
        let pair = TreePair::new();
        assert!(pair.old_root().is_dir());
        assert!(pair.new_root().is_dir());
    }

    #[test]
    fn test_harness_add_file() {
        let pair = TreePair::new();
        let path = pair.add_file(Side::New, "a/b/c.txt", "hello");
        assert!(path.exists());
        assert!(!pair.old_root().join("a").exists());
    }

    #[test]
    fn test_harness_mirror() {
        let pair = TreePair::new();
        pair.add_file(Side::Old, "x/y", "data");
        pair.mirror_old();
        assert_eq!(
            std::fs::read_to_string(pair.new_root().join("x/y")).unwrap(),
            "data"
        );
    }
}
