//! Test utilities for building pairs of temporary directory trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Which tree of a pair to modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

/// An old and a new tree under one temporary directory.
///
/// Both roots are cleaned up when the pair is dropped.
pub struct TreePair {
    dir: TempDir,
}

impl TreePair {
    /// Create two empty trees, `old/` and `new/`.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("old")).expect("Failed to create old root");
        fs::create_dir(dir.path().join("new")).expect("Failed to create new root");
        Self { dir }
    }

    /// The directory holding both roots.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn old_root(&self) -> PathBuf {
        self.root(Side::Old)
    }

    pub fn new_root(&self) -> PathBuf {
        self.root(Side::New)
    }

    pub fn root(&self, side: Side) -> PathBuf {
        match side {
            Side::Old => self.dir.path().join("old"),
            Side::New => self.dir.path().join("new"),
        }
    }

    /// Write a file on one side, creating parent directories as needed.
    pub fn add_file(&self, side: Side, path: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let full_path = self.root(side).join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write the same file on both sides.
    pub fn add_both(&self, path: &str, content: impl AsRef<[u8]>) {
        self.add_file(Side::Old, path, content.as_ref());
        self.add_file(Side::New, path, content.as_ref());
    }

    pub fn add_dir(&self, side: Side, path: &str) -> PathBuf {
        let full_path = self.root(side).join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    pub fn add_symlink(&self, side: Side, path: &str, target: &str) -> PathBuf {
        let full_path = self.root(side).join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        symlink(target, &full_path).expect("Failed to create symlink");
        full_path
    }

    /// Create a named pipe with `mkfifo(1)`.
    pub fn add_fifo(&self, side: Side, path: &str) -> PathBuf {
        let full_path = self.root(side).join(path);
        let status = Command::new("mkfifo")
            .arg(&full_path)
            .status()
            .expect("Failed to run mkfifo");
        assert!(status.success(), "mkfifo failed for {}", full_path.display());
        full_path
    }

    /// Create `path` holding a directory chain whose full path is longer
    /// than `PATH_MAX`, so the deepest entries cannot be accessed by path.
    ///
    /// Each half of the chain is built below the limit and then moved
    /// into place.
    pub fn add_overlong_dir(&self, side: Side, path: &str) -> PathBuf {
        let segment = "x".repeat(255);
        let chain: PathBuf = std::iter::repeat_n(segment.as_str(), 9).collect();

        let top = self.root(side).join(path);
        let upper = top.join(&chain);
        fs::create_dir_all(&upper).expect("Failed to create upper chain");

        let staging = self.dir.path().join("staging");
        fs::create_dir_all(staging.join(&chain)).expect("Failed to create lower chain");
        fs::rename(&staging, upper.join("lower")).expect("Failed to move lower chain");
        top
    }

    pub fn set_mode(&self, side: Side, path: &str, mode: u32) {
        let full_path = self.root(side).join(path);
        fs::set_permissions(&full_path, fs::Permissions::from_mode(mode))
            .expect("Failed to set permissions");
    }

    /// Copy the whole old tree into the new root, replacing it.
    pub fn mirror_old(&self) {
        let new_root = self.new_root();
        fs::remove_dir_all(&new_root).expect("Failed to clear new root");
        let status = Command::new("cp")
            .arg("-a")
            .arg(self.old_root())
            .arg(&new_root)
            .status()
            .expect("Failed to run cp");
        assert!(status.success(), "cp -a failed");
    }
}

impl Default for TreePair {
    fn default() -> Self {
        Self::new()
    }
}
