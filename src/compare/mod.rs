//! Tree comparison
//!
//! This module compares two directory trees and reports their differences.
//! It supports two modes:
//!
//! - `TreeDiff`: lazy iterator, one change per `next`, sequential
//! - `compare_parallel`: sibling subtrees on a rayon pool, same output, eager
//!
//! Within each directory, deletions come first, then additions, then the
//! results of recursing into common children; each group is sorted by name.

mod change;
mod config;
mod leaf;
mod parallel;
mod traversal;
mod utils;
mod walker;

use std::path::Path;

use crate::policy::ComparisonPolicy;

// Re-export public types
pub use change::Change;
pub use config::{CompareConfig, DEFAULT_BLOCK_SIZE, ErrorMode};
pub use leaf::{
    LeafComparator, LinkDiff, PairOutcome, contents_equal, explain_link, explain_metadata,
    links_equal,
};
pub use parallel::compare_parallel;
pub use traversal::ChildSets;
pub use utils::NameFilter;
pub use walker::TreeDiff;

/// Lazily compare `old_root` against `new_root` under `policy`.
pub fn compare(
    old_root: impl AsRef<Path>,
    new_root: impl AsRef<Path>,
    policy: ComparisonPolicy,
) -> TreeDiff {
    TreeDiff::new(
        old_root,
        new_root,
        CompareConfig::default().with_policy(policy),
    )
}
