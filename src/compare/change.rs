//! The change record produced by a comparison

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

/// One divergence between the old and the new tree.
///
/// Paths are the full paths under the respective roots, so the old and new
/// paths of a modification share a suffix but differ in their root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Present only in the new tree. A directory is reported once, not its contents.
    Added {
        #[serde(serialize_with = "lossy_path")]
        path: PathBuf,
    },
    /// Present only in the old tree.
    Deleted {
        #[serde(serialize_with = "lossy_path")]
        path: PathBuf,
    },
    /// Kind or in-scope metadata differs. Directories are not descended into.
    ModifiedMetadata {
        #[serde(serialize_with = "lossy_path")]
        old: PathBuf,
        #[serde(serialize_with = "lossy_path")]
        new: PathBuf,
    },
    /// Both are symlinks with equal metadata but different targets.
    ModifiedLink {
        #[serde(serialize_with = "lossy_path")]
        old: PathBuf,
        #[serde(serialize_with = "lossy_path")]
        new: PathBuf,
    },
    /// Both are regular files with equal metadata but different bytes.
    ModifiedContent {
        #[serde(serialize_with = "lossy_path")]
        old: PathBuf,
        #[serde(serialize_with = "lossy_path")]
        new: PathBuf,
    },
    /// The entry could not be read; only produced in `ErrorMode::Report`.
    Unreadable {
        #[serde(serialize_with = "lossy_path")]
        path: PathBuf,
        reason: String,
    },
}

/// Paths serialize as strings even when they are not valid UTF-8; invalid
/// sequences become U+FFFD, as in text output.
fn lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

impl Change {
    /// Short flag: `A`, `D`, `M_stat`, `M_link`, `M_content` or `E`.
    pub fn flag(&self) -> &'static str {
        match self {
            Change::Added { .. } => "A",
            Change::Deleted { .. } => "D",
            Change::ModifiedMetadata { .. } => "M_stat",
            Change::ModifiedLink { .. } => "M_link",
            Change::ModifiedContent { .. } => "M_content",
            Change::Unreadable { .. } => "E",
        }
    }

    /// Path in the old tree, if the entry exists there.
    pub fn old_path(&self) -> Option<&Path> {
        match self {
            Change::Deleted { path } => Some(path),
            Change::ModifiedMetadata { old, .. }
            | Change::ModifiedLink { old, .. }
            | Change::ModifiedContent { old, .. } => Some(old),
            Change::Added { .. } | Change::Unreadable { .. } => None,
        }
    }

    /// Path in the new tree, if the entry exists there.
    pub fn new_path(&self) -> Option<&Path> {
        match self {
            Change::Added { path } => Some(path),
            Change::ModifiedMetadata { new, .. }
            | Change::ModifiedLink { new, .. }
            | Change::ModifiedContent { new, .. } => Some(new),
            Change::Deleted { .. } | Change::Unreadable { .. } => None,
        }
    }

    pub fn is_modification(&self) -> bool {
        matches!(
            self,
            Change::ModifiedMetadata { .. }
                | Change::ModifiedLink { .. }
                | Change::ModifiedContent { .. }
        )
    }
}
