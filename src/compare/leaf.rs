//! Pairwise entry comparison: metadata, then link target or content.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{Error, Result};
use crate::metadata::{AttributeDiff, EntryKind, EntryMetadata};
use crate::policy::ComparisonPolicy;

use super::change::Change;
use super::config::DEFAULT_BLOCK_SIZE;

/// Result of comparing one pair of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// Nothing to report
    Identical,
    /// A single change for this pair
    Changed(Change),
    /// Both are directories with matching metadata; compare their children
    Descend,
}

/// Compares two entries that both exist.
#[derive(Debug, Clone)]
pub struct LeafComparator {
    policy: ComparisonPolicy,
    block_size: usize,
}

impl LeafComparator {
    pub fn new(policy: ComparisonPolicy, block_size: usize) -> Self {
        Self {
            policy,
            block_size: if block_size == 0 {
                DEFAULT_BLOCK_SIZE
            } else {
                block_size
            },
        }
    }

    pub fn policy(&self) -> &ComparisonPolicy {
        &self.policy
    }

    pub fn compare(&self, old: &Path, new: &Path) -> Result<PairOutcome> {
        let old_meta = EntryMetadata::read(old)?;
        let new_meta = EntryMetadata::read(new)?;

        if !old_meta.matches(&new_meta, &self.policy) {
            trace!(old = %old.display(), "metadata differs");
            return Ok(PairOutcome::Changed(Change::ModifiedMetadata {
                old: old.to_path_buf(),
                new: new.to_path_buf(),
            }));
        }

        let outcome = match old_meta.kind {
            EntryKind::Directory => PairOutcome::Descend,
            EntryKind::Symlink if !links_equal(old, new)? => {
                PairOutcome::Changed(Change::ModifiedLink {
                    old: old.to_path_buf(),
                    new: new.to_path_buf(),
                })
            }
            EntryKind::File if !contents_equal(old, new, self.block_size)? => {
                PairOutcome::Changed(Change::ModifiedContent {
                    old: old.to_path_buf(),
                    new: new.to_path_buf(),
                })
            }
            _ => PairOutcome::Identical,
        };
        Ok(outcome)
    }
}

/// Compare the literal targets of two symlinks.
pub fn links_equal(old: &Path, new: &Path) -> Result<bool> {
    let old_target = fs::read_link(old).map_err(|e| Error::io(old, e))?;
    let new_target = fs::read_link(new).map_err(|e| Error::io(new, e))?;
    Ok(old_target.as_os_str() == new_target.as_os_str())
}

/// Compare two files block by block, stopping at the first difference.
pub fn contents_equal(old: &Path, new: &Path, block_size: usize) -> Result<bool> {
    let mut old_file = File::open(old).map_err(|e| Error::io(old, e))?;
    let mut new_file = File::open(new).map_err(|e| Error::io(new, e))?;

    let block_size = block_size.max(1);
    let mut old_buf = vec![0u8; block_size];
    let mut new_buf = vec![0u8; block_size];
    let mut blocks = 0usize;

    loop {
        let old_len = read_block(&mut old_file, &mut old_buf).map_err(|e| Error::io(old, e))?;
        let new_len = read_block(&mut new_file, &mut new_buf).map_err(|e| Error::io(new, e))?;

        if old_buf[..old_len] != new_buf[..new_len] {
            trace!(old = %old.display(), block = blocks, "content differs");
            return Ok(false);
        }
        if old_len == 0 {
            return Ok(true);
        }
        blocks += 1;
    }
}

/// Fill `buf` as far as possible; a short count means end of file.
fn read_block(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Metadata differences between two entries under `policy`.
pub fn explain_metadata(
    old: &Path,
    new: &Path,
    policy: &ComparisonPolicy,
) -> Result<Vec<AttributeDiff>> {
    let old_meta = EntryMetadata::read(old)?;
    let new_meta = EntryMetadata::read(new)?;
    Ok(old_meta.diff(&new_meta, policy))
}

/// Targets of two symlinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDiff {
    pub old: PathBuf,
    pub new: PathBuf,
}

pub fn explain_link(old: &Path, new: &Path) -> Result<LinkDiff> {
    Ok(LinkDiff {
        old: fs::read_link(old).map_err(|e| Error::io(old, e))?,
        new: fs::read_link(new).map_err(|e| Error::io(new, e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Attribute;
    use std::os::unix::fs::{PermissionsExt, symlink};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn comparator() -> LeafComparator {
        LeafComparator::new(ComparisonPolicy::default(), DEFAULT_BLOCK_SIZE)
    }

    #[test]
    fn test_identical_files() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"same bytes");
        let b = write(&dir, "b", b"same bytes");
        assert_eq!(comparator().compare(&a, &b).unwrap(), PairOutcome::Identical);
    }

    #[test]
    fn test_last_byte_of_multi_block_file() {
        let dir = TempDir::new().unwrap();
        let mut content = vec![b'x'; DEFAULT_BLOCK_SIZE * 3 + 17];
        let a = write(&dir, "a", &content);
        *content.last_mut().unwrap() = b'y';
        let b = write(&dir, "b", &content);

        assert!(!contents_equal(&a, &b, DEFAULT_BLOCK_SIZE).unwrap());
        assert_eq!(
            comparator().compare(&a, &b).unwrap(),
            PairOutcome::Changed(Change::ModifiedContent { old: a, new: b })
        );
    }

    #[test]
    fn test_differing_lengths_detected_without_size_attribute() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", &vec![b'x'; DEFAULT_BLOCK_SIZE]);
        let b = write(&dir, "b", &vec![b'x'; DEFAULT_BLOCK_SIZE + 1]);

        let policy = ComparisonPolicy::default().without(Attribute::Size);
        let comparator = LeafComparator::new(policy, DEFAULT_BLOCK_SIZE);
        assert!(matches!(
            comparator.compare(&a, &b).unwrap(),
            PairOutcome::Changed(Change::ModifiedContent { .. })
        ));
    }

    #[test]
    fn test_small_block_size_and_empty_files() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"abcdefg");
        let b = write(&dir, "b", b"abcdefg");
        assert!(contents_equal(&a, &b, 2).unwrap());

        let empty_a = write(&dir, "ea", b"");
        let empty_b = write(&dir, "eb", b"");
        assert!(contents_equal(&empty_a, &empty_b, DEFAULT_BLOCK_SIZE).unwrap());
        assert!(!contents_equal(&empty_a, &a, DEFAULT_BLOCK_SIZE).unwrap());
    }

    #[test]
    fn test_size_difference_is_metadata() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"abc");
        let b = write(&dir, "b", b"abcd");
        assert!(matches!(
            comparator().compare(&a, &b).unwrap(),
            PairOutcome::Changed(Change::ModifiedMetadata { .. })
        ));
    }

    #[test]
    fn test_permission_difference() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"abc");
        let b = write(&dir, "b", b"abc");
        fs::set_permissions(&a, fs::Permissions::from_mode(0o644)).unwrap();
        fs::set_permissions(&b, fs::Permissions::from_mode(0o600)).unwrap();

        assert!(matches!(
            comparator().compare(&a, &b).unwrap(),
            PairOutcome::Changed(Change::ModifiedMetadata { .. })
        ));

        let diffs = explain_metadata(&a, &b, &ComparisonPolicy::default()).unwrap();
        assert_eq!(
            diffs,
            vec![AttributeDiff::Value {
                attribute: Attribute::Mode,
                old: 0o644,
                new: 0o600
            }]
        );

        let lenient = LeafComparator::new(
            ComparisonPolicy::excluding(["mode"]).unwrap(),
            DEFAULT_BLOCK_SIZE,
        );
        assert_eq!(lenient.compare(&a, &b).unwrap(), PairOutcome::Identical);
    }

    #[test]
    fn test_symlink_targets() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        symlink("./one", &a).unwrap();
        symlink("./two", &b).unwrap();
        symlink("./one", &c).unwrap();

        assert_eq!(comparator().compare(&a, &c).unwrap(), PairOutcome::Identical);
        assert_eq!(
            comparator().compare(&a, &b).unwrap(),
            PairOutcome::Changed(Change::ModifiedLink {
                old: a.clone(),
                new: b.clone()
            })
        );
        assert_eq!(
            explain_link(&a, &b).unwrap(),
            LinkDiff {
                old: PathBuf::from("./one"),
                new: PathBuf::from("./two")
            }
        );
    }

    #[test]
    fn test_symlink_target_length_change_is_metadata() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        symlink("short", &a).unwrap();
        symlink("much-longer", &b).unwrap();

        // A link's size is its target length
        assert!(matches!(
            comparator().compare(&a, &b).unwrap(),
            PairOutcome::Changed(Change::ModifiedMetadata { .. })
        ));
    }

    #[test]
    fn test_directories_descend() {
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        assert_eq!(
            comparator().compare(old.path(), new.path()).unwrap(),
            PairOutcome::Descend
        );
    }

    #[test]
    fn test_directory_became_file() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let file = write(&dir, "file", b"");

        assert!(matches!(
            comparator().compare(&sub, &file).unwrap(),
            PairOutcome::Changed(Change::ModifiedMetadata { .. })
        ));
    }

    #[test]
    fn test_missing_entry_is_error() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"");
        let missing = dir.path().join("missing");
        let err = comparator().compare(&a, &missing).unwrap_err();
        assert_eq!(err.path(), Some(missing.as_path()));
    }

    #[test]
    fn test_zero_block_size_uses_default() {
        let comparator = LeafComparator::new(ComparisonPolicy::default(), 0);
        assert_eq!(comparator.block_size, DEFAULT_BLOCK_SIZE);
    }
}
