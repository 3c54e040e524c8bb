//! Entry metadata snapshot and attribute comparison
//!
//! Metadata is always read with `symlink_metadata` so links are described
//! themselves rather than their targets. Attribute values are looked up
//! through a fixed accessor table indexed by [`Attribute`].

use std::fmt;
use std::fs;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::policy::{Attribute, ComparisonPolicy};

/// Mask for permission bits, including setuid, setgid and sticky.
const PERMISSION_MASK: u32 = 0o7777;

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
    Socket,
    Fifo,
    CharDevice,
    BlockDevice,
}

impl EntryKind {
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_char_device() {
            EntryKind::CharDevice
        } else if file_type.is_block_device() {
            EntryKind::BlockDevice
        } else if file_type.is_fifo() {
            EntryKind::Fifo
        } else {
            EntryKind::Socket
        }
    }

    /// Sockets, fifos and device nodes.
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            EntryKind::Socket | EntryKind::Fifo | EntryKind::CharDevice | EntryKind::BlockDevice
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::File => "regular file",
            EntryKind::Symlink => "symbolic link",
            EntryKind::Socket => "socket",
            EntryKind::Fifo => "fifo",
            EntryKind::CharDevice => "character device",
            EntryKind::BlockDevice => "block device",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The comparable attributes of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    pub kind: EntryKind,
    /// Permission bits only; the file type lives in `kind`
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub rdev: u64,
}

type Accessor = fn(&EntryMetadata) -> u64;

/// Accessor per attribute, in `Attribute` discriminant order.
const ATTRIBUTE_TABLE: [(Attribute, Accessor); 5] = [
    (Attribute::Mode, |m| u64::from(m.mode)),
    (Attribute::Owner, |m| u64::from(m.uid)),
    (Attribute::Group, |m| u64::from(m.gid)),
    (Attribute::Size, |m| m.size),
    (Attribute::Device, |m| m.rdev),
];

impl EntryMetadata {
    /// Read metadata for `path` without following a final symlink.
    pub fn read(path: &Path) -> Result<Self> {
        let metadata = fs::symlink_metadata(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_std(&metadata))
    }

    pub fn from_std(metadata: &fs::Metadata) -> Self {
        Self {
            kind: EntryKind::from_file_type(metadata.file_type()),
            mode: metadata.mode() & PERMISSION_MASK,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            rdev: metadata.rdev(),
        }
    }

    /// Value of one attribute.
    pub fn value(&self, attribute: Attribute) -> u64 {
        let (_, accessor) = ATTRIBUTE_TABLE[attribute as usize];
        accessor(self)
    }

    /// True when kinds match and every attribute in scope is equal.
    pub fn matches(&self, other: &EntryMetadata, policy: &ComparisonPolicy) -> bool {
        self.kind == other.kind
            && policy
                .effective_for(self.kind)
                .all(|attribute| self.value(attribute) == other.value(attribute))
    }

    /// Every in-scope difference, for reporting.
    ///
    /// A kind mismatch is reported alone: the other attributes of entries of
    /// different kinds are not comparable.
    pub fn diff(&self, other: &EntryMetadata, policy: &ComparisonPolicy) -> Vec<AttributeDiff> {
        if self.kind != other.kind {
            return vec![AttributeDiff::Kind {
                old: self.kind,
                new: other.kind,
            }];
        }
        policy
            .effective_for(self.kind)
            .filter_map(|attribute| {
                let (old, new) = (self.value(attribute), other.value(attribute));
                (old != new).then_some(AttributeDiff::Value {
                    attribute,
                    old,
                    new,
                })
            })
            .collect()
    }
}

/// One metadata difference between two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttributeDiff {
    Kind {
        old: EntryKind,
        new: EntryKind,
    },
    Value {
        attribute: Attribute,
        old: u64,
        new: u64,
    },
}

impl fmt::Display for AttributeDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeDiff::Kind { old, new } => write!(f, "kind: {} != {}", old, new),
            AttributeDiff::Value {
                attribute: Attribute::Mode,
                old,
                new,
            } => write!(f, "mode: {:#o} != {:#o}", old, new),
            AttributeDiff::Value {
                attribute: Attribute::Device,
                old,
                new,
            } => write!(f, "device: {:#x} != {:#x}", old, new),
            AttributeDiff::Value {
                attribute,
                old,
                new,
            } => write!(f, "{}: {} != {}", attribute, old, new),
        }
    }
}
