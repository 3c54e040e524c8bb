//! Directory-level logic shared by the lazy and the parallel walkers.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

use super::change::Change;
use super::config::ErrorMode;
use super::utils::NameFilter;

/// Child names of a directory pair, split by side. Each list is sorted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChildSets {
    pub deleted: Vec<OsString>,
    pub added: Vec<OsString>,
    pub common: Vec<OsString>,
}

impl ChildSets {
    /// Read both directories and compute the set difference.
    pub fn read(old_dir: &Path, new_dir: &Path, filter: &NameFilter) -> Result<Self> {
        let old_names = list_names(old_dir, filter)?;
        let new_names = list_names(new_dir, filter)?;

        Ok(Self {
            deleted: old_names.difference(&new_names).cloned().collect(),
            added: new_names.difference(&old_names).cloned().collect(),
            common: old_names.intersection(&new_names).cloned().collect(),
        })
    }

    /// `Deleted` then `Added` changes for this directory pair, in order.
    pub fn one_sided_changes<'a>(
        &'a self,
        old_dir: &'a Path,
        new_dir: &'a Path,
    ) -> impl Iterator<Item = Change> + 'a {
        let deleted = self.deleted.iter().map(move |name| Change::Deleted {
            path: old_dir.join(name),
        });
        let added = self.added.iter().map(move |name| Change::Added {
            path: new_dir.join(name),
        });
        deleted.chain(added)
    }
}

/// Names in `dir`, sorted by raw byte order.
fn list_names(dir: &Path, filter: &NameFilter) -> Result<BTreeSet<OsString>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut names = BTreeSet::new();
    for entry in entries {
        let name = entry.map_err(|e| Error::io(dir, e))?.file_name();
        if !filter.should_ignore(&name) {
            names.insert(name);
        }
    }
    Ok(names)
}

/// Optional time limit for a walk, checked between steps.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn check(&self) -> Result<()> {
        match self.limit {
            Some(limit) if self.started.elapsed() >= limit => Err(Error::DeadlineExceeded {
                elapsed: self.started.elapsed(),
            }),
            _ => Ok(()),
        }
    }
}

/// Turn an I/O failure into an `Unreadable` change when the mode allows it.
pub fn recover(mode: ErrorMode, err: Error) -> Result<Change> {
    match (mode, err) {
        (ErrorMode::Report, Error::Io { path, source }) => Ok(Change::Unreadable {
            path,
            reason: source.to_string(),
        }),
        (_, err) => Err(err),
    }
}
