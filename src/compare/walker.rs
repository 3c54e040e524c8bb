//! TreeDiff - lazy, sequential comparison of two trees

use std::collections::VecDeque;
use std::ffi::OsString;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::change::Change;
use super::config::{CompareConfig, ErrorMode};
use super::leaf::{LeafComparator, PairOutcome};
use super::traversal::{ChildSets, Deadline, recover};
use super::utils::NameFilter;

/// A directory pair whose common children are still being visited.
#[derive(Debug)]
struct Frame {
    old_dir: PathBuf,
    new_dir: PathBuf,
    names: std::vec::IntoIter<OsString>,
}

/// Lazy sequence of changes between two trees.
///
/// Each call to `next` performs only the I/O needed to produce the next
/// change. Traversal state lives in an explicit stack, so tree depth does
/// not grow the call stack. After an error is yielded the iterator is done.
pub struct TreeDiff {
    comparator: LeafComparator,
    filter: NameFilter,
    error_mode: ErrorMode,
    deadline: Deadline,
    root: Option<(PathBuf, PathBuf)>,
    stack: Vec<Frame>,
    pending: VecDeque<Change>,
    finished: bool,
}

impl TreeDiff {
    /// Set up a comparison; nothing is read until the first `next`.
    ///
    /// The timeout, if any, counts from this call.
    pub fn new(
        old_root: impl AsRef<Path>,
        new_root: impl AsRef<Path>,
        config: CompareConfig,
    ) -> Self {
        Self::with_parts(
            LeafComparator::new(config.policy, config.block_size),
            NameFilter::new(&config.ignore_patterns),
            config.error_mode,
            Deadline::start(config.timeout),
            old_root.as_ref().to_path_buf(),
            new_root.as_ref().to_path_buf(),
        )
    }

    /// Walk one subtree with settings shared across a larger comparison.
    pub(super) fn with_parts(
        comparator: LeafComparator,
        filter: NameFilter,
        error_mode: ErrorMode,
        deadline: Deadline,
        old_root: PathBuf,
        new_root: PathBuf,
    ) -> Self {
        Self {
            comparator,
            filter,
            error_mode,
            deadline,
            root: Some((old_root, new_root)),
            stack: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Current nesting depth of the walk.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn step(&mut self) -> Result<()> {
        if let Some((old, new)) = self.root.take() {
            return self.visit(old, new);
        }

        let Some(frame) = self.stack.last_mut() else {
            self.finished = true;
            return Ok(());
        };

        match frame.names.next() {
            Some(name) => {
                let old = frame.old_dir.join(&name);
                let new = frame.new_dir.join(&name);
                self.visit(old, new)
            }
            None => {
                self.stack.pop();
                Ok(())
            }
        }
    }

    fn visit(&mut self, old: PathBuf, new: PathBuf) -> Result<()> {
        self.deadline.check()?;
        trace!(old = %old.display(), new = %new.display(), "comparing");

        match self.comparator.compare(&old, &new) {
            Ok(PairOutcome::Identical) => Ok(()),
            Ok(PairOutcome::Changed(change)) => {
                self.pending.push_back(change);
                Ok(())
            }
            Ok(PairOutcome::Descend) => self.open_dir(old, new),
            Err(err) => self.report(err),
        }
    }

    fn open_dir(&mut self, old_dir: PathBuf, new_dir: PathBuf) -> Result<()> {
        let children = match ChildSets::read(&old_dir, &new_dir, &self.filter) {
            Ok(children) => children,
            Err(err) => return self.report(err),
        };
        debug!(
            dir = %old_dir.display(),
            deleted = children.deleted.len(),
            added = children.added.len(),
            common = children.common.len(),
            "entering directory"
        );

        self.pending
            .extend(children.one_sided_changes(&old_dir, &new_dir));

        if !children.common.is_empty() {
            self.stack.push(Frame {
                old_dir,
                new_dir,
                names: children.common.into_iter(),
            });
        }
        Ok(())
    }

    fn report(&mut self, err: Error) -> Result<()> {
        let change = recover(self.error_mode, err)?;
        self.pending.push_back(change);
        Ok(())
    }
}

impl Iterator for TreeDiff {
    type Item = Result<Change>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(change) = self.pending.pop_front() {
                return Some(Ok(change));
            }
            if self.finished {
                return None;
            }
            if let Err(err) = self.step() {
                self.finished = true;
                self.stack.clear();
                return Some(Err(err));
            }
        }
    }
}

impl FusedIterator for TreeDiff {}
