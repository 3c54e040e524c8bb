//! Parallel comparison - sibling subtrees compared on a rayon pool

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

use super::change::Change;
use super::config::{CompareConfig, ErrorMode};
use super::leaf::{LeafComparator, PairOutcome};
use super::traversal::{ChildSets, Deadline, recover};
use super::utils::NameFilter;
use super::walker::TreeDiff;

/// Pending subtrees to aim for per worker before handing them out.
const TASKS_PER_THREAD: usize = 4;

/// Compare two trees, fanning subtrees out over worker threads.
///
/// Returns the same changes in the same order as the lazy `TreeDiff`, but
/// only once the whole walk has finished. When several subtrees fail, the
/// error reported is the one the sequential walk would have hit first.
/// `parallel_workers == 0` uses rayon's global pool; any other value builds
/// a dedicated pool.
pub fn compare_parallel(
    old_root: &Path,
    new_root: &Path,
    config: &CompareConfig,
) -> Result<Vec<Change>> {
    let context = ParallelContext {
        comparator: LeafComparator::new(config.policy.clone(), config.block_size),
        filter: NameFilter::new(&config.ignore_patterns),
        error_mode: config.error_mode,
        deadline: Deadline::start(config.timeout),
    };
    let run = || context.run(old_root, new_root);

    if config.parallel_workers == 0 {
        return run();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel_workers)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(err) => {
            // Fall back to rayon's global pool if custom pool creation fails
            debug!(error = %err, "could not build worker pool");
            run()
        }
    }
}

/// One slice of the output, kept in walk order.
enum Task {
    /// Changes already produced.
    Done(Vec<Change>),
    /// A pair that has not been visited yet.
    Walk(PathBuf, PathBuf),
    /// The walk fails here; nothing after it is reported.
    Failed(Error),
}

struct ParallelContext {
    comparator: LeafComparator,
    filter: NameFilter,
    error_mode: ErrorMode,
    deadline: Deadline,
}

impl ParallelContext {
    /// Split the tree level by level until there is enough work for the
    /// pool, then walk each remaining subtree with its own `TreeDiff`.
    ///
    /// Neither phase recurses, so tree depth only costs heap.
    fn run(&self, old_root: &Path, new_root: &Path) -> Result<Vec<Change>> {
        let target = rayon::current_num_threads() * TASKS_PER_THREAD;
        let mut tasks = vec![Task::Walk(old_root.to_path_buf(), new_root.to_path_buf())];

        loop {
            let walks = tasks.iter().filter(|t| matches!(t, Task::Walk(..))).count();
            if walks == 0 || walks >= target {
                break;
            }
            tasks = self.expand(tasks);
        }
        debug!(tasks = tasks.len(), "walking subtrees");

        let results: Vec<Result<Vec<Change>>> = tasks
            .into_par_iter()
            .map(|task| match task {
                Task::Done(changes) => Ok(changes),
                Task::Walk(old, new) => self.walk(old, new),
                Task::Failed(err) => Err(err),
            })
            .collect();

        // First failure in walk order, not in completion order
        let mut changes = Vec::new();
        for result in results {
            changes.extend(result?);
        }
        Ok(changes)
    }

    /// Visit every pending pair one level down, keeping order.
    fn expand(&self, tasks: Vec<Task>) -> Vec<Task> {
        let nested: Vec<Vec<Task>> = tasks
            .into_par_iter()
            .map(|task| match task {
                Task::Walk(old, new) => self
                    .expand_pair(&old, &new)
                    .unwrap_or_else(|err| vec![Task::Failed(err)]),
                other => vec![other],
            })
            .collect();

        let mut expanded = Vec::new();
        for task in nested.into_iter().flatten() {
            let failed = matches!(task, Task::Failed(_));
            expanded.push(task);
            if failed {
                break;
            }
        }
        expanded
    }

    fn expand_pair(&self, old: &Path, new: &Path) -> Result<Vec<Task>> {
        self.deadline.check()?;

        let outcome = match self.comparator.compare(old, new) {
            Ok(outcome) => outcome,
            Err(err) => return Ok(vec![Task::Done(vec![recover(self.error_mode, err)?])]),
        };
        match outcome {
            PairOutcome::Identical => Ok(Vec::new()),
            PairOutcome::Changed(change) => Ok(vec![Task::Done(vec![change])]),
            PairOutcome::Descend => {
                let children = match ChildSets::read(old, new, &self.filter) {
                    Ok(children) => children,
                    Err(err) => {
                        return Ok(vec![Task::Done(vec![recover(self.error_mode, err)?])]);
                    }
                };
                let mut tasks = vec![Task::Done(
                    children.one_sided_changes(old, new).collect(),
                )];
                tasks.extend(
                    children
                        .common
                        .iter()
                        .map(|name| Task::Walk(old.join(name), new.join(name))),
                );
                Ok(tasks)
            }
        }
    }

    fn walk(&self, old: PathBuf, new: PathBuf) -> Result<Vec<Change>> {
        TreeDiff::with_parts(
            self.comparator.clone(),
            self.filter.clone(),
            self.error_mode,
            self.deadline,
            old,
            new,
        )
        .collect()
    }
}
