//! Configuration types for tree comparison

use std::time::Duration;

use crate::policy::ComparisonPolicy;

/// Block size used when comparing file contents.
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// What to do when an entry cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop the whole comparison at the first I/O failure
    #[default]
    Abort,
    /// Report the entry as `Change::Unreadable` and continue with its siblings
    Report,
}

/// Configuration for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub policy: ComparisonPolicy,
    /// Names (or glob patterns) skipped on both sides
    pub ignore_patterns: Vec<String>,
    /// Number of parallel workers for sibling subtrees.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (lazy walk, no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
    /// Give up after this long, measured from the start of the walk
    pub timeout: Option<Duration>,
    pub error_mode: ErrorMode,
    pub block_size: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            policy: ComparisonPolicy::default(),
            ignore_patterns: Vec::new(),
            parallel_workers: 1,
            timeout: None,
            error_mode: ErrorMode::Abort,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl CompareConfig {
    pub fn with_policy(mut self, policy: ComparisonPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_parallel_workers(mut self, workers: usize) -> Self {
        self.parallel_workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel_workers != 1
    }
}
