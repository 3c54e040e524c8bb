//! Output configuration types

use crate::policy::ComparisonPolicy;

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// 0 = one line per change, 1+ = explain metadata and link differences
    pub verbosity: u8,
    /// Policy used to explain metadata differences; should match the comparison's
    pub policy: ComparisonPolicy,
}

impl OutputConfig {
    pub fn is_verbose(&self) -> bool {
        self.verbosity > 0
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            verbosity: 0,
            policy: ComparisonPolicy::default(),
        }
    }
}
