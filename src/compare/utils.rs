//! Shared utility functions for tree comparison

use std::ffi::OsStr;

use glob::Pattern;

/// Name-based ignore filter applied to both trees.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    literals: Vec<String>,
    patterns: Vec<Pattern>,
}

impl NameFilter {
    /// Build a filter from raw patterns. Patterns that are not valid globs
    /// still match names equal to them.
    pub fn new(patterns: &[String]) -> Self {
        Self {
            literals: patterns.to_vec(),
            patterns: patterns
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if a directory entry name should be skipped.
    pub fn should_ignore(&self, name: &OsStr) -> bool {
        if self.is_empty() {
            return false;
        }
        let name = name.to_string_lossy();
        self.literals.iter().any(|literal| literal.as_str() == name.as_ref())
            || self.patterns.iter().any(|pattern| pattern.matches(&name))
    }
}
