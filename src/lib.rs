//! statdiff - Compare two directory trees by metadata, link target and content

pub mod compare;
pub mod error;
pub mod metadata;
pub mod output;
pub mod policy;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use compare::{
    Change, CompareConfig, ErrorMode, TreeDiff, compare, compare_parallel, explain_link,
    explain_metadata,
};
pub use error::{Error, PolicyError, Result};
pub use metadata::{AttributeDiff, EntryKind, EntryMetadata};
pub use output::{ChangeOutput, JsonFormatter, OutputConfig, TextFormatter};
pub use policy::{Attribute, ComparisonPolicy};
