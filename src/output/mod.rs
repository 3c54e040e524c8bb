//! Change formatting and display
//!
//! This module provides formatters for reporting changes:
//! - Text output in the style of `diff -r`, optionally colored
//! - JSON Lines output
//!
//! # Module Structure
//!
//! - `config` - Output configuration types
//! - `utils` - Shared rendering helpers
//! - `text` - Text formatter
//! - `json` - JSON Lines formatter

mod config;
mod json;
mod text;
mod utils;

use std::io;

use crate::compare::Change;
use crate::error::{Error, Result};

// Re-export public types and functions
pub use config::OutputConfig;
pub use json::JsonFormatter;
pub use text::TextFormatter;
pub use utils::{LineStyle, RenderedLine, only_in, render_change};

/// Receives changes one at a time as the comparison produces them.
pub trait ChangeOutput {
    fn output_change(&mut self, change: &Change) -> io::Result<()>;

    fn finish(&mut self, count: usize) -> io::Result<()>;
}

/// Feed every change into `output`, returning how many were written.
///
/// Stops at the first comparison error; changes already written stay written
/// and the output is finished before the error is returned.
pub fn write_changes<I, O>(changes: I, output: &mut O) -> Result<usize>
where
    I: IntoIterator<Item = Result<Change>>,
    O: ChangeOutput + ?Sized,
{
    let mut count = 0;
    let mut failure = None;

    for change in changes {
        match change {
            Ok(change) => {
                output.output_change(&change).map_err(Error::Output)?;
                count += 1;
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    output.finish(count).map_err(Error::Output)?;
    match failure {
        Some(err) => Err(err),
        None => Ok(count),
    }
}
