//! Text output formatter
//!
//! Prints changes in the style of `diff -r`: `Only in <dir>: <name>` for
//! one-sided entries and `Files <old> and <new> differ` for modifications.

use std::io;

use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::compare::Change;

use super::ChangeOutput;
use super::config::OutputConfig;
use super::utils::{render_change, write_rendered_line};

/// Line-oriented formatter, colored when the writer supports it.
pub struct TextFormatter<W: WriteColor> {
    config: OutputConfig,
    out: W,
}

impl TextFormatter<StandardStream> {
    pub fn stdout(config: OutputConfig) -> Self {
        let choice = if config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(config, StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> TextFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self { config, out }
    }

    /// Format a change as plain text, one line per entry in the output.
    pub fn format(&self, change: &Change) -> String {
        render_change(change, &self.config)
            .into_iter()
            .map(|line| line.text + "\n")
            .collect()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: WriteColor> ChangeOutput for TextFormatter<W> {
    fn output_change(&mut self, change: &Change) -> io::Result<()> {
        for line in render_change(change, &self.config) {
            write_rendered_line(&mut self.out, &line)?;
        }
        Ok(())
    }

    fn finish(&mut self, _count: usize) -> io::Result<()> {
        self.out.flush()
    }
}
