//! JSON Lines output formatting

use std::io::{self, Write};

use serde::Serialize;

use crate::compare::{Change, explain_link, explain_metadata};
use crate::metadata::AttributeDiff;

use super::ChangeOutput;
use super::config::OutputConfig;

/// A change plus its optional verbose detail, as serialized.
#[derive(Debug, Serialize)]
struct JsonChange<'a> {
    #[serde(flatten)]
    change: &'a Change,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<Vec<AttributeDiff>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<JsonLink>,
}

#[derive(Debug, Serialize)]
struct JsonLink {
    old: String,
    new: String,
}

/// Writes one JSON object per change, one per line.
pub struct JsonFormatter<W: Write> {
    config: OutputConfig,
    out: W,
}

impl JsonFormatter<io::Stdout> {
    pub fn stdout(config: OutputConfig) -> Self {
        Self::new(config, io::stdout())
    }
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn detail<'a>(&self, change: &'a Change) -> JsonChange<'a> {
        let mut json = JsonChange {
            change,
            attributes: None,
            link: None,
        };
        if !self.config.is_verbose() {
            return json;
        }
        match change {
            Change::ModifiedMetadata { old, new } => {
                json.attributes = explain_metadata(old, new, &self.config.policy).ok();
            }
            Change::ModifiedLink { old, new } => {
                json.link = explain_link(old, new).ok().map(|link| JsonLink {
                    old: link.old.to_string_lossy().to_string(),
                    new: link.new.to_string_lossy().to_string(),
                });
            }
            _ => {}
        }
        json
    }
}

impl<W: Write> ChangeOutput for JsonFormatter<W> {
    fn output_change(&mut self, change: &Change) -> io::Result<()> {
        let json = serde_json::to_string(&self.detail(change)).map_err(io::Error::other)?;
        writeln!(self.out, "{}", json)
    }

    fn finish(&mut self, _count: usize) -> io::Result<()> {
        self.out.flush()
    }
}
