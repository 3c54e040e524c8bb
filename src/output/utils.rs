//! Shared utility functions for output formatting

use std::io;
use std::path::Path;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::compare::{Change, explain_link, explain_metadata};

use super::config::OutputConfig;

/// Style for a rendered output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Added,
    Deleted,
    Modified,
    /// Indented explanation beneath a modification
    Detail,
    Error,
}

impl LineStyle {
    pub fn color(&self) -> Option<Color> {
        match self {
            LineStyle::Added => Some(Color::Green),
            LineStyle::Deleted => Some(Color::Red),
            LineStyle::Modified => Some(Color::Yellow),
            LineStyle::Detail => None,
            LineStyle::Error => Some(Color::Magenta),
        }
    }
}

/// One line of text output, before coloring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub style: LineStyle,
}

impl RenderedLine {
    fn new(text: String, style: LineStyle) -> Self {
        Self { text, style }
    }
}

/// Render a change as text lines, re-reading metadata for verbose detail.
pub fn render_change(change: &Change, config: &OutputConfig) -> Vec<RenderedLine> {
    match change {
        Change::Added { path } => vec![RenderedLine::new(only_in(path), LineStyle::Added)],
        Change::Deleted { path } => vec![RenderedLine::new(only_in(path), LineStyle::Deleted)],
        Change::Unreadable { path, reason } => vec![RenderedLine::new(
            format!("Cannot read {}: {}", path.display(), reason),
            LineStyle::Error,
        )],
        Change::ModifiedMetadata { old, new }
        | Change::ModifiedLink { old, new }
        | Change::ModifiedContent { old, new } => {
            let mut lines = vec![RenderedLine::new(
                format!("Files {} and {} differ", old.display(), new.display()),
                LineStyle::Modified,
            )];
            if config.is_verbose() {
                lines.extend(
                    explain(change, old, new, config)
                        .into_iter()
                        .map(|text| RenderedLine::new(format!(" {}", text), LineStyle::Detail)),
                );
            }
            lines
        }
    }
}

fn explain(change: &Change, old: &Path, new: &Path, config: &OutputConfig) -> Vec<String> {
    match change {
        Change::ModifiedMetadata { .. } => match explain_metadata(old, new, &config.policy) {
            Ok(diffs) => diffs.iter().map(ToString::to_string).collect(),
            Err(err) => vec![format!("({})", err)],
        },
        Change::ModifiedLink { .. } => match explain_link(old, new) {
            Ok(link) => vec![format!(
                "link: {} != {}",
                link.old.display(),
                link.new.display()
            )],
            Err(err) => vec![format!("({})", err)],
        },
        _ => Vec::new(),
    }
}

/// `Only in <parent>: <name>`, as printed by diff(1).
pub fn only_in(path: &Path) -> String {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    format!("Only in {}: {}", parent.display(), name)
}

/// Write a rendered line in its style's color.
pub fn write_rendered_line<W: WriteColor + ?Sized>(
    out: &mut W,
    line: &RenderedLine,
) -> io::Result<()> {
    if let Some(color) = line.style.color() {
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        write!(out, "{}", line.text)?;
        out.reset()?;
        writeln!(out)
    } else {
        writeln!(out, "{}", line.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_only_in() {
        assert_eq!(only_in(Path::new("old/a/b.txt")), "Only in old/a: b.txt");
        assert_eq!(only_in(Path::new("top")), "Only in .: top");
    }

    #[test]
    fn test_render_added_and_deleted() {
        let config = OutputConfig::default();
        let added = render_change(
            &Change::Added {
                path: PathBuf::from("new/x"),
            },
            &config,
        );
        assert_eq!(
            added,
            vec![RenderedLine::new("Only in new: x".to_string(), LineStyle::Added)]
        );

        let deleted = render_change(
            &Change::Deleted {
                path: PathBuf::from("old/y"),
            },
            &config,
        );
        assert_eq!(deleted[0].style, LineStyle::Deleted);
    }

    #[test]
    fn test_render_modified_quiet() {
        let lines = render_change(
            &Change::ModifiedContent {
                old: PathBuf::from("old/f"),
                new: PathBuf::from("new/f"),
            },
            &OutputConfig::default(),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Files old/f and new/f differ");
    }

    #[test]
    fn test_render_verbose_explains_missing_entries() {
        let config = OutputConfig {
            verbosity: 1,
            ..OutputConfig::default()
        };
        let lines = render_change(
            &Change::ModifiedMetadata {
                old: PathBuf::from("/nonexistent/old"),
                new: PathBuf::from("/nonexistent/new"),
            },
            &config,
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].style, LineStyle::Detail);
        assert!(lines[1].text.contains("/nonexistent/old"), "{}", lines[1].text);
    }

    #[test]
    fn test_write_rendered_line_without_color() {
        let mut out = termcolor::NoColor::new(Vec::new());
        let line = RenderedLine::new("Only in a: b".to_string(), LineStyle::Added);
        write_rendered_line(&mut out, &line).unwrap();
        assert_eq!(String::from_utf8(out.into_inner()).unwrap(), "Only in a: b\n");
    }
}
