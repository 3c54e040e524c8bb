//! Error types for statdiff

use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("comparison timed out after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },

    #[error("error writing output: {0}")]
    Output(#[source] std::io::Error),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The path the failure refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Raised while resolving a comparison policy, before touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("unknown attribute '{0}' (expected one of: mode, owner, group, size)")]
    UnknownAttribute(String),

    #[error("attribute '{0}' is always compared and cannot be excluded")]
    NotExcludable(String),
}
