//! Error type shared by all `/proc` readers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::parser::ParseError;

/// Error type for collection failures.
///
/// `Io` means the source could not be opened or read. `Format` means it was
/// read but the content did not match the expected layout. Neither is retried.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Source could not be opened or read.
    #[error("could not read \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Source was readable but its content is malformed.
    #[error("unexpected file format: \"{}\": {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Requested `/proc` entry name was rejected before any I/O.
    #[error("invalid /proc entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
}

impl CollectError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CollectError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, source: ParseError) -> Self {
        CollectError::Format {
            path: path.into(),
            source,
        }
    }

    /// Returns true for open/read failures.
    pub fn is_io(&self) -> bool {
        matches!(self, CollectError::Io { .. })
    }

    /// Returns true for content that violated the expected layout.
    pub fn is_format(&self) -> bool {
        matches!(self, CollectError::Format { .. })
    }

    /// Offending raw line, key or entry name for format errors.
    pub fn context(&self) -> Option<&str> {
        match self {
            CollectError::Format { source, .. } => Some(source.context.as_str()),
            CollectError::InvalidName { name, .. } => Some(name.as_str()),
            CollectError::Io { .. } => None,
        }
    }
}
