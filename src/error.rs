//! Error types for termframe.

use std::fmt;
use std::io;

/// Result type alias for termframe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for termframe operations.
///
/// Only setup and teardown report errors. Faults inside a running tick
/// (read errors, stat errors, malformed input) are absorbed where they occur.
#[derive(Debug)]
pub enum Error {
    /// I/O error from terminal operations.
    Io(io::Error),
    /// Frames-per-second outside the supported range (1..=1000).
    InvalidFps(u32),
    /// The loop was required to run on a TTY but the input or output is not one.
    NotATerminal,
    /// A standard stream could not be rebound to its backing file.
    Redirect {
        stream: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidFps(fps) => write!(f, "invalid fps: {fps} (expected 1..=1000)"),
            Self::NotATerminal => write!(f, "standard input/output is not a terminal"),
            Self::Redirect { stream, source } => {
                write!(f, "failed to redirect {stream}: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::Redirect { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
