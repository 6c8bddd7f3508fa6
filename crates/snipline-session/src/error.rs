//! Error types for edit-session commands.
//!
//! Every variant is recoverable: a failed command leaves the session as it
//! was.

use snipline_core::TimePoint;
use snipline_media::{ClipError, SinkError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The path could not be opened or decoded.
    #[error("Cannot open {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("No video loaded")]
    NoSourceLoaded,

    /// A cut needs both marks.
    #[error("{0} point not set")]
    MarkNotSet(&'static str),

    #[error("Invalid range {start}..{end} sec (clip is {duration} sec)")]
    InvalidRange {
        start: TimePoint,
        end: TimePoint,
        duration: TimePoint,
    },

    #[error("No segments to concatenate")]
    NoSegments,

    #[error("Nothing to export")]
    NothingToExport,

    /// Refuse to render over a file the clip reads from.
    #[error("Output path {} is a source of the clip being rendered", .0.display())]
    SameAsSource(PathBuf),

    #[error("{command} is not available in {mode} mode")]
    Unsupported {
        command: &'static str,
        mode: &'static str,
    },

    #[error("Render failed: {0}")]
    Sink(#[from] SinkError),
}

impl From<ClipError> for SessionError {
    fn from(err: ClipError) -> Self {
        match err {
            ClipError::InvalidRange {
                start,
                end,
                duration,
            } => Self::InvalidRange {
                start,
                end,
                duration,
            },
        }
    }
}

/// Result type alias for session commands.
pub type SessionResult<T> = std::result::Result<T, SessionError>;
