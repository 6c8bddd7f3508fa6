//! Error types for clip operations and media services.

use snipline_core::TimePoint;
use std::path::PathBuf;
use thiserror::Error;

/// A range that does not fit the clip it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipError {
    #[error("Invalid range {start}..{end} sec for clip of {duration} sec")]
    InvalidRange {
        start: TimePoint,
        end: TimePoint,
        duration: TimePoint,
    },
}

/// Failures while opening media.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to run ffprobe: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Could not read {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },
}

/// Failures while rendering a clip to a file.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to start ffmpeg: {0}")]
    Spawn(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Render cancelled")]
    Cancelled,

    #[error("Nothing to render: clip is empty")]
    EmptyClip,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
