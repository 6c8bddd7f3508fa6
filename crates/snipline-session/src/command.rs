//! Commands, outcomes, and notifications exchanged with the UI layer.

use snipline_core::{format_position, TimePoint};
use std::fmt;
use std::path::PathBuf;

/// A discrete user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a video file, replacing the current one.
    Load(PathBuf),
    /// Mark the current position as the in point.
    MarkIn,
    /// Mark the current position as the out point.
    MarkOut,
    /// Direct mode: cut between the marks. Segment mode: cut one segment
    /// starting at the current position.
    Cut,
    /// Segment mode only: cut one segment starting at `start`.
    CutSegment { start: TimePoint },
    /// Join all segments, in cut order, into the composed clip.
    Concatenate,
    /// Render the editable result to a file.
    Export(PathBuf),
    /// Render the editable result to the preview path.
    Preview,
    /// Move the playback position. Clamped to the loaded duration.
    Seek(TimePoint),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load(_) => "Load",
            Self::MarkIn => "MarkIn",
            Self::MarkOut => "MarkOut",
            Self::Cut => "Cut",
            Self::CutSegment { .. } => "CutSegment",
            Self::Concatenate => "Concatenate",
            Self::Export(_) => "Export",
            Self::Preview => "Preview",
            Self::Seek(_) => "Seek",
        }
    }
}

/// What a successful command did. `Display` gives the status-bar text.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded { path: PathBuf, duration: TimePoint },
    InPointSet(TimePoint),
    OutPointSet(TimePoint),
    SourceCut { start: TimePoint, end: TimePoint },
    SegmentCut {
        index: usize,
        start: TimePoint,
        end: TimePoint,
    },
    Concatenated { segments: usize, duration: TimePoint },
    Exported(PathBuf),
    PreviewReady(PathBuf),
    Seeked(TimePoint),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { path, .. } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_else(|| path.to_string_lossy());
                write!(f, "Loaded video: {name}")
            }
            Self::InPointSet(t) => write!(f, "Set In Point: {t} sec"),
            Self::OutPointSet(t) => write!(f, "Set Out Point: {t} sec"),
            Self::SourceCut { start, end } => write!(f, "Video cut from {start} to {end} sec."),
            Self::SegmentCut { index, start, end } => {
                write!(f, "Segment {} cut from {start} to {end} sec.", index + 1)
            }
            Self::Concatenated { segments, duration } => {
                write!(f, "Concatenated {segments} segments ({duration} sec).")
            }
            Self::Exported(path) => write!(f, "Exported video to {}.", path.display()),
            Self::PreviewReady(_) => write!(f, "Previewing edited video..."),
            Self::Seeked(t) => write!(f, "{}", format_position(*t)),
        }
    }
}

/// State-change notifications for the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The slider range changed.
    DurationChanged(TimePoint),
    PositionChanged(TimePoint),
    /// Status-bar text.
    Status(String),
    /// A preview file is ready to play.
    PreviewReady(PathBuf),
}

/// Which commands are currently legal, for button enablement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    pub mark: bool,
    pub cut: bool,
    pub concatenate: bool,
    pub export: bool,
}
