//! Clip handles.
//!
//! A `Clip` is an edit list: an ordered run of spans over source files.
//! `subclip` and `concatenate` only rearrange spans, so they are cheap and
//! never touch media. Rendering happens in a [`crate::MediaSink`].

use serde::{Deserialize, Serialize};
use snipline_core::{TimePoint, TimeRange};
use std::path::{Path, PathBuf};

use crate::error::ClipError;

/// A contiguous range of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Path to the source media file
    pub path: PathBuf,
    /// Range within the source file
    pub range: TimeRange,
    /// Whether the source carries an audio stream
    pub has_audio: bool,
}

impl Span {
    pub fn duration(&self) -> TimePoint {
        self.range.duration()
    }

    /// True when `next` continues this span in the same file.
    fn joins(&self, next: &Span) -> bool {
        self.path == next.path && self.range.end == next.range.start && self.has_audio == next.has_audio
    }
}

/// An immutable handle to media with a known duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    spans: Vec<Span>,
}

impl Clip {
    /// A clip covering a whole source file.
    pub fn from_source(path: impl Into<PathBuf>, duration: TimePoint, has_audio: bool) -> Self {
        let span = Span {
            path: path.into(),
            range: TimeRange::new(TimePoint::ZERO, duration),
            has_audio,
        };
        Self::from_spans(vec![span])
    }

    fn from_spans(spans: Vec<Span>) -> Self {
        let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans.into_iter().filter(|s| !s.range.is_empty()) {
            match merged.last_mut() {
                Some(last) if last.joins(&span) => last.range.end = span.range.end,
                _ => merged.push(span),
            }
        }
        Self { spans: merged }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn duration(&self) -> TimePoint {
        self.spans.iter().map(Span::duration).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// True if any span reads from `path`.
    pub fn reads_from(&self, path: &Path) -> bool {
        self.spans.iter().any(|s| s.path == path)
    }

    /// True if every span carries audio.
    pub fn has_audio(&self) -> bool {
        !self.spans.is_empty() && self.spans.iter().all(|s| s.has_audio)
    }

    /// Same spans in the same order, regardless of handle identity.
    pub fn same_content(&self, other: &Clip) -> bool {
        self.spans == other.spans
    }

    /// Extract `[start, end)` of this clip as a new clip.
    ///
    /// Valid only for `0 <= start < end <= duration`.
    pub fn subclip(&self, start: TimePoint, end: TimePoint) -> Result<Clip, ClipError> {
        let duration = self.duration();
        if start.is_negative() || start >= end || end > duration {
            return Err(ClipError::InvalidRange {
                start,
                end,
                duration,
            });
        }

        let wanted = TimeRange::new(start, end);
        let mut offset = TimePoint::ZERO;
        let mut spans = Vec::new();
        for span in &self.spans {
            let placed = TimeRange::with_duration(offset, span.duration());
            if let Some(hit) = placed.intersection(wanted) {
                let local = hit.shifted_back(offset).shifted(span.range.start);
                spans.push(Span {
                    path: span.path.clone(),
                    range: local,
                    has_audio: span.has_audio,
                });
            }
            offset = placed.end;
            if offset >= end {
                break;
            }
        }
        Ok(Clip::from_spans(spans))
    }

    /// Join clips end to end in the given order.
    pub fn concatenate<'a>(clips: impl IntoIterator<Item = &'a Clip>) -> Clip {
        let spans = clips
            .into_iter()
            .flat_map(|c| c.spans.iter().cloned())
            .collect();
        Clip::from_spans(spans)
    }
}
