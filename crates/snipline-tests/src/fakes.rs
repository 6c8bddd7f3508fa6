//! In-memory media services shared by the integration tests.

use parking_lot::Mutex;
use snipline_core::TimePoint;
use snipline_media::{
    Clip, MediaSink, MediaSource, RenderCancel, RenderProgress, SinkError, SourceError,
};
use snipline_session::{EditMode, EditSession, SessionConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn secs(s: i64) -> TimePoint {
    TimePoint::from_secs(s)
}

/// Serves fixed durations for a handful of relative paths.
pub struct LibrarySource {
    durations: HashMap<PathBuf, TimePoint>,
}

impl LibrarySource {
    pub fn standard() -> Self {
        Self {
            durations: HashMap::from([
                (PathBuf::from("clip.mp4"), secs(30)),
                (PathBuf::from("short.mp4"), secs(12)),
            ]),
        }
    }
}

impl MediaSource for LibrarySource {
    fn open(&self, path: &Path) -> Result<Clip, SourceError> {
        self.durations
            .get(path)
            .map(|d| Clip::from_source(path, *d, true))
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }
}

/// One `MediaSink::write` call.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub clip: Clip,
    pub path: PathBuf,
}

/// Records every write and reports progress in two steps.
#[derive(Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<RecordedWrite>>,
}

impl RecordingSink {
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().clone()
    }
}

impl MediaSink for RecordingSink {
    fn write(
        &self,
        clip: &Clip,
        path: &Path,
        on_progress: &mut dyn FnMut(RenderProgress),
        cancel: &RenderCancel,
    ) -> Result<(), SinkError> {
        if cancel.is_cancelled() {
            return Err(SinkError::Cancelled);
        }
        let total = clip.duration();
        on_progress(RenderProgress {
            rendered: TimePoint::ZERO,
            total,
        });
        on_progress(RenderProgress {
            rendered: total,
            total,
        });
        self.writes.lock().push(RecordedWrite {
            clip: clip.clone(),
            path: path.to_path_buf(),
        });
        Ok(())
    }
}

pub fn session(mode: EditMode, preview_path: PathBuf) -> (EditSession, Arc<RecordingSink>) {
    let config = SessionConfig {
        mode,
        preview_path,
        ..SessionConfig::default()
    };
    let sink = Arc::new(RecordingSink::default());
    let session = EditSession::new(&config, Box::new(LibrarySource::standard()), sink.clone());
    (session, sink)
}

pub fn direct() -> (EditSession, Arc<RecordingSink>) {
    session(EditMode::Direct, PathBuf::from("/nonexistent/preview.mp4"))
}

pub fn segments(segment_length: f64) -> (EditSession, Arc<RecordingSink>) {
    session(
        EditMode::Segments { segment_length },
        PathBuf::from("/nonexistent/preview.mp4"),
    )
}
