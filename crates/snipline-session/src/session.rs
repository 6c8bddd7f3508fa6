//! The edit session.
//!
//! `EditSession` owns everything the editor knows about the current edit
//! and is the only place state changes. The UI issues [`Command`]s through
//! [`EditSession::handle`] and renders what comes back, plus the
//! [`SessionEvent`]s sent to subscribers.
//!
//! Every command either completes or returns a [`SessionError`] with the
//! session left exactly as it was.

use crossbeam_channel::{unbounded, Receiver, Sender};
use snipline_core::TimePoint;
use snipline_media::{
    Clip, FfmpegPaths, FfmpegSink, FfmpegSource, MediaSink, MediaSource, RenderCancel,
    RenderProgress, SinkError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::command::{Availability, Command, Outcome, SessionEvent};
use crate::config::{EditMode, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::worker::{RenderHandle, RenderJob, RenderKind};

/// Cut behaviour, resolved from [`EditMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Direct,
    Segments { length: TimePoint },
}

pub struct EditSession {
    strategy: Strategy,
    media: Box<dyn MediaSource>,
    sink: Arc<dyn MediaSink>,
    backend_available: bool,
    preview_path: PathBuf,
    cleanup_preview: bool,
    preview_written: bool,

    source: Option<Clip>,
    in_point: Option<TimePoint>,
    out_point: Option<TimePoint>,
    segments: Vec<Clip>,
    composed: Option<Clip>,
    position: TimePoint,

    subscribers: Vec<Sender<SessionEvent>>,
}

impl EditSession {
    /// Create a session over the given media services.
    pub fn new(
        config: &SessionConfig,
        media: Box<dyn MediaSource>,
        sink: Arc<dyn MediaSink>,
    ) -> Self {
        let strategy = match config.mode {
            EditMode::Direct => Strategy::Direct,
            EditMode::Segments { segment_length } => Strategy::Segments {
                length: TimePoint::from_seconds_f64(segment_length),
            },
        };
        info!(mode = config.mode.name(), "Edit session created");
        Self {
            strategy,
            media,
            sink,
            backend_available: true,
            preview_path: config.preview_path.clone(),
            cleanup_preview: config.cleanup_preview_on_exit,
            preview_written: false,
            source: None,
            in_point: None,
            out_point: None,
            segments: Vec::new(),
            composed: None,
            position: TimePoint::ZERO,
            subscribers: Vec::new(),
        }
    }

    /// Create a session backed by FFmpeg, honouring binary overrides.
    pub fn with_ffmpeg(config: &SessionConfig) -> Self {
        let paths = FfmpegPaths::discover()
            .with_overrides(config.ffmpeg_path.clone(), config.ffprobe_path.clone());
        let available = snipline_media::init(&paths);
        let mut session = Self::new(
            config,
            Box::new(FfmpegSource::new(paths.clone())),
            Arc::new(FfmpegSink::new(paths)),
        );
        session.backend_available = available;
        session
    }

    /// Receive state-change notifications.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    // ── Observable state ────────────────────────────────────────

    pub fn source(&self) -> Option<&Clip> {
        self.source.as_ref()
    }

    pub fn in_point(&self) -> Option<TimePoint> {
        self.in_point
    }

    pub fn out_point(&self) -> Option<TimePoint> {
        self.out_point
    }

    /// Segments in cut order.
    pub fn segments(&self) -> &[Clip] {
        &self.segments
    }

    pub fn composed(&self) -> Option<&Clip> {
        self.composed.as_ref()
    }

    pub fn position(&self) -> TimePoint {
        self.position
    }

    /// Duration of the loaded source, zero when nothing is loaded.
    pub fn duration(&self) -> TimePoint {
        self.source
            .as_ref()
            .map(Clip::duration)
            .unwrap_or(TimePoint::ZERO)
    }

    pub fn mode_name(&self) -> &'static str {
        match self.strategy {
            Strategy::Direct => "direct",
            Strategy::Segments { .. } => "segments",
        }
    }

    pub fn is_segment_mode(&self) -> bool {
        matches!(self.strategy, Strategy::Segments { .. })
    }

    /// False when the media backend could not find its tools at startup.
    pub fn backend_available(&self) -> bool {
        self.backend_available
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview_path
    }

    /// Which commands would currently succeed their precondition checks.
    pub fn availability(&self) -> Availability {
        let loaded = self.source.is_some();
        let cut = match self.strategy {
            Strategy::Direct => matches!(
                (self.in_point, self.out_point),
                (Some(a), Some(b)) if loaded && a < b
            ),
            Strategy::Segments { .. } => loaded && self.position < self.duration(),
        };
        Availability {
            mark: loaded,
            cut,
            concatenate: !self.segments.is_empty(),
            export: self.render_clip().is_some(),
        }
    }

    // ── Commands ────────────────────────────────────────────────

    /// Apply one command.
    pub fn handle(&mut self, command: Command) -> SessionResult<Outcome> {
        debug!(command = command.name(), "Handling command");
        let result = match command {
            Command::Load(path) => self.load(path),
            Command::MarkIn => self.mark(true),
            Command::MarkOut => self.mark(false),
            Command::Cut => self.cut(None),
            Command::CutSegment { start } => self.cut(Some(start)),
            Command::Concatenate => self.concatenate(),
            Command::Export(path) => self.render_now(RenderKind::Export, Some(path)),
            Command::Preview => self.render_now(RenderKind::Preview, None),
            Command::Seek(position) => Ok(self.seek(position)),
        };

        match &result {
            Ok(Outcome::Seeked(_)) => {}
            Ok(outcome) => self.emit(SessionEvent::Status(outcome.to_string())),
            Err(err) => {
                warn!(error = %err, "Command rejected");
                self.emit(SessionEvent::Status(err.to_string()));
            }
        }
        result
    }

    fn load(&mut self, path: PathBuf) -> SessionResult<Outcome> {
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        let clip = self
            .media
            .open(&path)
            .map_err(|e| SessionError::SourceUnreadable {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let duration = clip.duration();
        self.source = Some(clip);
        self.in_point = None;
        self.out_point = None;
        self.segments.clear();
        self.composed = None;
        self.position = TimePoint::ZERO;

        info!(path = %path.display(), %duration, "Loaded source");
        self.emit(SessionEvent::DurationChanged(duration));
        self.emit(SessionEvent::PositionChanged(self.position));
        Ok(Outcome::Loaded { path, duration })
    }

    fn mark(&mut self, is_in: bool) -> SessionResult<Outcome> {
        if self.source.is_none() {
            return Err(SessionError::NoSourceLoaded);
        }
        let at = self.position;
        if is_in {
            self.in_point = Some(at);
            Ok(Outcome::InPointSet(at))
        } else {
            self.out_point = Some(at);
            Ok(Outcome::OutPointSet(at))
        }
    }

    fn cut(&mut self, start: Option<TimePoint>) -> SessionResult<Outcome> {
        let source = self.source.as_ref().ok_or(SessionError::NoSourceLoaded)?;

        match self.strategy {
            Strategy::Direct => {
                if start.is_some() {
                    return Err(SessionError::Unsupported {
                        command: "CutSegment",
                        mode: self.mode_name(),
                    });
                }
                let start = self.in_point.ok_or(SessionError::MarkNotSet("In"))?;
                let end = self.out_point.ok_or(SessionError::MarkNotSet("Out"))?;
                let cut = source.subclip(start, end)?;
                let duration = cut.duration();

                self.source = Some(cut);
                self.in_point = None;
                self.out_point = None;
                self.position = self.position.clamp_to(TimePoint::ZERO, duration);

                info!(%start, %end, "Cut source");
                self.emit(SessionEvent::DurationChanged(duration));
                self.emit(SessionEvent::PositionChanged(self.position));
                Ok(Outcome::SourceCut { start, end })
            }
            Strategy::Segments { length } => {
                let start = start.unwrap_or(self.position);
                let duration = source.duration();
                let end = (start + length).min(duration);
                let segment = source.subclip(start, end)?;

                self.segments.push(segment);
                let index = self.segments.len() - 1;
                info!(index, %start, %end, "Cut segment");
                Ok(Outcome::SegmentCut { index, start, end })
            }
        }
    }

    fn concatenate(&mut self) -> SessionResult<Outcome> {
        if self.segments.is_empty() {
            return Err(SessionError::NoSegments);
        }
        let composed = Clip::concatenate(&self.segments);
        let duration = composed.duration();
        self.composed = Some(composed);
        info!(segments = self.segments.len(), %duration, "Concatenated segments");
        Ok(Outcome::Concatenated {
            segments: self.segments.len(),
            duration,
        })
    }

    fn seek(&mut self, position: TimePoint) -> Outcome {
        let clamped = position.clamp_to(TimePoint::ZERO, self.duration());
        if clamped != self.position {
            self.position = clamped;
            self.emit(SessionEvent::PositionChanged(clamped));
        }
        Outcome::Seeked(clamped)
    }

    // ── Rendering ───────────────────────────────────────────────

    /// The clip Export/Preview act on in the current mode.
    fn render_clip(&self) -> Option<&Clip> {
        match self.strategy {
            Strategy::Direct => self.source.as_ref(),
            Strategy::Segments { .. } => self.composed.as_ref(),
        }
    }

    /// Check preconditions and snapshot what a render should write.
    ///
    /// `output` is required for exports and ignored for previews.
    pub fn prepare_render(
        &self,
        kind: RenderKind,
        output: Option<PathBuf>,
    ) -> SessionResult<RenderJob> {
        let clip = self.render_clip().ok_or(SessionError::NothingToExport)?;
        let output = match kind {
            RenderKind::Preview => self.preview_path.clone(),
            RenderKind::Export => output.ok_or(SessionError::NothingToExport)?,
        };
        if overwrites_source(clip, &output) {
            return Err(SessionError::SameAsSource(output));
        }
        Ok(RenderJob {
            kind,
            clip: clip.clone(),
            output,
        })
    }

    /// Fold the result of a finished render into the session.
    ///
    /// A failed or cancelled render changes nothing but the status line.
    pub fn complete_render(
        &mut self,
        job: &RenderJob,
        result: Result<(), SinkError>,
    ) -> SessionResult<Outcome> {
        let result = match result {
            Ok(()) => {
                let outcome = match job.kind {
                    RenderKind::Export => Outcome::Exported(job.output.clone()),
                    RenderKind::Preview => {
                        self.preview_written = true;
                        self.emit(SessionEvent::PreviewReady(job.output.clone()));
                        Outcome::PreviewReady(job.output.clone())
                    }
                };
                Ok(outcome)
            }
            Err(err) => Err(SessionError::Sink(err)),
        };
        match &result {
            Ok(outcome) => self.emit(SessionEvent::Status(outcome.to_string())),
            Err(err) => {
                warn!(error = %err, "Render did not complete");
                self.emit(SessionEvent::Status(err.to_string()));
            }
        }
        result
    }

    /// Start a render on a worker thread.
    pub fn render_in_background(
        &self,
        kind: RenderKind,
        output: Option<PathBuf>,
    ) -> SessionResult<RenderHandle> {
        let job = self.prepare_render(kind, output)?;
        Ok(RenderHandle::spawn(Arc::clone(&self.sink), job)?)
    }

    fn render_now(&mut self, kind: RenderKind, output: Option<PathBuf>) -> SessionResult<Outcome> {
        let job = self.prepare_render(kind, output)?;
        let result = self
            .sink
            .write(&job.clip, &job.output, &mut |_: RenderProgress| {}, &RenderCancel::new());
        match (job.kind, result) {
            (RenderKind::Export, Ok(())) => {
                info!(output = %job.output.display(), "Exported");
                Ok(Outcome::Exported(job.output))
            }
            (RenderKind::Preview, Ok(())) => {
                self.preview_written = true;
                self.emit(SessionEvent::PreviewReady(job.output.clone()));
                Ok(Outcome::PreviewReady(job.output))
            }
            (_, Err(err)) => Err(SessionError::Sink(err)),
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        if self.cleanup_preview && self.preview_written {
            match std::fs::remove_file(&self.preview_path) {
                Ok(()) => debug!(path = %self.preview_path.display(), "Removed preview file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(error = %e, "Failed to remove preview file"),
            }
        }
    }
}

/// True if writing to `output` would clobber a file `clip` reads from.
fn overwrites_source(clip: &Clip, output: &Path) -> bool {
    if clip.reads_from(output) {
        return true;
    }
    std::fs::canonicalize(output)
        .map(|resolved| clip.reads_from(&resolved))
        .unwrap_or(false)
}
