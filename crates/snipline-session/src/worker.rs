//! Background rendering.
//!
//! A render works on its own copy of the clip, so the session stays usable
//! (and unchanged) while FFmpeg runs. Results come back over a channel and
//! are folded into the session with `EditSession::complete_render`.

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use snipline_media::{Clip, MediaSink, RenderCancel, RenderProgress, SinkError};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Why a clip is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Export,
    Preview,
}

/// A clip snapshot and where to render it.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub kind: RenderKind,
    pub clip: Clip,
    pub output: PathBuf,
}

#[derive(Debug)]
pub enum RenderEvent {
    Progress(RenderProgress),
    Finished,
    Cancelled,
    Failed(SinkError),
}

impl RenderEvent {
    /// Convert a terminal event into the sink result it stands for.
    pub fn into_result(self) -> Option<Result<(), SinkError>> {
        match self {
            Self::Progress(_) => None,
            Self::Finished => Some(Ok(())),
            Self::Cancelled => Some(Err(SinkError::Cancelled)),
            Self::Failed(err) => Some(Err(err)),
        }
    }
}

/// A render running on a worker thread.
///
/// Dropping the handle cancels the render and waits for the thread.
pub struct RenderHandle {
    job: RenderJob,
    events: Receiver<RenderEvent>,
    cancel: RenderCancel,
    thread: Option<JoinHandle<()>>,
}

impl RenderHandle {
    /// Start rendering `job` with `sink` on a new thread.
    pub fn spawn(sink: Arc<dyn MediaSink>, job: RenderJob) -> Result<Self, SinkError> {
        let (tx, events) = unbounded();
        let cancel = RenderCancel::new();

        let worker_job = job.clone();
        let worker_cancel = cancel.clone();
        let thread = thread::Builder::new()
            .name("snipline-render".into())
            .spawn(move || {
                let progress_tx = tx.clone();
                let mut on_progress = |progress: RenderProgress| {
                    let _ = progress_tx.send(RenderEvent::Progress(progress));
                };
                let result = sink.write(
                    &worker_job.clip,
                    &worker_job.output,
                    &mut on_progress,
                    &worker_cancel,
                );
                let event = match result {
                    Ok(()) => RenderEvent::Finished,
                    Err(SinkError::Cancelled) => RenderEvent::Cancelled,
                    Err(err) => {
                        warn!(error = %err, output = %worker_job.output.display(), "Render failed");
                        RenderEvent::Failed(err)
                    }
                };
                let _ = tx.send(event);
            })?;

        info!(kind = ?job.kind, output = %job.output.display(), "Render started");
        Ok(Self {
            job,
            events,
            cancel,
            thread: Some(thread),
        })
    }

    pub fn job(&self) -> &RenderJob {
        &self.job
    }

    /// Ask the sink to stop. The terminal event will be `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Next event without blocking.
    pub fn try_next(&self) -> Option<RenderEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the next event; `None` once the worker is gone.
    pub fn next_blocking(&self) -> Option<RenderEvent> {
        self.events.recv().ok()
    }

    /// Block until the render ends, discarding progress.
    pub fn wait(self) -> Result<(), SinkError> {
        while let Some(event) = self.next_blocking() {
            if let Some(result) = event.into_result() {
                return result;
            }
        }
        Err(SinkError::Encode("render worker exited without a result".into()))
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            if !thread.is_finished() {
                self.cancel.cancel();
            }
            let _ = thread.join();
        }
    }
}
