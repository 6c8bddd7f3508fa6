//! Rendering clips to files.
//!
//! `FfmpegSink` renders a whole clip with a single FFmpeg run: every span
//! becomes a trimmed input and the inputs are joined with the `concat`
//! filter. Supports progress reporting and cancellation.

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use snipline_core::{parse_timecode, TimePoint};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clip::Clip;
use crate::error::SinkError;
use crate::ffmpeg::FfmpegPaths;

/// Renders a clip handle to an output file.
pub trait MediaSink: Send + Sync {
    /// Write `clip` to `path`.
    ///
    /// * `on_progress` – called as rendering advances.
    /// * `cancel` – checked while rendering; a cancelled render returns
    ///   `SinkError::Cancelled`.
    fn write(
        &self,
        clip: &Clip,
        path: &Path,
        on_progress: &mut dyn FnMut(RenderProgress),
        cancel: &RenderCancel,
    ) -> Result<(), SinkError>;
}

// ── Containers ──────────────────────────────────────────────────

/// Output container, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    Mov,
    Mkv,
    Webm,
    Avi,
}

impl Container {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp4" | "m4v" => Some(Self::Mp4),
            "mov" => Some(Self::Mov),
            "mkv" => Some(Self::Mkv),
            "webm" => Some(Self::Webm),
            "avi" => Some(Self::Avi),
            _ => None,
        }
    }

    /// FFmpeg video encoder name.
    pub fn video_encoder(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mov | Self::Mkv => "libx264",
            Self::Webm => "libvpx-vp9",
            Self::Avi => "mpeg4",
        }
    }

    /// FFmpeg audio encoder name.
    pub fn audio_encoder(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mov | Self::Mkv => "aac",
            Self::Webm => "libopus",
            Self::Avi => "libmp3lame",
        }
    }
}

// ── Progress and cancellation ───────────────────────────────────

/// Render progress information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProgress {
    /// Output time rendered so far.
    pub rendered: TimePoint,
    /// Total output duration.
    pub total: TimePoint,
}

impl RenderProgress {
    /// Completion fraction (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.rendered.to_seconds_f64() / self.total.to_seconds_f64()).clamp(0.0, 1.0)
    }
}

/// Handle for cancelling an in-progress render.
#[derive(Debug, Clone)]
pub struct RenderCancel(Arc<AtomicBool>);

impl RenderCancel {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for RenderCancel {
    fn default() -> Self {
        Self::new()
    }
}

// ── FFmpeg sink ─────────────────────────────────────────────────

/// Renders clips by running FFmpeg through ffmpeg-sidecar.
#[derive(Debug, Clone)]
pub struct FfmpegSink {
    paths: FfmpegPaths,
}

impl FfmpegSink {
    pub fn new(paths: FfmpegPaths) -> Self {
        Self { paths }
    }

    /// Build the FFmpeg arguments that render `clip` to `path`.
    pub fn ffmpeg_args(clip: &Clip, path: &Path) -> Result<Vec<String>, SinkError> {
        if clip.is_empty() {
            return Err(SinkError::EmptyClip);
        }
        let container = Container::from_path(path).ok_or_else(|| {
            SinkError::Encode(format!("unsupported output extension: {}", path.display()))
        })?;
        let with_audio = clip.has_audio();

        let mut args: Vec<String> = vec!["-hide_banner".into(), "-y".into()];

        let mut pads = String::new();
        for (index, span) in clip.spans().iter().enumerate() {
            args.extend_from_slice(&[
                "-ss".into(),
                format!("{:.6}", span.range.start.to_seconds_f64()),
                "-t".into(),
                format!("{:.6}", span.duration().to_seconds_f64()),
                "-i".into(),
                span.path.to_string_lossy().into_owned(),
            ]);
            pads.push_str(&format!("[{index}:v:0]"));
            if with_audio {
                pads.push_str(&format!("[{index}:a:0]"));
            }
        }

        let count = clip.spans().len();
        let filter = if with_audio {
            format!("{pads}concat=n={count}:v=1:a=1[outv][outa]")
        } else {
            format!("{pads}concat=n={count}:v=1:a=0[outv]")
        };
        args.extend_from_slice(&["-filter_complex".into(), filter]);

        args.extend_from_slice(&["-map".into(), "[outv]".into()]);
        if with_audio {
            args.extend_from_slice(&["-map".into(), "[outa]".into()]);
        }

        args.extend_from_slice(&[
            "-c:v".into(),
            container.video_encoder().into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ]);
        if with_audio {
            args.extend_from_slice(&["-c:a".into(), container.audio_encoder().into()]);
        }
        if matches!(container, Container::Mp4 | Container::Mov) {
            args.extend_from_slice(&["-movflags".into(), "+faststart".into()]);
        }

        args.push(path.to_string_lossy().into_owned());
        Ok(args)
    }
}

impl MediaSink for FfmpegSink {
    fn write(
        &self,
        clip: &Clip,
        path: &Path,
        on_progress: &mut dyn FnMut(RenderProgress),
        cancel: &RenderCancel,
    ) -> Result<(), SinkError> {
        let args = Self::ffmpeg_args(clip, path)?;
        let total = clip.duration();
        debug!(?args, "Spawning ffmpeg");
        info!(output = %path.display(), duration = %total, "Rendering clip");

        let mut child = FfmpegCommand::new_with_path(&self.paths.ffmpeg)
            .args(&args)
            .spawn()
            .map_err(|e| SinkError::Spawn(e.to_string()))?;

        let events = child.iter().map_err(|e| SinkError::Spawn(e.to_string()))?;

        let mut last_error = None;
        for event in events {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                discard_partial(path);
                info!(output = %path.display(), "Render cancelled");
                return Err(SinkError::Cancelled);
            }

            match event {
                FfmpegEvent::Progress(progress) => {
                    if let Some(rendered) = parse_timecode(&progress.time) {
                        on_progress(RenderProgress {
                            rendered: rendered.min(total),
                            total,
                        });
                    }
                }
                FfmpegEvent::Error(message)
                | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                    warn!(%message, "ffmpeg reported an error");
                    last_error = Some(message);
                }
                _ => {}
            }
        }

        let status = child.wait()?;
        if cancel.is_cancelled() {
            discard_partial(path);
            info!(output = %path.display(), "Render cancelled");
            return Err(SinkError::Cancelled);
        }
        if !status.success() {
            discard_partial(path);
            return Err(SinkError::Encode(
                last_error.unwrap_or_else(|| format!("ffmpeg exited with status: {status}")),
            ));
        }

        on_progress(RenderProgress {
            rendered: total,
            total,
        });
        info!(output = %path.display(), "Render finished");
        Ok(())
    }
}

/// Remove whatever FFmpeg wrote before it stopped.
fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(output = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(error = %e, output = %path.display(), "Failed to remove partial output"),
    }
}
