//! Snipline Media - clips and the media services behind them
//!
//! This crate handles:
//! - The immutable `Clip` edit list (subclip, concatenate)
//! - The `MediaSource` / `MediaSink` service traits
//! - FFmpeg-backed implementations driven through ffmpeg-sidecar

pub mod clip;
pub mod error;
pub mod ffmpeg;
pub mod sink;
pub mod source;

pub use clip::{Clip, Span};
pub use error::{ClipError, SinkError, SourceError};
pub use ffmpeg::FfmpegPaths;
pub use sink::{Container, FfmpegSink, MediaSink, RenderCancel, RenderProgress};
pub use source::{FfmpegSource, MediaSource};

/// Log which FFmpeg binaries will be used (call once at startup).
///
/// Returns false when either binary cannot be found.
pub fn init(paths: &FfmpegPaths) -> bool {
    let available = paths.is_available();
    if available {
        tracing::info!(
            ffmpeg = %paths.ffmpeg.display(),
            ffprobe = %paths.ffprobe.display(),
            "Snipline media initialized"
        );
    } else {
        tracing::warn!(
            ffmpeg = %paths.ffmpeg.display(),
            ffprobe = %paths.ffprobe.display(),
            "FFmpeg binaries not found"
        );
    }
    available
}
