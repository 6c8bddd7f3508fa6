//! Opening media files into clips.

use serde::Deserialize;
use snipline_core::TimePoint;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::clip::Clip;
use crate::error::SourceError;
use crate::ffmpeg::FfmpegPaths;

/// Opens a file path into a clip handle.
pub trait MediaSource {
    fn open(&self, path: &Path) -> Result<Clip, SourceError>;
}

/// Probes files with `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfmpegSource {
    paths: FfmpegPaths,
}

impl FfmpegSource {
    pub fn new(paths: FfmpegPaths) -> Self {
        Self { paths }
    }
}

impl MediaSource for FfmpegSource {
    fn open(&self, path: &Path) -> Result<Clip, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        let output = Command::new(&self.paths.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration:stream=codec_type",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(SourceError::Spawn)?;

        if !output.status.success() {
            return Err(SourceError::Probe {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let probe = ProbeOutput::parse(&output.stdout).map_err(|reason| SourceError::Probe {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(?probe, "ffprobe result");
        info!(path = %path.display(), duration = %probe.duration, "Opened media");

        Ok(Clip::from_source(path, probe.duration, probe.has_audio))
    }
}

/// The subset of ffprobe's JSON we use.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProbeOutput {
    pub duration: TimePoint,
    pub has_audio: bool,
}

#[derive(Deserialize)]
struct RawProbe {
    #[serde(default)]
    streams: Vec<RawStream>,
    format: Option<RawFormat>,
}

#[derive(Deserialize)]
struct RawStream {
    codec_type: Option<String>,
}

#[derive(Deserialize)]
struct RawFormat {
    duration: Option<String>,
}

impl ProbeOutput {
    pub(crate) fn parse(json: &[u8]) -> Result<Self, String> {
        let raw: RawProbe =
            serde_json::from_slice(json).map_err(|e| format!("invalid ffprobe output: {e}"))?;

        let has_video = raw
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("video"));
        if !has_video {
            return Err("no video stream".into());
        }
        let has_audio = raw
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        let seconds = raw
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| "unknown duration".to_string())?;

        Ok(Self {
            duration: TimePoint::from_seconds_f64(seconds),
            has_audio,
        })
    }
}
