//! Locating the FFmpeg binaries.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Paths to the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FfmpegPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for FfmpegPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl FfmpegPaths {
    /// Search PATH for both binaries, falling back to the bare names.
    pub fn discover() -> Self {
        Self {
            ffmpeg: find_binary("ffmpeg"),
            ffprobe: find_binary("ffprobe"),
        }
    }

    /// Replace either path when an override is given.
    pub fn with_overrides(mut self, ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        if let Some(path) = ffmpeg {
            self.ffmpeg = path;
        }
        if let Some(path) = ffprobe {
            self.ffprobe = path;
        }
        self
    }

    /// True when both binaries resolve to an executable.
    pub fn is_available(&self) -> bool {
        which::which(&self.ffmpeg).is_ok() && which::which(&self.ffprobe).is_ok()
    }
}

fn find_binary(name: &str) -> PathBuf {
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}
