//! Session configuration.
//!
//! Stored as JSON under the user config directory. A missing file means
//! defaults; a malformed one is an error.

use serde::{Deserialize, Serialize};
use snipline_core::{Result, SniplineError};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured edit mode.
pub const MODE_ENV: &str = "SNIPLINE_MODE";

/// Segment length used when none is configured.
pub const DEFAULT_SEGMENT_LENGTH: f64 = 5.0;

/// Longest accepted segment length in seconds (one day).
pub const MAX_SEGMENT_LENGTH: f64 = 86_400.0;

/// How cuts are applied to the loaded video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditMode {
    /// Cut the loaded video in place between the in and out marks.
    #[default]
    Direct,
    /// Cut fixed-length segments and concatenate them.
    Segments {
        /// Segment length in seconds.
        segment_length: f64,
    },
}

impl EditMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Segments { .. } => "segments",
        }
    }

    /// Parse a mode name, keeping the segment length of `current` if any.
    pub fn from_name(name: &str, current: EditMode) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "segments" | "segment" => Some(match current {
                Self::Segments { .. } => current,
                Self::Direct => Self::Segments {
                    segment_length: DEFAULT_SEGMENT_LENGTH,
                },
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: EditMode,
    /// Where Preview renders. Overwritten on every preview.
    pub preview_path: PathBuf,
    /// Delete the preview file when the session ends.
    pub cleanup_preview_on_exit: bool,
    /// Override for the `ffmpeg` binary.
    pub ffmpeg_path: Option<PathBuf>,
    /// Override for the `ffprobe` binary.
    pub ffprobe_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: EditMode::default(),
            preview_path: std::env::temp_dir().join("snipline-preview.mp4"),
            cleanup_preview_on_exit: true,
            ffmpeg_path: None,
            ffprobe_path: None,
        }
    }
}

impl SessionConfig {
    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snipline")
            .join("config.json")
    }

    /// Parse from JSON bytes and validate.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| SniplineError::Serialization(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match std::fs::read(path) {
            Ok(data) => Self::from_json(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| SniplineError::Serialization(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Apply `SNIPLINE_MODE` from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.with_mode_override(std::env::var(MODE_ENV).ok().as_deref())
    }

    /// Apply a mode override given by name.
    pub fn with_mode_override(mut self, mode: Option<&str>) -> Result<Self> {
        if let Some(name) = mode {
            self.mode = EditMode::from_name(name, self.mode).ok_or_else(|| {
                SniplineError::Config(format!("{MODE_ENV} must be 'direct' or 'segments', got '{name}'"))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if let EditMode::Segments { segment_length } = self.mode {
            if !segment_length.is_finite()
                || segment_length <= 0.0
                || segment_length > MAX_SEGMENT_LENGTH
            {
                return Err(SniplineError::Config(format!(
                    "segment_length must be between 0 and {MAX_SEGMENT_LENGTH} seconds, got {segment_length}"
                )));
            }
        }
        if self.preview_path.as_os_str().is_empty() {
            return Err(SniplineError::Config("preview_path is empty".into()));
        }
        Ok(())
    }
}
