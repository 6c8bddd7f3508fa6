//! Snipline - desktop video trimmer
//!
//! Entry point: logging, configuration, and the window.

mod app;

use anyhow::{Context, Result};
use eframe::egui;
use snipline_session::{EditSession, SessionConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::SniplineApp;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Snipline starting...");

    let config_path = SessionConfig::default_path();
    let config = SessionConfig::load_or_default(&config_path)
        .and_then(SessionConfig::apply_env)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    info!(mode = config.mode.name(), path = %config_path.display(), "Configuration loaded");

    // Optional video to open on start
    let video_path = std::env::args().nth(1).map(PathBuf::from);

    let session = EditSession::with_ffmpeg(&config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Snipline"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "Snipline",
        options,
        Box::new(move |_cc| Ok(Box::new(SniplineApp::new(session, video_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Window failed: {e}"))?;

    Ok(())
}
