//! The Snipline window.
//!
//! Pure presentation: every action becomes a `Command` for the session, and
//! everything shown comes from session events.

use crossbeam_channel::Receiver;
use eframe::egui;
use snipline_core::{format_position, TimePoint};
use snipline_session::{Command, EditSession, RenderEvent, RenderHandle, RenderKind, SessionEvent};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

pub struct SniplineApp {
    session: EditSession,
    events: Receiver<SessionEvent>,
    duration: TimePoint,
    position: TimePoint,
    status: String,
    playing: bool,
    last_tick: Instant,
    render: Option<RenderHandle>,
    render_progress: f32,
    previewing: Option<PathBuf>,
}

impl SniplineApp {
    pub fn new(mut session: EditSession, video_path: Option<PathBuf>) -> Self {
        let events = session.subscribe();
        let status = if session.backend_available() {
            "Open a video to start"
        } else {
            "FFmpeg not found: install it or set ffmpeg_path in the config"
        };
        let mut app = Self {
            session,
            events,
            duration: TimePoint::ZERO,
            position: TimePoint::ZERO,
            status: status.to_string(),
            playing: false,
            last_tick: Instant::now(),
            render: None,
            render_progress: 0.0,
            previewing: None,
        };
        if let Some(path) = video_path {
            app.dispatch(Command::Load(path));
        }
        app
    }

    fn dispatch(&mut self, command: Command) {
        if let Err(err) = self.session.handle(command) {
            debug!(error = %err, "Command failed");
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::DurationChanged(duration) => {
                    self.duration = duration;
                    self.playing = false;
                }
                SessionEvent::PositionChanged(position) => self.position = position,
                SessionEvent::Status(message) => self.status = message,
                SessionEvent::PreviewReady(path) => {
                    info!(path = %path.display(), "Preview ready");
                    self.previewing = Some(path);
                }
            }
        }
    }

    fn start_render(&mut self, kind: RenderKind, output: Option<PathBuf>) {
        match self.session.render_in_background(kind, output) {
            Ok(handle) => {
                self.render = Some(handle);
                self.render_progress = 0.0;
                self.status = match kind {
                    RenderKind::Export => "Exporting...".into(),
                    RenderKind::Preview => "Rendering preview...".into(),
                };
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn poll_render(&mut self) {
        let Some(handle) = self.render.as_ref() else {
            return;
        };
        let mut finished = None;
        while let Some(event) = handle.try_next() {
            match event {
                RenderEvent::Progress(progress) => {
                    self.render_progress = progress.fraction() as f32;
                }
                terminal => {
                    finished = terminal.into_result();
                    break;
                }
            }
        }
        if let Some(result) = finished {
            if let Some(handle) = self.render.take() {
                let job = handle.job().clone();
                drop(handle);
                // Status is reported through the session's events.
                let _ = self.session.complete_render(&job, result);
            }
        }
    }

    fn tick_playback(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        if !self.playing {
            return;
        }
        let next = self.position + TimePoint::from_seconds_f64(elapsed);
        if next >= self.duration {
            self.playing = false;
        }
        self.dispatch(Command::Seek(next));
    }

    fn open_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Open Video")
            .add_filter("Video Files", &["mp4", "avi", "mov", "mkv"])
            .pick_file();
        if let Some(path) = picked {
            self.previewing = None;
            self.dispatch(Command::Load(path));
        }
    }

    fn export_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Export Video")
            .add_filter("MP4 Files", &["mp4"])
            .set_file_name("export.mp4")
            .save_file();
        if let Some(path) = picked {
            self.start_render(RenderKind::Export, Some(path));
        }
    }
}

impl eframe::App for SniplineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.poll_render();
        self.tick_playback();

        if self.playing || self.render.is_some() {
            ctx.request_repaint();
        }

        let availability = self.session.availability();
        let idle = self.render.is_none();
        let loaded = self.session.source().is_some();

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.add_enabled(idle, egui::Button::new("Open Video")).clicked() {
                    self.open_dialog();
                }
                ui.separator();
                ui.label(format!("Mode: {}", self.session.mode_name()));
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                if let Some(handle) = &self.render {
                    ui.add(
                        egui::ProgressBar::new(self.render_progress)
                            .desired_width(200.0)
                            .show_percentage(),
                    );
                    if ui.button("Cancel").clicked() {
                        handle.cancel();
                    }
                }
            });
        });

        // Editing tools
        egui::TopBottomPanel::bottom("edit_tools").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let play_label = if self.playing { "⏸" } else { "▶" };
                if ui.add_enabled(loaded, egui::Button::new(play_label)).clicked() {
                    if !self.playing && self.position >= self.duration {
                        self.dispatch(Command::Seek(TimePoint::ZERO));
                    }
                    self.playing = !self.playing;
                }

                let mut seconds = self.position.to_seconds_f64();
                let max = self.duration.to_seconds_f64();
                ui.spacing_mut().slider_width = (ui.available_width() - 80.0).max(100.0);
                let slider = egui::Slider::new(&mut seconds, 0.0..=max).show_value(false);
                if ui.add_enabled(loaded, slider).changed() {
                    self.dispatch(Command::Seek(TimePoint::from_seconds_f64(seconds)));
                }
                ui.label(format_position(self.position));
            });

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(availability.mark, egui::Button::new("Set In Point"))
                    .clicked()
                {
                    self.dispatch(Command::MarkIn);
                }
                if ui
                    .add_enabled(availability.mark, egui::Button::new("Set Out Point"))
                    .clicked()
                {
                    self.dispatch(Command::MarkOut);
                }
                if ui
                    .add_enabled(availability.cut, egui::Button::new("Cut Video"))
                    .clicked()
                {
                    self.dispatch(Command::Cut);
                }
                if self.session.is_segment_mode() {
                    let label = format!("Concatenate ({})", self.session.segments().len());
                    if ui
                        .add_enabled(availability.concatenate, egui::Button::new(label))
                        .clicked()
                    {
                        self.dispatch(Command::Concatenate);
                    }
                }
                if ui
                    .add_enabled(availability.export && idle, egui::Button::new("Preview"))
                    .clicked()
                {
                    self.start_render(RenderKind::Preview, None);
                }
                if ui
                    .add_enabled(availability.export && idle, egui::Button::new("Export"))
                    .clicked()
                {
                    self.export_dialog();
                }
            });
        });

        // Viewport
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::hover());
            let rect = response.rect;
            painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(20, 20, 20));

            let text = match (&self.previewing, self.session.source()) {
                (Some(preview), _) => format!("Preview written to\n{}", preview.display()),
                (None, Some(source)) => {
                    let mut lines = vec![format!("Duration: {} sec", source.duration())];
                    if let Some(t) = self.session.in_point() {
                        lines.push(format!("In: {t} sec"));
                    }
                    if let Some(t) = self.session.out_point() {
                        lines.push(format!("Out: {t} sec"));
                    }
                    if !self.session.segments().is_empty() {
                        lines.push(format!("Segments: {}", self.session.segments().len()));
                    }
                    lines.join("\n")
                }
                (None, None) => "No video loaded\nUse Open Video to load a file".into(),
            };
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(16.0),
                egui::Color32::GRAY,
            );
        });
    }
}
