//! Rendering through the session: background jobs, preview files, and the
//! FFmpeg command line a composed clip turns into.

use crate::fakes::{direct, secs, segments, session};
use snipline_media::FfmpegSink;
use snipline_session::{
    Command, EditMode, Outcome, RenderEvent, RenderKind, SessionError, SessionEvent,
};
use std::path::{Path, PathBuf};

#[test]
fn background_export_reports_progress() {
    let (mut session, sink) = direct();
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    let events = session.subscribe();

    let handle = session
        .render_in_background(RenderKind::Export, Some(PathBuf::from("bg.mp4")))
        .unwrap();
    let mut progress = Vec::new();
    let result = loop {
        match handle.next_blocking().unwrap() {
            RenderEvent::Progress(p) => progress.push(p.fraction()),
            terminal => break terminal.into_result().unwrap(),
        }
    };
    let job = handle.job().clone();
    drop(handle);

    assert_eq!(progress, vec![0.0, 1.0]);
    let outcome = session.complete_render(&job, result).unwrap();
    assert_eq!(outcome, Outcome::Exported(PathBuf::from("bg.mp4")));
    assert_eq!(sink.writes()[0].clip.duration(), secs(30));
    assert_eq!(
        events.try_iter().last(),
        Some(SessionEvent::Status("Exported video to bg.mp4.".into()))
    );
}

#[test]
fn export_over_source_is_refused() {
    let (mut session, sink) = direct();
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    let err = session
        .handle(Command::Export("clip.mp4".into()))
        .unwrap_err();
    assert!(matches!(err, SessionError::SameAsSource(_)));
    assert!(sink.writes().is_empty());
}

#[test]
fn preview_file_removed_with_session() {
    let dir = tempfile::tempdir().unwrap();
    let preview = dir.path().join("preview.mp4");
    let (mut session, sink) = session(EditMode::Direct, preview.clone());
    session.handle(Command::Load("clip.mp4".into())).unwrap();

    let events = session.subscribe();
    session.handle(Command::Preview).unwrap();
    // The recording sink does not write media, so stand in for it.
    std::fs::write(&preview, b"preview").unwrap();

    assert_eq!(sink.writes()[0].path, preview);
    assert!(events
        .try_iter()
        .any(|e| e == SessionEvent::PreviewReady(preview.clone())));

    drop(session);
    assert!(!preview.exists());
}

#[test]
fn preview_file_kept_when_nothing_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let preview = dir.path().join("preview.mp4");
    std::fs::write(&preview, b"from an earlier run").unwrap();

    let (mut session, _) = session(EditMode::Direct, preview.clone());
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    drop(session);
    assert!(preview.exists());
}

#[test]
fn composed_clip_becomes_concat_filter() {
    let (mut session, _) = segments(5.0);
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::CutSegment { start: secs(20) }).unwrap();
    session.handle(Command::CutSegment { start: secs(0) }).unwrap();
    session.handle(Command::Concatenate).unwrap();

    let composed = session.composed().unwrap();
    let args = FfmpegSink::ffmpeg_args(composed, Path::new("joined.mp4")).unwrap();

    let seeks: Vec<&str> = args
        .windows(2)
        .filter(|w| w[0] == "-ss")
        .map(|w| w[1].as_str())
        .collect();
    assert_eq!(seeks, vec!["20.000000", "0.000000"]);

    let filter = args
        .iter()
        .position(|a| a == "-filter_complex")
        .map(|i| args[i + 1].as_str());
    assert_eq!(
        filter,
        Some("[0:v:0][0:a:0][1:v:0][1:a:0]concat=n=2:v=1:a=1[outv][outa]")
    );
    assert_eq!(args.last().map(String::as_str), Some("joined.mp4"));
}
