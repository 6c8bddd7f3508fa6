//! End-to-end editing scenarios across snipline-core, snipline-media and
//! snipline-session.

use crate::fakes::{direct, secs, segments};
use proptest::prelude::*;
use snipline_core::TimePoint;
use snipline_session::{Command, Outcome, SessionError, SessionEvent};
use std::path::PathBuf;

fn millis(ms: i64) -> TimePoint {
    TimePoint::new(ms, 1000)
}

// ── Direct mode ────────────────────────────────────────────────

#[test]
fn direct_trim_then_export() {
    let (mut session, sink) = direct();
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::Seek(secs(5))).unwrap();
    session.handle(Command::MarkIn).unwrap();
    session.handle(Command::Seek(secs(12))).unwrap();
    session.handle(Command::MarkOut).unwrap();
    session.handle(Command::Cut).unwrap();
    assert_eq!(session.duration(), secs(7));

    let outcome = session.handle(Command::Export("trimmed.mp4".into())).unwrap();
    assert_eq!(outcome, Outcome::Exported(PathBuf::from("trimmed.mp4")));

    let writes = sink.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].clip.duration(), secs(7));
    assert_eq!(writes[0].clip.spans()[0].range.start, secs(5));
}

#[test]
fn repeated_cuts_narrow_the_source() {
    let (mut session, _) = direct();
    session.handle(Command::Load("clip.mp4".into())).unwrap();

    session.handle(Command::Seek(secs(10))).unwrap();
    session.handle(Command::MarkIn).unwrap();
    session.handle(Command::Seek(secs(20))).unwrap();
    session.handle(Command::MarkOut).unwrap();
    session.handle(Command::Cut).unwrap();

    // Positions are now relative to the 10s clip.
    session.handle(Command::Seek(secs(2))).unwrap();
    session.handle(Command::MarkIn).unwrap();
    session.handle(Command::Seek(secs(4))).unwrap();
    session.handle(Command::MarkOut).unwrap();
    session.handle(Command::Cut).unwrap();

    let source = session.source().unwrap();
    assert_eq!(source.duration(), secs(2));
    assert_eq!(source.spans()[0].range.start, secs(12));
    assert_eq!(source.spans()[0].range.end, secs(14));
}

#[test]
fn rejected_cut_leaves_state_alone() {
    let (mut session, _) = direct();
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::Seek(secs(12))).unwrap();
    session.handle(Command::MarkIn).unwrap();
    session.handle(Command::Seek(secs(5))).unwrap();
    session.handle(Command::MarkOut).unwrap();

    let err = session.handle(Command::Cut).unwrap_err();
    assert!(matches!(err, SessionError::InvalidRange { .. }));
    assert_eq!(session.duration(), secs(30));
    assert_eq!(session.in_point(), Some(secs(12)));
    assert_eq!(session.out_point(), Some(secs(5)));
}

// ── Segment mode ───────────────────────────────────────────────

#[test]
fn segment_cut_and_concatenate() {
    let (mut session, sink) = segments(5.0);
    session.handle(Command::Load("short.mp4".into())).unwrap();

    for start in [0, 5, 10] {
        session
            .handle(Command::CutSegment { start: secs(start) })
            .unwrap();
    }
    let lengths: Vec<_> = session.segments().iter().map(|s| s.duration()).collect();
    assert_eq!(lengths, vec![secs(5), secs(5), secs(2)]);

    let outcome = session.handle(Command::Concatenate).unwrap();
    assert_eq!(
        outcome,
        Outcome::Concatenated {
            segments: 3,
            duration: secs(12)
        }
    );
    // Back-to-back segments of one file collapse into a single span.
    assert_eq!(session.composed().unwrap().spans().len(), 1);

    session.handle(Command::Export("joined.mp4".into())).unwrap();
    assert_eq!(sink.writes()[0].clip.duration(), secs(12));
}

#[test]
fn concatenation_follows_cut_order() {
    let (mut forward, _) = segments(5.0);
    forward.handle(Command::Load("clip.mp4".into())).unwrap();
    forward.handle(Command::CutSegment { start: secs(0) }).unwrap();
    forward.handle(Command::CutSegment { start: secs(5) }).unwrap();
    forward.handle(Command::Concatenate).unwrap();

    let (mut reversed, _) = segments(5.0);
    reversed.handle(Command::Load("clip.mp4".into())).unwrap();
    reversed.handle(Command::CutSegment { start: secs(5) }).unwrap();
    reversed.handle(Command::CutSegment { start: secs(0) }).unwrap();
    reversed.handle(Command::Concatenate).unwrap();

    let forward = forward.composed().unwrap();
    let reversed = reversed.composed().unwrap();
    assert_eq!(forward.duration(), reversed.duration());
    assert!(!forward.same_content(reversed));
    assert_eq!(reversed.spans()[0].range.start, secs(5));
    assert_eq!(reversed.spans()[1].range.start, secs(0));
}

#[test]
fn cut_at_playback_position() {
    let (mut session, _) = segments(5.0);
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::Seek(secs(27))).unwrap();
    let outcome = session.handle(Command::Cut).unwrap();
    assert_eq!(
        outcome,
        Outcome::SegmentCut {
            index: 0,
            start: secs(27),
            end: secs(30)
        }
    );
}

#[test]
fn segment_export_needs_concatenate() {
    let (mut session, sink) = segments(5.0);
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::Cut).unwrap();
    assert!(matches!(
        session.handle(Command::Export("out.mp4".into())),
        Err(SessionError::NothingToExport)
    ));
    assert!(sink.writes().is_empty());
}

// ── Session lifecycle ──────────────────────────────────────────

#[test]
fn commands_before_load_never_render() {
    let (mut session, sink) = direct();
    assert!(matches!(
        session.handle(Command::Export("out.mp4".into())),
        Err(SessionError::NothingToExport)
    ));
    assert!(matches!(
        session.handle(Command::Preview),
        Err(SessionError::NothingToExport)
    ));
    assert!(matches!(
        session.handle(Command::MarkIn),
        Err(SessionError::NoSourceLoaded)
    ));
    assert!(matches!(
        session.handle(Command::Cut),
        Err(SessionError::NoSourceLoaded)
    ));
    assert!(sink.writes().is_empty());
}

#[test]
fn second_load_resets_everything() {
    let (mut session, _) = segments(5.0);
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::Seek(secs(3))).unwrap();
    session.handle(Command::MarkIn).unwrap();
    session.handle(Command::Cut).unwrap();
    session.handle(Command::Concatenate).unwrap();

    session.handle(Command::Load("short.mp4".into())).unwrap();
    assert_eq!(session.duration(), secs(12));
    assert_eq!(session.position(), TimePoint::ZERO);
    assert_eq!(session.in_point(), None);
    assert!(session.segments().is_empty());
    assert!(session.composed().is_none());
}

#[test]
fn failed_load_keeps_current_video() {
    let (mut session, _) = direct();
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::Seek(secs(4))).unwrap();

    let err = session.handle(Command::Load("missing.mp4".into())).unwrap_err();
    assert!(matches!(err, SessionError::SourceUnreadable { .. }));
    assert_eq!(session.duration(), secs(30));
    assert_eq!(session.position(), secs(4));
}

#[test]
fn subscribers_see_load_and_status() {
    let (mut session, _) = direct();
    let events = session.subscribe();
    session.handle(Command::Load("clip.mp4".into())).unwrap();
    session.handle(Command::Seek(secs(5))).unwrap();
    session.handle(Command::MarkIn).unwrap();

    let received: Vec<_> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            SessionEvent::DurationChanged(secs(30)),
            SessionEvent::PositionChanged(TimePoint::ZERO),
            SessionEvent::Status("Loaded video: clip.mp4".into()),
            SessionEvent::PositionChanged(secs(5)),
            SessionEvent::Status("Set In Point: 5.00 sec".into()),
        ]
    );
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn cut_duration_is_mark_distance(start in 0i64..29_000, len in 1i64..30_000) {
        let end = (start + len).min(30_000);
        let (mut session, _) = direct();
        session.handle(Command::Load("clip.mp4".into())).unwrap();
        session.handle(Command::Seek(millis(start))).unwrap();
        session.handle(Command::MarkIn).unwrap();
        session.handle(Command::Seek(millis(end))).unwrap();
        session.handle(Command::MarkOut).unwrap();
        session.handle(Command::Cut).unwrap();
        prop_assert_eq!(session.duration(), millis(end) - millis(start));
    }

    #[test]
    fn composed_duration_is_sum_of_segments(starts in prop::collection::vec(0i64..12_000, 1..8)) {
        let (mut session, _) = segments(2.5);
        session.handle(Command::Load("short.mp4".into())).unwrap();
        for start in &starts {
            session.handle(Command::CutSegment { start: millis(*start) }).unwrap();
        }
        let expected: TimePoint = starts
            .iter()
            .map(|s| (millis(*s) + millis(2_500)).min(secs(12)) - millis(*s))
            .sum();
        session.handle(Command::Concatenate).unwrap();
        prop_assert_eq!(session.composed().unwrap().duration(), expected);
        prop_assert_eq!(session.segments().len(), starts.len());
    }
}
