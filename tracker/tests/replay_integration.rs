//! End-to-end replay tests.
//!
//! Drive `Pipeline` through `ScriptedInputProvider` and `TraceReader`
//! with caller-chosen timestamps and a stepping `TestClock`, so every
//! run is deterministic.

use eye_gesture::clock::TestClock;
use eye_gesture::eye::{face_mesh, FrameOutcome, Gesture, GazePoint, LandmarkSet, Point2, TrackerConfig};
use eye_gesture::input_source::{InputEvent, InputProvider, ScriptedInputProvider};
use eye_gesture::pipeline::Pipeline;
use eye_gesture::sexp::{dimensions_record, frame_record, TraceReader};

use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const OPEN: f64 = 0.4;
const CLOSED: f64 = 0.1;

// ── Helpers ─────────────────────────────────────────────────

/// Full face-mesh landmark set whose eye openness ratios are
/// `left_ear` / `right_ear`.
fn face(left_ear: f64, right_ear: f64) -> LandmarkSet {
    let mut pts = vec![Point2::new(320, 240); face_mesh::POINT_COUNT];
    place_eye(&mut pts, &face_mesh::LEFT_EAR, 100, left_ear);
    place_eye(&mut pts, &face_mesh::RIGHT_EAR, 400, right_ear);
    LandmarkSet::new(pts)
}

fn place_eye(pts: &mut [Point2], idx: &[usize; 6], x0: i32, ear: f64) {
    let v = (ear * 100.0).round() as i32;
    let [top, bottom, left, right, inner, outer] = *idx;
    pts[top] = Point2::new(x0, 100);
    pts[right] = Point2::new(x0 + 100, 100);
    pts[bottom] = Point2::new(x0 + 30, 100);
    pts[outer] = Point2::new(x0 + 30, 100 + v);
    pts[left] = Point2::new(x0 + 60, 100);
    pts[inner] = Point2::new(x0 + 60, 100 + v);
}

fn pipeline() -> Pipeline {
    let clock = Arc::new(TestClock::with_step(Duration::from_micros(500)));
    Pipeline::with_clock(TrackerConfig::default(), clock).unwrap()
}

/// Replay `events`, returning the gesture of every published frame.
fn gestures(p: &mut Pipeline, events: Vec<InputEvent>) -> Vec<Gesture> {
    let mut provider = ScriptedInputProvider::new(events);
    let mut out = Vec::new();
    p.run(&mut provider, |s| out.push(s.outcome.gesture())).unwrap();
    out
}

fn frame(t: f64, l: f64, r: f64) -> InputEvent {
    InputEvent::frame(t, face(l, r))
}

// ── Gestures ────────────────────────────────────────────────

#[test]
fn test_left_wink_reported_once_per_closure() {
    let mut p = pipeline();
    let seen = gestures(
        &mut p,
        vec![
            InputEvent::Dimensions { width: 640, height: 480 },
            frame(0.0, OPEN, OPEN),
            frame(1.0, CLOSED, OPEN),
            frame(1.125, CLOSED, OPEN),
            frame(1.25, CLOSED, OPEN),
            frame(1.375, CLOSED, OPEN),
            frame(1.5, CLOSED, OPEN),
            frame(1.625, OPEN, OPEN),
        ],
    );
    assert_eq!(
        seen,
        vec![
            Gesture::None,
            Gesture::None,
            Gesture::None,
            Gesture::LeftWink,
            Gesture::None,
            Gesture::None,
            Gesture::None,
        ]
    );
    assert_eq!(p.session().gesture_count(Gesture::LeftWink), 1);
    assert_eq!(p.session().blinking_frames, 5);
}

#[test]
fn test_right_wink_too_long_is_ignored() {
    let mut p = pipeline();
    let seen = gestures(
        &mut p,
        vec![
            frame(0.0, OPEN, CLOSED),
            frame(0.125, OPEN, CLOSED),
            frame(0.625, OPEN, CLOSED),
            frame(0.75, OPEN, OPEN),
        ],
    );
    assert!(seen.iter().all(|g| g.is_none()), "{:?}", seen);
}

#[test]
fn test_double_blink() {
    let mut p = pipeline();
    let seen = gestures(
        &mut p,
        vec![
            frame(0.0, CLOSED, CLOSED),
            frame(0.125, OPEN, OPEN),
            frame(0.25, CLOSED, CLOSED),
            frame(0.375, OPEN, OPEN),
        ],
    );
    assert_eq!(seen[2], Gesture::DoubleBlink);
    assert_eq!(p.session().gesture_count(Gesture::DoubleBlink), 1);
    assert_eq!(p.session().gesture_count(Gesture::LeftWink), 0);
}

#[test]
fn test_slow_blinks_are_not_double() {
    let mut p = pipeline();
    let seen = gestures(
        &mut p,
        vec![
            frame(0.0, CLOSED, CLOSED),
            frame(0.25, OPEN, OPEN),
            frame(1.0, CLOSED, CLOSED),
            frame(1.25, OPEN, OPEN),
            frame(2.0, CLOSED, CLOSED),
        ],
    );
    assert!(seen.iter().all(|g| g.is_none()), "{:?}", seen);
}

#[test]
fn test_no_face_frames_leave_timers_alone() {
    let mut p = pipeline();
    let seen = gestures(
        &mut p,
        vec![
            frame(1.0, CLOSED, OPEN),
            InputEvent::no_face(1.125),
            frame(1.25, CLOSED, OPEN),
        ],
    );
    assert_eq!(seen, vec![Gesture::None, Gesture::None, Gesture::LeftWink]);
    assert_eq!(p.session().no_face_frames, 1);
    assert_eq!(p.session().face_frames, 2);
}

#[test]
fn test_reset_mid_closure_restarts_timer() {
    let mut p = pipeline();
    let seen = gestures(
        &mut p,
        vec![
            frame(1.0, CLOSED, OPEN),
            InputEvent::Reset,
            frame(1.25, CLOSED, OPEN),
            frame(1.5, CLOSED, OPEN),
        ],
    );
    assert_eq!(seen, vec![Gesture::None, Gesture::None, Gesture::LeftWink]);
    // Counters restarted at the reset.
    assert_eq!(p.session().total_frames, 2);
}

#[test]
fn test_threshold_change_between_frames() {
    let mut p = pipeline();
    let seen = gestures(
        &mut p,
        vec![
            frame(0.0, 0.3, OPEN),
            InputEvent::Configure(eye_gesture::input_source::ConfigUpdate {
                ear_threshold: Some(0.35),
                ..Default::default()
            }),
            frame(0.125, 0.3, OPEN),
            frame(0.375, 0.3, OPEN),
        ],
    );
    assert_eq!(seen, vec![Gesture::None, Gesture::None, Gesture::LeftWink]);
}

// ── Gaze ────────────────────────────────────────────────────

#[test]
fn test_gaze_normalized_by_dimensions() {
    let mut p = pipeline();
    let mut lm = face(OPEN, OPEN);
    let mut pts = lm.points().to_vec();
    pts[7] = Point2::new(160, 120);
    lm = LandmarkSet::new(pts);

    p.handle_event(InputEvent::Dimensions { width: 640, height: 480 })
        .unwrap();
    let snap = p.handle_event(InputEvent::frame(0.0, lm)).unwrap().unwrap();
    let r = snap.outcome.result().unwrap();
    assert_eq!(r.left_gaze, GazePoint::new(0.25, 0.25));
    assert_eq!(r.right_gaze, GazePoint::new(0.5, 0.5));
    assert_eq!(r.combined_gaze, GazePoint::new(0.375, 0.375));
    assert_eq!(p.tracker().gaze_history(), vec![GazePoint::new(0.375, 0.375)]);
}

#[test]
fn test_unknown_dimensions_give_center_gaze() {
    let mut p = pipeline();
    let snap = p
        .handle_event(InputEvent::frame(0.0, face(OPEN, OPEN)))
        .unwrap()
        .unwrap();
    assert_eq!(snap.outcome.result().unwrap().combined_gaze, GazePoint::CENTER);
}

// ── Trace replay ────────────────────────────────────────────

fn wink_trace() -> String {
    let mut lines = vec![
        "; left wink then a lost face".to_string(),
        dimensions_record(640, 480),
        frame_record(0.0, Some(&face(OPEN, OPEN))),
    ];
    for i in 0..5 {
        let t = 1.0 + i as f64 * 0.125;
        lines.push(frame_record(t, Some(&face(CLOSED, OPEN))));
    }
    lines.push(String::new());
    lines.push(frame_record(2.0, None));
    lines.push("(:type :reset)".to_string());
    lines.push(frame_record(2.125, Some(&face(OPEN, OPEN))));
    lines.join("\n")
}

#[test]
fn test_trace_replay() {
    let mut p = pipeline();
    let handoff = p.handoff();
    let mut reader = TraceReader::new(Cursor::new(wink_trace().into_bytes()));
    let mut winks = Vec::new();
    p.run(&mut reader, |s| {
        if s.outcome.gesture() == Gesture::LeftWink {
            winks.push(s.frame_number);
        }
    })
    .unwrap();

    assert_eq!(winks, vec![4]);
    assert_eq!(handoff.frame_count(), 8);
    let last = handoff.latest().unwrap();
    assert_eq!(last.frame_number, 8);
    assert!(matches!(*last.outcome, FrameOutcome::Detected(_)));
    // Only the frame after the reset is counted.
    assert_eq!(p.session().total_frames, 1);
    assert_eq!(p.timing().total_frames, 8);
    assert!((p.timing().stats().max_ms - 0.5).abs() < 1e-9);
}

#[test]
fn test_trace_error_stops_replay() {
    let mut p = pipeline();
    let text = format!("{}\n(:type :frame :t oops)\n", frame_record(0.0, None));
    let mut reader = TraceReader::new(Cursor::new(text.into_bytes()));
    let err = p.run(&mut reader, |_| {}).unwrap_err();
    assert!(format!("{:#}", err).contains("trace line 2"));
    assert_eq!(p.handoff().frame_count(), 1);
}

#[test]
fn test_replay_is_deterministic() {
    let render = || {
        let mut p = pipeline();
        let mut reader = TraceReader::new(Cursor::new(wink_trace().into_bytes()));
        let mut out = Vec::new();
        p.run(&mut reader, |s| out.push(s.outcome.to_sexp(s.frame_number)))
            .unwrap();
        out.push(p.summary_sexp());
        out.push(p.timing_sexp());
        out
    };
    assert_eq!(render(), render());
}

#[test]
fn test_reader_thread_sees_published_frames() {
    let mut p = pipeline();
    let handoff = p.handoff();
    let watcher = thread::spawn(move || {
        let mut last = 0;
        while last < 50 {
            if let Some(s) = handoff.latest() {
                assert!(s.frame_number >= last);
                last = s.frame_number;
            }
            thread::yield_now();
        }
        last
    });

    let mut provider = ScriptedInputProvider::new(
        (0..50)
            .map(|i| frame(i as f64 * 0.03125, OPEN, OPEN))
            .collect(),
    );
    while let Some(event) = provider.next_event().unwrap() {
        p.handle_event(event).unwrap();
    }
    assert_eq!(watcher.join().unwrap(), 50);
    assert!((p.session().fps() - 32.0).abs() < 1e-9);
}
