//! Per-frame pipeline: landmarks -> metrics -> gesture -> gaze history.
//!
//! `EyeTracker` owns the stateful parts (closure timers, blink counter,
//! gaze trail) for one tracked subject.  It is single-threaded and does
//! no I/O; hand results to other threads through `ResultHandoff`.

use anyhow::Result;
use tracing::{debug, info};

use super::config::TrackerConfig;
use super::gaze_history::GazeHistoryBuffer;
use super::gesture::{Gesture, GestureConfig, GestureStateMachine};
use super::landmarks::LandmarkSet;
use super::metrics::{FrameDimensions, GazePoint, MetricsExtractor};
use crate::sexp::format_event;

// ── Results ─────────────────────────────────────────────────

/// Everything derived from one frame that had landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeFrameResult {
    /// Caller-supplied frame timestamp (seconds).
    pub timestamp_s: f64,
    pub left_ear: f64,
    pub right_ear: f64,
    pub left_gaze: GazePoint,
    pub right_gaze: GazePoint,
    pub combined_gaze: GazePoint,
    /// Either eye below the threshold this frame.
    pub is_blinking: bool,
    pub gesture: Gesture,
    /// Landmarks the values were derived from, kept for overlays.
    pub landmarks: LandmarkSet,
}

impl EyeFrameResult {
    /// Render as an `:eye-frame` event.  Landmarks are omitted.
    pub fn to_sexp(&self, frame_number: u64) -> String {
        let frame = frame_number.to_string();
        let t = format!("{:.3}", self.timestamp_s);
        let left_ear = format!("{:.4}", self.left_ear);
        let right_ear = format!("{:.4}", self.right_ear);
        let left_gaze = gaze_sexp(self.left_gaze);
        let right_gaze = gaze_sexp(self.right_gaze);
        let combined_gaze = gaze_sexp(self.combined_gaze);
        let gesture = format!(":{}", self.gesture.as_str());
        format_event(
            "eye-frame",
            &[
                ("frame", frame.as_str()),
                ("t", t.as_str()),
                ("left-ear", left_ear.as_str()),
                ("right-ear", right_ear.as_str()),
                ("left-gaze", left_gaze.as_str()),
                ("right-gaze", right_gaze.as_str()),
                ("combined-gaze", combined_gaze.as_str()),
                ("blinking", if self.is_blinking { "t" } else { "nil" }),
                ("gesture", gesture.as_str()),
            ],
        )
    }
}

fn gaze_sexp(p: GazePoint) -> String {
    format!("({:.4} {:.4})", p.x, p.y)
}

/// Outcome of one `process` call.  "No face" is its own case, never a
/// zeroed result.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Detected(EyeFrameResult),
    NoDetection { timestamp_s: f64 },
}

impl FrameOutcome {
    pub fn result(&self) -> Option<&EyeFrameResult> {
        match self {
            Self::Detected(r) => Some(r),
            Self::NoDetection { .. } => None,
        }
    }

    pub fn timestamp_s(&self) -> f64 {
        match self {
            Self::Detected(r) => r.timestamp_s,
            Self::NoDetection { timestamp_s } => *timestamp_s,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.result().map_or(Gesture::None, |r| r.gesture)
    }

    pub fn to_sexp(&self, frame_number: u64) -> String {
        match self {
            Self::Detected(r) => r.to_sexp(frame_number),
            Self::NoDetection { timestamp_s } => {
                let frame = frame_number.to_string();
                let t = format!("{:.3}", timestamp_s);
                format_event("no-face", &[("frame", frame.as_str()), ("t", t.as_str())])
            }
        }
    }
}

// ── Tracker ─────────────────────────────────────────────────

/// One subject's tracking session.
#[derive(Debug, Clone)]
pub struct EyeTracker {
    config: TrackerConfig,
    extractor: MetricsExtractor,
    machine: GestureStateMachine,
    history: GazeHistoryBuffer,
    dims: FrameDimensions,
}

impl EyeTracker {
    /// Tracker using the face-mesh landmark convention.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::with_extractor(config, MetricsExtractor::default())
    }

    pub fn with_extractor(config: TrackerConfig, extractor: MetricsExtractor) -> Result<Self> {
        config.validate()?;
        info!("eye tracker configured: {}", config.to_sexp());
        Ok(Self {
            machine: GestureStateMachine::new(GestureConfig::from(&config)),
            history: GazeHistoryBuffer::new(config.gaze_history_capacity),
            extractor,
            dims: FrameDimensions::default(),
            config,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn gesture_machine(&self) -> &GestureStateMachine {
        &self.machine
    }

    /// Set or change the source frame size used for gaze normalization.
    pub fn set_frame_dimensions(&mut self, width: u32, height: u32) {
        let dims = FrameDimensions::new(width, height);
        if dims != self.dims {
            info!("frame dimensions {}x{}", width, height);
            self.dims = dims;
        }
    }

    pub fn frame_dimensions(&self) -> FrameDimensions {
        self.dims
    }

    pub fn set_ear_threshold(&mut self, threshold: f64) -> Result<()> {
        self.machine.set_ear_threshold(threshold)?;
        self.config.ear_threshold = threshold;
        Ok(())
    }

    pub fn set_wink_duration_range(&mut self, min_s: f64, max_s: f64) -> Result<()> {
        self.machine.set_wink_duration_range(min_s, max_s)?;
        self.config.wink_min_s = min_s;
        self.config.wink_max_s = max_s;
        Ok(())
    }

    /// Process one frame.  `None` landmarks means the provider found no
    /// face; no state changes in that case.
    pub fn process(&mut self, landmarks: Option<LandmarkSet>, timestamp_s: f64) -> FrameOutcome {
        let Some(landmarks) = landmarks else {
            debug!("no face at {:.3}s", timestamp_s);
            return FrameOutcome::NoDetection { timestamp_s };
        };

        let m = self.extractor.extract(&landmarks, self.dims);
        let gesture = self.machine.classify(m.left_ear, m.right_ear, timestamp_s);
        self.history.push(m.combined_gaze);

        FrameOutcome::Detected(EyeFrameResult {
            timestamp_s,
            left_ear: m.left_ear,
            right_ear: m.right_ear,
            left_gaze: m.left_gaze,
            right_gaze: m.right_gaze,
            combined_gaze: m.combined_gaze,
            is_blinking: self.machine.is_closed(m.left_ear) || self.machine.is_closed(m.right_ear),
            gesture,
            landmarks,
        })
    }

    /// Oldest-first copy of the gaze trail.
    pub fn gaze_history(&self) -> Vec<GazePoint> {
        self.history.snapshot()
    }

    /// Clear timers, blink counter and gaze trail.  Configuration and
    /// frame dimensions are kept.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.history.clear();
        info!("eye tracker reset");
    }

    pub fn config_sexp(&self) -> String {
        self.config.to_sexp()
    }

    pub fn status_sexp(&self) -> String {
        format!(
            "(:width {} :height {} :gaze-points {} :gesture {})",
            self.dims.width,
            self.dims.height,
            self.history.len(),
            self.machine.status_sexp(),
        )
    }
}
