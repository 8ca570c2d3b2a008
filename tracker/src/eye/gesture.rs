//! Gesture classification: turn per-frame openness ratios into wink and
//! double-blink events.
//!
//! `GestureStateMachine::classify` is called once per processed frame with
//! caller-supplied, non-decreasing timestamps.  It never reads the wall
//! clock, so identical call sequences always produce identical output.

use tracing::{debug, info};

use super::config::{validate_ear_threshold, validate_wink_range, TrackerConfig};

// ── Gesture taxonomy ────────────────────────────────────────

/// The gesture reported for a frame.  Exactly one per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    #[default]
    None,
    LeftWink,
    RightWink,
    DoubleBlink,
    /// Reserved: no gaze-stability trigger exists yet, so this is never
    /// produced by `classify`.
    SustainedGaze,
}

impl Gesture {
    pub const ALL: [Gesture; 5] = [
        Gesture::None,
        Gesture::LeftWink,
        Gesture::RightWink,
        Gesture::DoubleBlink,
        Gesture::SustainedGaze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LeftWink => "left-wink",
            Self::RightWink => "right-wink",
            Self::DoubleBlink => "double-blink",
            Self::SustainedGaze => "sustained-gaze",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "left-wink" => Some(Self::LeftWink),
            "right-wink" => Some(Self::RightWink),
            "double-blink" => Some(Self::DoubleBlink),
            "sustained-gaze" => Some(Self::SustainedGaze),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Which eye a single-eye closure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn wink(&self) -> Gesture {
        match self {
            Self::Left => Gesture::LeftWink,
            Self::Right => Gesture::RightWink,
        }
    }
}

// ── Config ──────────────────────────────────────────────────

/// Thresholds consulted by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Ratio below which an eye is closed.
    pub ear_threshold: f64,
    /// Inclusive wink duration window (seconds).
    pub wink_min_s: f64,
    pub wink_max_s: f64,
    /// Maximum gap between both-eyes-closed frames that still counts
    /// toward a double-blink (seconds, exclusive).
    pub double_blink_window_s: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

impl From<&TrackerConfig> for GestureConfig {
    fn from(c: &TrackerConfig) -> Self {
        Self {
            ear_threshold: c.ear_threshold,
            wink_min_s: c.wink_min_s,
            wink_max_s: c.wink_max_s,
            double_blink_window_s: c.double_blink_window_s,
        }
    }
}

// ── State ───────────────────────────────────────────────────

/// Closure tracking for one eye.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EyeClosure {
    /// When the eye last went from open to closed; `None` while open.
    pub closed_since: Option<f64>,
    /// A wink was already reported for the current closure.
    pub wink_reported: bool,
}

impl EyeClosure {
    /// Apply this frame's open/closed observation.
    fn observe(&mut self, eye: Eye, closed: bool, timestamp_s: f64) {
        if closed {
            if self.closed_since.is_none() {
                self.closed_since = Some(timestamp_s);
                debug!("{} eye closed at {:.3}s", eye.as_str(), timestamp_s);
            }
        } else if let Some(since) = self.closed_since.take() {
            self.wink_reported = false;
            debug!(
                "{} eye reopened after {:.0}ms",
                eye.as_str(),
                (timestamp_s - since) * 1000.0
            );
        }
    }
}

/// Mutable state of one machine; reset restores `Default`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureState {
    pub left: EyeClosure,
    pub right: EyeClosure,
    /// Timestamp of the most recent both-eyes-closed frame.
    pub last_double_blink_event: Option<f64>,
    /// Both-eyes-closed frames counted in the current window.
    pub blink_count_in_window: u32,
}

// ── State machine ───────────────────────────────────────────

/// Per-subject wink / double-blink classifier.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    config: GestureConfig,
    state: GestureState,
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureStateMachine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn left_eye_closed_since(&self) -> Option<f64> {
        self.state.left.closed_since
    }

    pub fn right_eye_closed_since(&self) -> Option<f64> {
        self.state.right.closed_since
    }

    /// True if `ratio` counts as a closed eye under the current threshold.
    pub fn is_closed(&self, ratio: f64) -> bool {
        ratio < self.config.ear_threshold
    }

    /// Takes effect on the next `classify`; past frames are not revisited.
    pub fn set_ear_threshold(&mut self, threshold: f64) -> anyhow::Result<()> {
        validate_ear_threshold(threshold)?;
        info!(
            "EAR threshold {:.3} -> {:.3}",
            self.config.ear_threshold, threshold
        );
        self.config.ear_threshold = threshold;
        Ok(())
    }

    pub fn set_wink_duration_range(&mut self, min_s: f64, max_s: f64) -> anyhow::Result<()> {
        validate_wink_range(min_s, max_s)?;
        info!("Wink window [{:.3}, {:.3}]s", min_s, max_s);
        self.config.wink_min_s = min_s;
        self.config.wink_max_s = max_s;
        Ok(())
    }

    /// Classify one frame.
    pub fn classify(&mut self, left_ratio: f64, right_ratio: f64, timestamp_s: f64) -> Gesture {
        let left_closed = self.is_closed(left_ratio);
        let right_closed = self.is_closed(right_ratio);

        // Timers first: an open eye clears its timer unconditionally.
        self.state.left.observe(Eye::Left, left_closed, timestamp_s);
        self.state.right.observe(Eye::Right, right_closed, timestamp_s);

        let gesture = match (left_closed, right_closed) {
            (true, false) => self.check_wink(Eye::Left, timestamp_s),
            (false, true) => self.check_wink(Eye::Right, timestamp_s),
            (true, true) => self.check_double_blink(timestamp_s),
            (false, false) => Gesture::None,
        };

        if !gesture.is_none() {
            info!("{} at {:.3}s", gesture.as_str(), timestamp_s);
        }
        gesture
    }

    /// Single-eye closure: report a wink on the first frame whose closure
    /// duration falls inside the window.
    fn check_wink(&mut self, eye: Eye, timestamp_s: f64) -> Gesture {
        let (min_s, max_s) = (self.config.wink_min_s, self.config.wink_max_s);
        let closure = match eye {
            Eye::Left => &mut self.state.left,
            Eye::Right => &mut self.state.right,
        };
        let Some(since) = closure.closed_since else {
            return Gesture::None;
        };
        if closure.wink_reported {
            return Gesture::None;
        }

        let duration = timestamp_s - since;
        if duration >= min_s && duration <= max_s {
            closure.wink_reported = true;
            return eye.wink();
        }
        if duration > max_s {
            debug!(
                "{} closure {:.0}ms past wink window (max {:.0}ms)",
                eye.as_str(),
                duration * 1000.0,
                max_s * 1000.0
            );
        }
        Gesture::None
    }

    /// Both eyes closed: count closures that follow each other within the
    /// double-blink window.
    fn check_double_blink(&mut self, timestamp_s: f64) -> Gesture {
        let within_window = self
            .state
            .last_double_blink_event
            .map_or(false, |last| timestamp_s - last < self.config.double_blink_window_s);

        let mut gesture = Gesture::None;
        if within_window {
            self.state.blink_count_in_window += 1;
            if self.state.blink_count_in_window >= 2 {
                self.state.blink_count_in_window = 0;
                gesture = Gesture::DoubleBlink;
            }
        } else {
            self.state.blink_count_in_window = 1;
        }
        self.state.last_double_blink_event = Some(timestamp_s);
        debug!(
            "both eyes closed at {:.3}s (count {})",
            timestamp_s, self.state.blink_count_in_window
        );
        gesture
    }

    /// Clear timers and the blink counter; configuration is kept.
    pub fn reset(&mut self) {
        self.state = GestureState::default();
    }

    /// Status as an s-expression plist.
    pub fn status_sexp(&self) -> String {
        let opt = |v: Option<f64>| v.map_or_else(|| "nil".to_string(), |t| format!("{:.3}", t));
        format!(
            "(:left-closed-since {} :right-closed-since {} :last-both-closed {} :blink-count {})",
            opt(self.state.left.closed_since),
            opt(self.state.right.closed_since),
            opt(self.state.last_double_blink_event),
            self.state.blink_count_in_window,
        )
    }
}

// ── Tests ───────────────────────────────────────────────────
