//! Tracking session configuration.

use anyhow::{bail, Result};

/// Thresholds and window sizes for one tracking session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Openness ratio below which an eye counts as closed.
    pub ear_threshold: f64,
    /// Shortest single-eye closure reported as a wink (seconds).
    pub wink_min_s: f64,
    /// Longest single-eye closure reported as a wink (seconds).
    pub wink_max_s: f64,
    /// Two both-eyes-closed frames closer than this form a double-blink (seconds).
    pub double_blink_window_s: f64,
    /// Combined-gaze points kept for trail rendering.
    pub gaze_history_capacity: usize,
    /// Inter-frame intervals averaged into the reported FPS.
    pub fps_window: usize,
    /// Per-frame processing budget (ms).
    pub frame_budget_ms: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            wink_min_s: 0.2,
            wink_max_s: 0.5,
            double_blink_window_s: 0.5,
            gaze_history_capacity: 30,
            fps_window: 30,
            frame_budget_ms: 10.0,
        }
    }
}

impl TrackerConfig {
    /// Check every field; the first violation is returned.
    pub fn validate(&self) -> Result<()> {
        validate_ear_threshold(self.ear_threshold)?;
        validate_wink_range(self.wink_min_s, self.wink_max_s)?;
        if !self.double_blink_window_s.is_finite() || self.double_blink_window_s <= 0.0 {
            bail!(
                "double-blink window must be positive, got {}",
                self.double_blink_window_s
            );
        }
        if self.gaze_history_capacity == 0 {
            bail!("gaze history capacity must be at least 1");
        }
        if self.fps_window == 0 {
            bail!("fps window must be at least 1");
        }
        if !self.frame_budget_ms.is_finite() || self.frame_budget_ms <= 0.0 {
            bail!("frame budget must be positive, got {}", self.frame_budget_ms);
        }
        Ok(())
    }

    /// Render as an s-expression plist.
    pub fn to_sexp(&self) -> String {
        format!(
            "(:ear-threshold {:.3} :wink-min {:.3} :wink-max {:.3} :double-blink-window {:.3} :gaze-history {} :fps-window {} :frame-budget-ms {:.1})",
            self.ear_threshold,
            self.wink_min_s,
            self.wink_max_s,
            self.double_blink_window_s,
            self.gaze_history_capacity,
            self.fps_window,
            self.frame_budget_ms,
        )
    }
}

pub(crate) fn validate_ear_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        bail!("ear threshold must be a positive number, got {}", threshold);
    }
    Ok(())
}

pub(crate) fn validate_wink_range(min_s: f64, max_s: f64) -> Result<()> {
    if !min_s.is_finite() || !max_s.is_finite() {
        bail!("wink duration range must be finite, got [{}, {}]", min_s, max_s);
    }
    if min_s < 0.0 || min_s > max_s {
        bail!("invalid wink duration range [{}, {}]", min_s, max_s);
    }
    Ok(())
}
