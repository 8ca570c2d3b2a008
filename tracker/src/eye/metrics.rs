//! Per-frame eye metrics: openness ratio (EAR) and normalized gaze.
//!
//! Everything here is a pure function of one frame's landmarks and the
//! frame dimensions.  Degenerate input never errors; it collapses to
//! `0.0` for the ratio (reads as "closed") and to `GazePoint::CENTER`
//! for gaze.

use super::landmarks::{face_mesh, EarIndices, EyeIndices, LandmarkSet};

// ── Gaze point ──────────────────────────────────────────────

/// Gaze position normalized to the frame, `(0, 0)` top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazePoint {
    pub x: f64,
    pub y: f64,
}

impl GazePoint {
    /// Default when nothing better is known.
    pub const CENTER: GazePoint = GazePoint { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Arithmetic mean of two points.
    pub fn midpoint(&self, other: &GazePoint) -> GazePoint {
        GazePoint {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

impl Default for GazePoint {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Pixel size of the source frames.  Zero means "not known yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
}

impl FrameDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

// ── Ratio and gaze ──────────────────────────────────────────

/// Eye aspect ratio: `(|bottom-outer| + |left-inner|) / (2 * |top-right|)`.
///
/// Returns `0.0` if the set does not reach every index or the horizontal
/// distance is zero.
pub fn eye_aspect_ratio(landmarks: &LandmarkSet, idx: &EarIndices) -> f64 {
    if !landmarks.covers(&idx.as_array()) {
        return 0.0;
    }
    let p = |i: usize| landmarks.get(i).unwrap_or_default();

    let vertical_1 = p(idx.bottom).distance(&p(idx.outer));
    let vertical_2 = p(idx.left).distance(&p(idx.inner));
    let horizontal = p(idx.top).distance(&p(idx.right));

    if horizontal == 0.0 {
        return 0.0;
    }
    (vertical_1 + vertical_2) / (2.0 * horizontal)
}

/// Gaze estimate for one eye: the reference landmark divided by the
/// frame size.  Falls back to `CENTER` when the contour is incomplete or
/// the dimensions are unknown.
pub fn gaze_point(landmarks: &LandmarkSet, eye: &EyeIndices, dims: FrameDimensions) -> GazePoint {
    if !landmarks.covers(&eye.contour) || !dims.is_known() {
        return GazePoint::CENTER;
    }
    match eye.gaze_landmark().and_then(|i| landmarks.get(i)) {
        Some(p) => GazePoint {
            x: f64::from(p.x) / f64::from(dims.width),
            y: f64::from(p.y) / f64::from(dims.height),
        },
        None => GazePoint::CENTER,
    }
}

/// Mean of both eyes.  Blink state is not consulted.
pub fn combined_gaze(left: GazePoint, right: GazePoint) -> GazePoint {
    left.midpoint(&right)
}

// ── Extractor ───────────────────────────────────────────────

/// Metrics derived from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeMetrics {
    pub left_ear: f64,
    pub right_ear: f64,
    pub left_gaze: GazePoint,
    pub right_gaze: GazePoint,
    pub combined_gaze: GazePoint,
}

/// Stateless extractor bound to a landmark convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsExtractor {
    pub left: EyeIndices,
    pub right: EyeIndices,
}

impl Default for MetricsExtractor {
    fn default() -> Self {
        Self {
            left: face_mesh::left_eye(),
            right: face_mesh::right_eye(),
        }
    }
}

impl MetricsExtractor {
    pub fn new(left: EyeIndices, right: EyeIndices) -> Self {
        Self { left, right }
    }

    pub fn extract(&self, landmarks: &LandmarkSet, dims: FrameDimensions) -> EyeMetrics {
        let left_gaze = gaze_point(landmarks, &self.left, dims);
        let right_gaze = gaze_point(landmarks, &self.right, dims);
        EyeMetrics {
            left_ear: eye_aspect_ratio(landmarks, &self.left.ear),
            right_ear: eye_aspect_ratio(landmarks, &self.right.ear),
            left_gaze,
            right_gaze,
            combined_gaze: combined_gaze(left_gaze, right_gaze),
        }
    }
}
