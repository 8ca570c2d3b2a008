//! Landmark primitives and the face-mesh index convention for the eyes.
//!
//! A `LandmarkSet` is the per-frame output of the external landmark
//! provider: pixel coordinates addressed by position.  Which positions
//! belong to which eye is fixed by the provider's model; `EyeIndices`
//! carries that convention so another model can be plugged in.

// ── Points ──────────────────────────────────────────────────

/// A single landmark in integer pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point2 {
    pub x: i32,
    pub y: i32,
}

impl Point2 {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ordered landmark coordinates for one detected face in one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSet {
    points: Vec<Point2>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    /// True if every index in `indices` addresses an existing point.
    pub fn covers(&self, indices: &[usize]) -> bool {
        indices
            .iter()
            .max()
            .map_or(true, |&max| max < self.points.len())
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }
}

impl From<Vec<(i32, i32)>> for LandmarkSet {
    fn from(points: Vec<(i32, i32)>) -> Self {
        Self::new(points.into_iter().map(|(x, y)| Point2::new(x, y)).collect())
    }
}

// ── Index convention ────────────────────────────────────────

/// Six landmark positions used for the openness ratio, in role order:
/// top, bottom, left corner, right corner, inner, outer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarIndices {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
    pub inner: usize,
    pub outer: usize,
}

impl EarIndices {
    pub const fn from_array(idx: [usize; 6]) -> Self {
        Self {
            top: idx[0],
            bottom: idx[1],
            left: idx[2],
            right: idx[3],
            inner: idx[4],
            outer: idx[5],
        }
    }

    pub fn as_array(&self) -> [usize; 6] {
        [
            self.top,
            self.bottom,
            self.left,
            self.right,
            self.inner,
            self.outer,
        ]
    }
}

/// Face-mesh positions describing one eye.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EyeIndices {
    /// Points used for the openness ratio.
    pub ear: EarIndices,
    /// Contour points of the eye; availability of the gaze estimate
    /// requires all of them to be present.
    pub contour: Vec<usize>,
    /// Position within `contour` of the gaze reference landmark.
    pub gaze_reference: usize,
}

impl EyeIndices {
    /// Landmark index of the gaze reference point, if the contour has one.
    pub fn gaze_landmark(&self) -> Option<usize> {
        self.contour.get(self.gaze_reference).copied()
    }
}

/// MediaPipe face-mesh (refined, 478 points) indices.
pub mod face_mesh {
    use super::{EarIndices, EyeIndices};

    pub const LEFT_EAR: [usize; 6] = [33, 160, 158, 133, 153, 144];
    pub const RIGHT_EAR: [usize; 6] = [362, 385, 387, 263, 373, 380];

    pub const LEFT_CONTOUR: [usize; 16] = [
        33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246,
    ];
    pub const RIGHT_CONTOUR: [usize; 16] = [
        362, 382, 381, 380, 374, 373, 390, 249, 263, 466, 388, 387, 386, 385, 384, 398,
    ];

    /// Number of points produced with refined landmarks (incl. iris).
    pub const POINT_COUNT: usize = 478;

    pub fn left_eye() -> EyeIndices {
        EyeIndices {
            ear: EarIndices::from_array(LEFT_EAR),
            contour: LEFT_CONTOUR.to_vec(),
            gaze_reference: 1,
        }
    }

    pub fn right_eye() -> EyeIndices {
        EyeIndices {
            ear: EarIndices::from_array(RIGHT_EAR),
            contour: RIGHT_CONTOUR.to_vec(),
            gaze_reference: 1,
        }
    }
}
