//! Bounded FIFO of recent combined-gaze points for trail rendering.

use std::collections::VecDeque;

use super::metrics::GazePoint;

/// Most recent gaze points, oldest first.
#[derive(Debug, Clone)]
pub struct GazeHistoryBuffer {
    points: VecDeque<GazePoint>,
    capacity: usize,
}

impl GazeHistoryBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest if full.
    pub fn push(&mut self, point: GazePoint) {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Owned copy of the contents, oldest first.
    pub fn snapshot(&self) -> Vec<GazePoint> {
        self.points.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<GazePoint> {
        self.points.back().copied()
    }
}
