//! Per-run counters: frames, detections, blinks, gestures and frame rate.

use std::collections::VecDeque;

use super::gesture::Gesture;
use super::tracker::FrameOutcome;

/// Accumulated statistics for one tracking session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub total_frames: u64,
    pub face_frames: u64,
    pub no_face_frames: u64,
    pub blinking_frames: u64,
    /// Indexed like `Gesture::ALL`.
    gesture_counts: [u64; Gesture::ALL.len()],
    /// Instantaneous rates (frames/s), most recent last.
    rates: VecDeque<f64>,
    fps_window: usize,
    last_timestamp_s: Option<f64>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SessionStats {
    pub fn new(fps_window: usize) -> Self {
        let fps_window = fps_window.max(1);
        Self {
            total_frames: 0,
            face_frames: 0,
            no_face_frames: 0,
            blinking_frames: 0,
            gesture_counts: [0; Gesture::ALL.len()],
            rates: VecDeque::with_capacity(fps_window),
            fps_window,
            last_timestamp_s: None,
        }
    }

    pub fn record(&mut self, outcome: &FrameOutcome) {
        self.total_frames += 1;
        match outcome {
            FrameOutcome::Detected(r) => {
                self.face_frames += 1;
                if r.is_blinking {
                    self.blinking_frames += 1;
                }
                if !r.gesture.is_none() {
                    self.gesture_counts[gesture_slot(r.gesture)] += 1;
                }
            }
            FrameOutcome::NoDetection { .. } => self.no_face_frames += 1,
        }

        let t = outcome.timestamp_s();
        if let Some(prev) = self.last_timestamp_s {
            let dt = t - prev;
            // Repeated or out-of-order timestamps carry no rate information.
            if dt > 0.0 {
                if self.rates.len() >= self.fps_window {
                    self.rates.pop_front();
                }
                self.rates.push_back(1.0 / dt);
            }
        }
        self.last_timestamp_s = Some(t);
    }

    /// Mean of the recent instantaneous rates; 0.0 before two frames.
    pub fn fps(&self) -> f64 {
        if self.rates.is_empty() {
            return 0.0;
        }
        self.rates.iter().sum::<f64>() / self.rates.len() as f64
    }

    pub fn gesture_count(&self, gesture: Gesture) -> u64 {
        if gesture.is_none() {
            return 0;
        }
        self.gesture_counts[gesture_slot(gesture)]
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.fps_window);
    }

    pub fn summary_sexp(&self) -> String {
        let gestures: Vec<String> = Gesture::ALL
            .iter()
            .filter(|g| !g.is_none())
            .map(|g| format!(":{} {}", g.as_str(), self.gesture_count(*g)))
            .collect();
        format!(
            "(:type :summary :frames {} :face-frames {} :no-face-frames {} :blinking-frames {} :fps {:.1} :gestures ({}))",
            self.total_frames,
            self.face_frames,
            self.no_face_frames,
            self.blinking_frames,
            self.fps(),
            gestures.join(" "),
        )
    }
}

fn gesture_slot(gesture: Gesture) -> usize {
    Gesture::ALL
        .iter()
        .position(|g| *g == gesture)
        .unwrap_or(0)
}
