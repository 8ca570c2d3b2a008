//! Processing-latency instrumentation for the per-frame pipeline.
//!
//! Keeps a rolling window of per-frame processing times and counts
//! frames that blew the real-time budget.

use std::collections::VecDeque;

/// Rolling latency samples over a fixed window.
#[derive(Debug)]
pub struct FrameTiming {
    /// Per-frame processing time (ms), oldest first.
    pub latencies_ms: VecDeque<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    /// Total frames recorded.
    pub total_frames: u64,
    /// Frames whose processing exceeded the budget.
    pub over_budget_frames: u64,
    /// Budget per frame in milliseconds.
    pub budget_ms: f64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(1000, 10.0)
    }
}

impl FrameTiming {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        Self {
            latencies_ms: VecDeque::with_capacity(window_size.max(1)),
            window_size: window_size.max(1),
            total_frames: 0,
            over_budget_frames: 0,
            budget_ms,
        }
    }

    /// Record one frame's processing time.
    pub fn record(&mut self, latency_ms: f64) {
        if self.latencies_ms.len() >= self.window_size {
            self.latencies_ms.pop_front();
        }
        self.latencies_ms.push_back(latency_ms);
        self.total_frames += 1;
        if latency_ms > self.budget_ms {
            self.over_budget_frames += 1;
        }
    }

    /// Percentile from a sorted slice (nearest rank).
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn stats(&self) -> FrameTimingStats {
        let mut sorted: Vec<f64> = self.latencies_ms.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        FrameTimingStats {
            p50_ms: Self::percentile(&sorted, 50.0),
            p95_ms: Self::percentile(&sorted, 95.0),
            p99_ms: Self::percentile(&sorted, 99.0),
            max_ms: sorted.last().copied().unwrap_or(0.0),
            over_budget_pct: if self.total_frames > 0 {
                (self.over_budget_frames as f64 / self.total_frames as f64) * 100.0
            } else {
                0.0
            },
            total_frames: self.total_frames,
            over_budget_frames: self.over_budget_frames,
        }
    }

    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:p50-ms {:.3} :p95-ms {:.3} :p99-ms {:.3} :max-ms {:.3} :budget-ms {:.1} :over-budget-pct {:.1} :total-frames {} :over-budget-frames {})",
            s.p50_ms, s.p95_ms, s.p99_ms, s.max_ms, self.budget_ms,
            s.over_budget_pct, s.total_frames, s.over_budget_frames,
        )
    }
}

/// Snapshot of `FrameTiming`.
#[derive(Debug, Clone)]
pub struct FrameTimingStats {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
    pub over_budget_pct: f64,
    pub total_frames: u64,
    pub over_budget_frames: u64,
}
