//! Event loop glue: provider events in, published outcomes out.
//!
//! `Pipeline` owns the tracker and the per-run instrumentation.  Each
//! frame is processed, timed, counted and published to the handoff, in
//! that order.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::eye::{EyeTracker, FrameTiming, ResultHandoff, SessionStats, Snapshot, TrackerConfig};
use crate::input_source::{ConfigUpdate, InputEvent, InputProvider};

pub struct Pipeline {
    tracker: EyeTracker,
    session: SessionStats,
    timing: FrameTiming,
    handoff: ResultHandoff,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: TrackerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let session = SessionStats::new(config.fps_window);
        let timing = FrameTiming::new(1000, config.frame_budget_ms);
        Ok(Self {
            tracker: EyeTracker::new(config)?,
            session,
            timing,
            handoff: ResultHandoff::new(),
            clock,
        })
    }

    pub fn tracker(&self) -> &EyeTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut EyeTracker {
        &mut self.tracker
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// A reader handle sharing this pipeline's latest-result slot.
    pub fn handoff(&self) -> ResultHandoff {
        self.handoff.clone()
    }

    /// Apply one event.  Frames yield the published snapshot; other
    /// events yield `None`.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<Option<Snapshot>> {
        match event {
            InputEvent::Dimensions { width, height } => {
                self.tracker.set_frame_dimensions(width, height);
                Ok(None)
            }
            InputEvent::Frame {
                timestamp_s,
                landmarks,
            } => {
                let start = self.clock.now();
                let outcome = self.tracker.process(landmarks, timestamp_s);
                let latency_ms = self.clock.elapsed_ms(start);
                self.timing.record(latency_ms);
                self.session.record(&outcome);
                let snapshot = self.handoff.publish(outcome);
                debug!(
                    "frame {} processed in {:.3}ms",
                    snapshot.frame_number, latency_ms
                );
                Ok(Some(snapshot))
            }
            InputEvent::Configure(update) => {
                self.apply_config(&update);
                Ok(None)
            }
            InputEvent::Reset => {
                self.tracker.reset();
                self.session.reset();
                info!("session reset");
                Ok(None)
            }
        }
    }

    /// Rejected settings are logged and the previous values kept.
    fn apply_config(&mut self, update: &ConfigUpdate) {
        if update.is_empty() {
            warn!("configuration record without settings ignored");
            return;
        }
        if let Some(threshold) = update.ear_threshold {
            if let Err(e) = self.tracker.set_ear_threshold(threshold) {
                warn!("rejected configuration: {:#}", e);
            }
        }
        if update.wink_min_s.is_some() || update.wink_max_s.is_some() {
            let current = self.tracker.config();
            let min_s = update.wink_min_s.unwrap_or(current.wink_min_s);
            let max_s = update.wink_max_s.unwrap_or(current.wink_max_s);
            if let Err(e) = self.tracker.set_wink_duration_range(min_s, max_s) {
                warn!("rejected configuration: {:#}", e);
            }
        }
        info!("active configuration {}", self.tracker.config_sexp());
    }

    /// Drain `provider`, calling `on_frame` for every published frame.
    /// Stops at the first provider error.
    pub fn run<P, F>(&mut self, provider: &mut P, mut on_frame: F) -> Result<()>
    where
        P: InputProvider + ?Sized,
        F: FnMut(&Snapshot),
    {
        while let Some(event) = provider.next_event()? {
            if let Some(snapshot) = self.handle_event(event)? {
                on_frame(&snapshot);
            }
        }
        info!(
            "replay finished after {} frames",
            self.handoff.frame_count()
        );
        Ok(())
    }

    pub fn summary_sexp(&self) -> String {
        self.session.summary_sexp()
    }

    pub fn timing_sexp(&self) -> String {
        self.timing.stats_sexp()
    }
}
