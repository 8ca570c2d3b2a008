//! Time source for latency measurement.
//!
//! Frame timestamps come from the landmark provider; this clock only
//! measures how long the pipeline takes per frame.  Tests use
//! `TestClock` so latency figures are exact.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Milliseconds elapsed since `start`.
    fn elapsed_ms(&self, start: Instant) -> f64 {
        self.now().saturating_duration_since(start).as_secs_f64() * 1000.0
    }
}

/// Real monotonic time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually driven clock.  With a non-zero step, every `now()` call
/// advances time by that step after reading it.
#[derive(Debug)]
pub struct TestClock {
    instant: Mutex<Instant>,
    step: Duration,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    pub fn new() -> Self {
        Self::with_step(Duration::ZERO)
    }

    pub fn with_step(step: Duration) -> Self {
        Self {
            instant: Mutex::new(Instant::now()),
            step,
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut inst = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *inst += duration;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        let mut inst = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        let current = *inst;
        *inst += self.step;
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock;
        let t0 = clock.now();
        assert!(clock.now() >= t0);
        assert!(clock.elapsed_ms(t0) >= 0.0);
    }

    #[test]
    fn test_manual_advance() {
        let clock = TestClock::new();
        let t0 = clock.now();
        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now() - t0, Duration::from_millis(5));
        assert!((clock.elapsed_ms(t0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_step() {
        let clock = TestClock::with_step(Duration::from_millis(2));
        let t0 = clock.now();
        // The read inside elapsed_ms sees one step.
        assert!((clock.elapsed_ms(t0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_trait_object() {
        let clock: Arc<dyn Clock> = Arc::new(TestClock::new());
        let t0 = clock.now();
        assert_eq!(clock.elapsed_ms(t0), 0.0);
    }
}
