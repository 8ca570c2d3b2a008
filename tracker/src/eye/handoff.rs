//! Latest-result handoff between the processing thread and readers.
//!
//! One writer publishes each frame's outcome; any number of readers on
//! other threads (renderer, logger, status reporting) grab the most
//! recent snapshot.  Snapshots are `Arc`s, so readers never see a value
//! change underneath them and the writer only holds the lock for a
//! pointer swap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::tracker::FrameOutcome;

/// A published outcome and its 1-based frame number.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub frame_number: u64,
    pub outcome: Arc<FrameOutcome>,
}

#[derive(Debug, Default)]
struct Shared {
    latest: RwLock<Option<Snapshot>>,
    frames: AtomicU64,
}

/// Cloneable handle; all clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct ResultHandoff {
    shared: Arc<Shared>,
}

impl ResultHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest snapshot.  Returns the published snapshot.
    pub fn publish(&self, outcome: FrameOutcome) -> Snapshot {
        let mut slot = self
            .shared
            .latest
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let frame_number = self.shared.frames.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = Snapshot {
            frame_number,
            outcome: Arc::new(outcome),
        };
        *slot = Some(snapshot.clone());
        snapshot
    }

    /// Most recent snapshot, if anything was published yet.
    pub fn latest(&self) -> Option<Snapshot> {
        self.shared
            .latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Frames published so far.
    pub fn frame_count(&self) -> u64 {
        self.shared.frames.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn no_face(t: f64) -> FrameOutcome {
        FrameOutcome::NoDetection { timestamp_s: t }
    }

    #[test]
    fn test_empty_handoff() {
        let h = ResultHandoff::new();
        assert!(h.latest().is_none());
        assert_eq!(h.frame_count(), 0);
    }

    #[test]
    fn test_publish_replaces_latest() {
        let h = ResultHandoff::new();
        let reader = h.clone();
        h.publish(no_face(0.0));
        let snap = h.publish(no_face(0.5));
        assert_eq!(snap.frame_number, 2);

        let latest = reader.latest().unwrap();
        assert_eq!(latest.frame_number, 2);
        assert_eq!(latest.outcome.timestamp_s(), 0.5);
        assert_eq!(reader.frame_count(), 2);
    }

    #[test]
    fn test_old_snapshot_unchanged_after_publish() {
        let h = ResultHandoff::new();
        h.publish(no_face(1.0));
        let held = h.latest().unwrap();
        h.publish(no_face(2.0));
        assert_eq!(held.outcome.timestamp_s(), 1.0);
    }

    #[test]
    fn test_concurrent_readers() {
        let h = ResultHandoff::new();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let r = h.clone();
                thread::spawn(move || {
                    let mut last = 0;
                    for _ in 0..1000 {
                        if let Some(s) = r.latest() {
                            assert!(s.frame_number >= last, "frame numbers went backwards");
                            last = s.frame_number;
                        }
                    }
                })
            })
            .collect();

        for i in 0..500 {
            h.publish(no_face(i as f64));
        }
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(h.frame_count(), 500);
        assert_eq!(h.latest().unwrap().frame_number, 500);
    }
}
