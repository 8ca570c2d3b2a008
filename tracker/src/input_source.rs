//! Landmark provider boundary.
//!
//! Whatever produces landmarks (a face-mesh detector, a recorded trace,
//! a test script) is an `InputProvider` yielding `InputEvent`s in frame
//! order.  `TraceReader` in `sexp::trace` reads recorded sessions;
//! `ScriptedInputProvider` serves tests.

use std::collections::VecDeque;

use anyhow::Result;

use crate::eye::LandmarkSet;

/// Settings that may change between frames.  `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub ear_threshold: Option<f64>,
    pub wink_min_s: Option<f64>,
    pub wink_max_s: Option<f64>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.ear_threshold.is_none() && self.wink_min_s.is_none() && self.wink_max_s.is_none()
    }
}

/// One record from a landmark provider.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Source frame size in pixels.
    Dimensions { width: u32, height: u32 },
    /// One camera frame.  `landmarks` is `None` when no face was found.
    Frame {
        timestamp_s: f64,
        landmarks: Option<LandmarkSet>,
    },
    Configure(ConfigUpdate),
    /// Clear gesture state, gaze trail and session counters.
    Reset,
}

impl InputEvent {
    pub fn frame(timestamp_s: f64, landmarks: LandmarkSet) -> Self {
        Self::Frame {
            timestamp_s,
            landmarks: Some(landmarks),
        }
    }

    pub fn no_face(timestamp_s: f64) -> Self {
        Self::Frame {
            timestamp_s,
            landmarks: None,
        }
    }
}

/// Source of input events.  `Ok(None)` means the source is exhausted.
pub trait InputProvider {
    fn next_event(&mut self) -> Result<Option<InputEvent>>;
}

/// Delivers a pre-built queue of events.
#[derive(Debug, Default)]
pub struct ScriptedInputProvider {
    events: VecDeque<InputEvent>,
}

impl ScriptedInputProvider {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self {
            events: VecDeque::from(events),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputProvider for ScriptedInputProvider {
    fn next_event(&mut self) -> Result<Option<InputEvent>> {
        Ok(self.events.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_provider_order() {
        let mut provider = ScriptedInputProvider::new(vec![
            InputEvent::Dimensions { width: 640, height: 480 },
            InputEvent::no_face(0.0),
            InputEvent::Reset,
        ]);
        assert_eq!(provider.remaining(), 3);

        assert!(matches!(
            provider.next_event().unwrap(),
            Some(InputEvent::Dimensions { width: 640, height: 480 })
        ));
        assert_eq!(provider.next_event().unwrap(), Some(InputEvent::no_face(0.0)));
        provider.push(InputEvent::Reset);
        assert_eq!(provider.next_event().unwrap(), Some(InputEvent::Reset));
        assert_eq!(provider.next_event().unwrap(), Some(InputEvent::Reset));
        assert!(provider.next_event().unwrap().is_none());
        assert_eq!(provider.remaining(), 0);
    }

    #[test]
    fn test_config_update_is_empty() {
        assert!(ConfigUpdate::default().is_empty());
        let update = ConfigUpdate {
            wink_max_s: Some(0.6),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
