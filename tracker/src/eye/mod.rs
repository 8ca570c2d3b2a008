//! Eye-state analysis: landmarks in, eye metrics and gestures out.

pub mod config;
pub mod frame_timing;
pub mod gaze_history;
pub mod gesture;
pub mod handoff;
pub mod landmarks;
pub mod metrics;
pub mod session;
pub mod tracker;

pub use config::TrackerConfig;
pub use frame_timing::{FrameTiming, FrameTimingStats};
pub use gaze_history::GazeHistoryBuffer;
pub use gesture::{Eye, Gesture, GestureConfig, GestureState, GestureStateMachine};
pub use handoff::{ResultHandoff, Snapshot};
pub use landmarks::{face_mesh, EarIndices, EyeIndices, LandmarkSet, Point2};
pub use metrics::{
    combined_gaze, eye_aspect_ratio, gaze_point, EyeMetrics, FrameDimensions, GazePoint,
    MetricsExtractor,
};
pub use session::SessionStats;
pub use tracker::{EyeFrameResult, EyeTracker, FrameOutcome};
