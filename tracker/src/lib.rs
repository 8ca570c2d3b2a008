//! Eye-gesture tracking library.
//!
//! Turns per-frame facial landmarks into eye openness ratios, gaze
//! estimates and discrete gestures (winks, double-blinks).  The binary
//! entry point lives in `main.rs`; this crate root exposes the modules
//! for integration testing and embedding.

pub mod clock;
pub mod eye;
pub mod input_source;
pub mod pipeline;
pub mod sexp;
