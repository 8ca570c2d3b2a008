//! S-expression wire format: plist access, event output and trace input.

pub mod plist;
pub mod trace;

pub use plist::format_event;
pub use trace::{dimensions_record, frame_record, parse_record, TraceReader};
