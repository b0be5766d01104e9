//! Wall-clock timing for the capture pipeline
//!
//! All pipeline timestamps are integer milliseconds since the Unix epoch,
//! matching what a browser pointer event reports.

pub mod clock;

pub use clock::{elapsed_ms, Clock, ManualClock, SystemClock};
