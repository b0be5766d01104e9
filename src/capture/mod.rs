//! Pointer capture module
//!
//! Filters raw pointer events into throttled, timestamped samples and keeps
//! the running aggregates of the current tracking session.

pub mod types;
pub mod session;
pub mod sampler;

pub use types::*;
pub use session::{Session, SessionId};
pub use sampler::{CaptureOutcome, RejectReason, SampleCapture};
