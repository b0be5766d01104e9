//! Pipeline
//!
//! Command handling over a single-owner state, plus the asynchronous
//! finalization of stopped sessions.

pub mod commands;
pub mod finalize;
pub mod state;

pub use commands::{Ack, Command, StatusReport};
pub use finalize::{finalize_session, Finalizer, SessionOutcome};
pub use state::{Dispatch, FinishedSession, Pipeline, PipelineState};
