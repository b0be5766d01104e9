//! Application Layer
//!
//! User-facing CLI, configuration management, and trace replay.

pub mod cli;
pub mod config;
pub mod replay;

pub use cli::Cli;
pub use config::Config;
pub use replay::{parse_trace, replay, ReplayReport, TraceEvent};
