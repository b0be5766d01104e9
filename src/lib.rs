//! # Drift Telemetry
//!
//! Pointer-movement telemetry pipeline: throttled sample capture, session
//! kinematics, go/no-go trial bookkeeping, and reduction to a fixed-schema
//! feature vector that is scored by an external inference service.
//!
//! ## Quick Start
//!
//! ```no_run
//! use drift_telemetry::{Command, Config, ManualClock, Pipeline};
//!
//! let config = Config::default();
//! let mut pipeline = Pipeline::new(&config, ManualClock::new(0));
//!
//! pipeline.handle(Command::Start);
//! for i in 0..10 {
//!     pipeline.clock().advance(20);
//!     pipeline.pointer(i as f64 * 5.0, 0.0);
//! }
//!
//! let finished = pipeline.handle(Command::Stop).finished.expect("was tracking");
//! println!("{:?}", finished.features);
//! ```
//!
//! ## Architecture
//!
//! - [`time`]: Clock abstraction (system and manual)
//! - [`capture`]: Sample capture, sessions, and the speed window
//! - [`kinematics`]: Shared motion formulas, path efficiency, and analytics
//! - [`trials`]: Go/no-go trial state machine
//! - [`features`]: Feature vector, SSRT, and the rule-based estimate
//! - [`drill`]: Click-target drill metrics
//! - [`transport`]: Inference client, blob storage, and session export
//! - [`pipeline`]: Command handling and session finalization
//! - [`app`]: CLI, configuration, and trace replay
//!
//! ## Data Flow
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Pointer   │───▶│   Sample    │───▶│   Session   │───▶│  Analytics  │
//! │   events    │    │   capture   │    │  + trials   │    │  snapshot   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Session   │◀───│  Inference  │◀───│   Feature   │◀───│    Stop     │
//! │   outcome   │    │  + export   │    │     set     │    │   command   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//! ```

pub mod time;
pub mod capture;
pub mod kinematics;
pub mod trials;
pub mod features;
pub mod drill;
pub mod transport;
pub mod pipeline;
pub mod app;

// Re-export commonly used types
pub use app::config::Config;
pub use capture::types::{Position, RawPointerEvent, Sample};
pub use capture::{Session, SessionId};
pub use features::{FeatureMode, FeatureSet, FeatureVector};
pub use kinematics::AnalyticsSnapshot;
pub use pipeline::{Ack, Command, Pipeline, PipelineState, SessionOutcome};
pub use time::{Clock, ManualClock, SystemClock};
pub use transport::{Prediction, PredictionSource, TransportError};

/// Result type alias for the telemetry pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the telemetry pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Trace error at line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Finalization task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
