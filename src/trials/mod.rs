//! Go/no-go trial bookkeeping

pub mod types;
pub mod manager;

pub use manager::{TrialManager, TrialStart};
pub use types::{Coherence, Trial, TrialKind, TrialSample};
