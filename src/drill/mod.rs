//! Target drill metrics

pub mod target_drill;

pub use target_drill::{DrillEvent, DrillSummary, Target, TargetDrill};
