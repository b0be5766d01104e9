//! Kinematic analysis
//!
//! Shared motion formulas, path-efficiency scoring and session analytics:
//! - [`motion`]: velocity/acceleration profiles and path deviation
//! - [`efficiency`]: segment-based path efficiency (0-100)
//! - [`analytics`]: whole-session snapshot derived from capture aggregates

pub mod motion;
pub mod efficiency;
pub mod analytics;

pub use analytics::{compute_analytics, AnalyticsSnapshot};
pub use efficiency::segment_efficiency;
pub use motion::{MotionProfile, TimedPoint};
