//! Tracking Session
//!
//! One continuous tracking interval from `start` to `stop`. The session is
//! written only by [`SampleCapture`](super::sampler::SampleCapture) and the
//! trial bookkeeping; everything else reads it.

use super::types::{Position, Sample, SpeedWindow, StepDirection};
use crate::trials::Trial;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique session identifier, used to detect stale async results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Last accepted sample position and time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub position: Position,
    pub at_ms: u64,
}

/// A tracking session and its running aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier
    pub id: SessionId,
    /// Start time (ms since epoch)
    pub started_at_ms: u64,
    /// Accepted samples, in capture order
    pub samples: Vec<Sample>,
    /// Number of accepted samples
    pub point_count: usize,
    /// Sum of consecutive accepted-sample distances
    pub total_distance: f64,
    /// Highest quality-filtered speed seen (px/s)
    pub max_speed: f64,
    /// Recent quality-filtered speeds
    pub speed_window: SpeedWindow,
    /// Per-axis direction changes between consecutive steps
    pub direction_change_count: u32,
    /// Position of the first accepted sample
    pub start_position: Option<Position>,
    /// Completed trials, in completion order
    pub trials: Vec<Trial>,
    /// Last accepted sample
    pub cursor: Option<Cursor>,
    /// Direction of the most recent step
    pub last_step: Option<StepDirection>,
}

impl Session {
    /// Create an empty session started at `started_at_ms`
    pub fn new(started_at_ms: u64, speed_window_capacity: usize) -> Self {
        Self {
            id: SessionId::new(),
            started_at_ms,
            samples: Vec::new(),
            point_count: 0,
            total_distance: 0.0,
            max_speed: 0.0,
            speed_window: SpeedWindow::new(speed_window_capacity),
            direction_change_count: 0,
            start_position: None,
            trials: Vec::new(),
            cursor: None,
            last_step: None,
        }
    }

    /// Most recently accepted sample
    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Straight-line distance from the start position to the last sample
    pub fn optimal_distance(&self) -> f64 {
        match (self.start_position, self.last_sample()) {
            (Some(start), Some(last)) => start.distance_to(&last.position()),
            _ => 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
