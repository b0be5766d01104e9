//! Click-Target Drill
//!
//! Two targets alternate; the subject moves to the highlighted one and
//! clicks it. Between clicks the drill tracks the cursor trajectory and, on
//! each completed target, records how far the travelled path deviated from
//! the straight line between the two target centers.

use crate::capture::types::Position;
use crate::features::fallback::RiskIndicators;
use crate::kinematics::motion::{
    acceleration_px_per_s2, max_or_zero, mean, path_deviation_percent, speed_px_per_s, std_dev,
    TimedPoint,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// History length that triggers a trim
pub const HISTORY_LIMIT: usize = 100;
/// Positions kept after a trim
pub const HISTORY_KEEP: usize = 50;

/// A clickable target, centered at `(x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Target {
    pub fn center(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// 100 at the center falling linearly to 0 at the inscribed radius
    pub fn click_accuracy(&self, click: Position) -> f64 {
        let radius = self.width.min(self.height) / 2.0;
        if radius <= 0.0 {
            return 0.0;
        }
        let distance = self.center().distance_to(&click);
        (100.0 - distance / radius * 100.0).max(0.0)
    }
}

/// One input event of a drill trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum DrillEvent {
    Move { x: f64, y: f64, t: u64 },
    Click { x: f64, y: f64, t: u64, target: Target },
}

/// Aggregate metrics of a drill run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrillSummary {
    pub total_clicks: usize,
    /// Mean interval between consecutive clicks (ms)
    pub mean_click_latency_ms: f64,
    pub mean_click_accuracy: f64,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub speed_std_dev: f64,
    /// Mean path deviation over completed targets (%)
    pub mean_path_deviation: f64,
    /// `100 - mean_path_deviation`
    pub path_efficiency: f64,
}

impl DrillSummary {
    pub fn indicators(&self) -> RiskIndicators {
        RiskIndicators {
            speed_std_dev: self.speed_std_dev,
            path_efficiency: self.path_efficiency,
            latency_ms: self.mean_click_latency_ms,
        }
    }
}

/// Running state of a target drill
#[derive(Debug, Default)]
pub struct TargetDrill {
    history: Vec<TimedPoint>,
    velocities: Vec<f64>,
    accelerations: Vec<f64>,
    click_times: Vec<u64>,
    click_accuracies: Vec<f64>,
    path_deviations: Vec<f64>,
    last_target: Option<Position>,
}

impl TargetDrill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: DrillEvent) {
        match event {
            DrillEvent::Move { x, y, t } => self.track(x, y, t),
            DrillEvent::Click { x, y, t, target } => self.click(Position::new(x, y), t, &target),
        }
    }

    /// Record a cursor position
    pub fn track(&mut self, x: f64, y: f64, t_ms: u64) {
        let point = TimedPoint::new(x, y, t_ms);

        if let Some(last) = self.history.last() {
            let dt_ms = t_ms.saturating_sub(last.t_ms);
            let distance = last.position().distance_to(&point.position());
            if let Some(velocity) = speed_px_per_s(distance, dt_ms) {
                if let Some(&previous) = self.velocities.last() {
                    if let Some(acceleration) = acceleration_px_per_s2(previous, velocity, dt_ms) {
                        self.accelerations.push(acceleration);
                    }
                }
                self.velocities.push(velocity);
            }
        }

        self.history.push(point);
        if self.history.len() > HISTORY_LIMIT {
            self.history.drain(..self.history.len() - HISTORY_KEEP);
        }
    }

    /// Register a click on the highlighted target
    pub fn click(&mut self, at: Position, t_ms: u64, target: &Target) {
        self.click_times.push(t_ms);
        self.click_accuracies.push(target.click_accuracy(at));

        let center = target.center();
        if let Some(previous) = self.last_target {
            let path: Vec<Position> = self.history.iter().map(TimedPoint::position).collect();
            let deviation = path_deviation_percent(previous, center, &path);
            debug!(deviation, points = path.len(), "target completed");
            self.path_deviations.push(deviation);
        }

        self.last_target = Some(center);
        self.history.clear();
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn path_deviations(&self) -> &[f64] {
        &self.path_deviations
    }

    /// Summary once there is motion, at least two clicks and one completed
    /// target; `None` before that.
    pub fn summary(&self) -> Option<DrillSummary> {
        if self.velocities.is_empty() || self.click_times.len() < 2 || self.path_deviations.is_empty() {
            return None;
        }

        let intervals: Vec<f64> = self
            .click_times
            .windows(2)
            .map(|w| w[1].saturating_sub(w[0]) as f64)
            .collect();
        let mean_path_deviation = mean(&self.path_deviations);

        Some(DrillSummary {
            total_clicks: self.click_times.len(),
            mean_click_latency_ms: mean(&intervals),
            mean_click_accuracy: mean(&self.click_accuracies),
            max_velocity: max_or_zero(&self.velocities),
            max_acceleration: max_or_zero(&self.accelerations),
            speed_std_dev: std_dev(&self.velocities),
            mean_path_deviation,
            path_efficiency: 100.0 - mean_path_deviation,
        })
    }
}
