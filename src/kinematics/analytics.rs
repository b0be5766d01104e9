//! Session Analytics
//!
//! Derives an [`AnalyticsSnapshot`] from the running aggregates of a
//! [`Session`]. The snapshot is recomputable at any time and has no side
//! effects on the session.

use super::efficiency;
use crate::capture::session::Session;
use crate::capture::types::{Position, StepDirection};
use crate::time::elapsed_ms;
use serde::{Deserialize, Serialize};

/// Point-in-time analytics of a tracking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    /// Time since the session started (ms)
    pub session_duration_ms: u64,
    /// Time between the first and last sample (ms)
    pub time_range_ms: u64,
    pub total_points: usize,
    pub total_distance: f64,
    /// Straight-line distance from the start position to the last sample
    pub optimal_distance: f64,
    /// Segment-policy path efficiency (0-100)
    pub path_efficiency: f64,
    pub max_speed: f64,
    pub average_speed: f64,
    /// Spread of the speed window (px/s)
    pub speed_std_dev: f64,
    pub horizontal_movement: f64,
    pub vertical_movement: f64,
    pub direction_changes: u32,
    pub movement_efficiency: f64,
    pub points_per_second: f64,
    pub data_density: f64,
}

/// Per-axis movement over the full sample history
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisTotals {
    pub horizontal: f64,
    pub vertical: f64,
    pub direction_changes: u32,
}

/// Sum |dx|, |dy| and count per-axis direction changes across `points`
pub fn axis_totals(points: &[Position]) -> AxisTotals {
    let mut totals = AxisTotals::default();
    let mut previous: Option<StepDirection> = None;

    for w in points.windows(2) {
        totals.horizontal += (w[1].x - w[0].x).abs();
        totals.vertical += (w[1].y - w[0].y).abs();

        let step = StepDirection::between(&w[0], &w[1]);
        if let Some(prev) = previous {
            if prev != step {
                totals.direction_changes += 1;
            }
        }
        previous = Some(step);
    }

    totals
}

/// Compute analytics for `session` as of `now_ms`.
///
/// Returns `None` when fewer than two samples have been accepted.
pub fn compute_analytics(session: &Session, now_ms: u64) -> Option<AnalyticsSnapshot> {
    if session.samples.len() < 2 {
        return None;
    }

    let positions: Vec<Position> = session.samples.iter().map(|s| s.position()).collect();
    let axes = axis_totals(&positions);

    let first = session.samples.first()?;
    let last = session.samples.last()?;

    let session_duration_ms = elapsed_ms(session.started_at_ms, now_ms);
    let duration_s = session_duration_ms as f64 / 1000.0;
    let points = session.point_count as f64;

    Some(AnalyticsSnapshot {
        session_duration_ms,
        time_range_ms: elapsed_ms(first.captured_at_ms, last.captured_at_ms),
        total_points: session.point_count,
        total_distance: session.total_distance,
        optimal_distance: session.optimal_distance(),
        path_efficiency: efficiency::segment_efficiency(&positions),
        max_speed: session.max_speed,
        average_speed: session.speed_window.mean(),
        speed_std_dev: session.speed_window.std_dev(),
        horizontal_movement: axes.horizontal,
        vertical_movement: axes.vertical,
        direction_changes: axes.direction_changes,
        movement_efficiency: session.total_distance / nonzero(axes.horizontal + axes.vertical),
        points_per_second: points / nonzero(duration_s),
        data_density: points / nonzero(session.total_distance),
    })
}

/// Zero denominators are treated as 1
#[inline]
fn nonzero(denominator: f64) -> f64 {
    if denominator == 0.0 {
        1.0
    } else {
        denominator
    }
}
