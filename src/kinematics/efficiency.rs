//! Path Efficiency Estimation
//!
//! Scores how directly the pointer travelled, on a 0-100 scale.
//!
//! [`segment_efficiency`] is the canonical measure. For every interior sample
//! it compares the direct hop from the previous to the next sample with the
//! two-hop path through the sample, and penalizes the turn between the two
//! headings:
//!
//! ```text
//! distance_eff  = |p[i-1] -> p[i+1]| / (|p[i-1] -> p[i]| + |p[i] -> p[i+1]|) * 100
//! direction_eff = max(40, 100 - 0.67 * turn_degrees)
//! segment       = 0.7 * distance_eff + 0.3 * direction_eff
//! ```
//!
//! A segment whose endpoints coincide (an exact reversal, or no movement)
//! scores 100.
//!
//! [`endpoint_efficiency`] is the older start-to-end ratio, kept as a
//! reference baseline.

use crate::capture::types::Position;

/// Weight of the distance ratio in a segment score
pub const DISTANCE_WEIGHT: f64 = 0.7;
/// Weight of the turn penalty in a segment score
pub const DIRECTION_WEIGHT: f64 = 0.3;
/// Efficiency lost per degree of turn
pub const TURN_PENALTY_PER_DEGREE: f64 = 0.67;
/// Lowest direction efficiency a turn can produce
pub const MIN_DIRECTION_EFFICIENCY: f64 = 40.0;

/// Segment-policy path efficiency over `points`.
///
/// Returns 100 for fewer than three points.
pub fn segment_efficiency(points: &[Position]) -> f64 {
    if points.len() < 3 {
        return 100.0;
    }

    let total: f64 = points
        .windows(3)
        .map(|w| segment_score(&w[0], &w[1], &w[2]))
        .sum();
    let segments = (points.len() - 2) as f64;

    (total / segments).clamp(0.0, 100.0)
}

/// Score of the two-hop segment `prev -> current -> next`
pub fn segment_score(prev: &Position, current: &Position, next: &Position) -> f64 {
    let actual = prev.distance_to(current) + current.distance_to(next);
    if actual <= 0.0 {
        return 100.0;
    }

    let direct = prev.distance_to(next);
    if direct <= 0.0 {
        return 100.0;
    }
    let distance_efficiency = (direct / actual * 100.0).min(100.0);

    let turn = turn_angle_degrees(prev, current, next);
    let direction_efficiency =
        (100.0 - turn * TURN_PENALTY_PER_DEGREE).max(MIN_DIRECTION_EFFICIENCY);

    DISTANCE_WEIGHT * distance_efficiency + DIRECTION_WEIGHT * direction_efficiency
}

/// Absolute heading change at `current`, in degrees within [0, 180]
pub fn turn_angle_degrees(prev: &Position, current: &Position, next: &Position) -> f64 {
    let heading_in = (current.y - prev.y).atan2(current.x - prev.x);
    let heading_out = (next.y - current.y).atan2(next.x - current.x);

    let mut turn = (heading_out - heading_in).abs().to_degrees();
    if turn > 180.0 {
        turn = 360.0 - turn;
    }
    turn
}

/// Endpoint-policy efficiency: straight-line displacement from `start` to
/// `last` over the travelled distance, capped at 100.
///
/// Returns 0 with fewer than two samples and 100 when start and end coincide.
pub fn endpoint_efficiency(start: Position, last: Position, total_distance: f64, sample_count: usize) -> f64 {
    if sample_count < 2 {
        return 0.0;
    }
    let optimal = start.distance_to(&last);
    if optimal == 0.0 {
        return 100.0;
    }
    if total_distance <= 0.0 {
        return 100.0;
    }
    (optimal / total_distance * 100.0).min(100.0)
}
