//! Velocity & Acceleration Profiling
//!
//! The one place where speed, velocity, acceleration and path-deviation
//! formulas live. Trial feature extraction and the target drill both build
//! on these functions.

use crate::capture::types::Position;

/// A position with a millisecond timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub x: f64,
    pub y: f64,
    pub t_ms: u64,
}

impl TimedPoint {
    pub fn new(x: f64, y: f64, t_ms: u64) -> Self {
        Self { x, y, t_ms }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Speed in px/s for `distance` covered in `dt_ms`. `None` when `dt_ms` is 0.
#[inline]
pub fn speed_px_per_s(distance: f64, dt_ms: u64) -> Option<f64> {
    if dt_ms == 0 {
        None
    } else {
        Some(distance / (dt_ms as f64 / 1000.0))
    }
}

/// Signed change from `previous` to `current` velocity over `dt_ms`, in
/// px/s². `None` when `dt_ms` is 0.
#[inline]
pub fn acceleration_px_per_s2(previous: f64, current: f64, dt_ms: u64) -> Option<f64> {
    if dt_ms == 0 {
        None
    } else {
        Some((current - previous) / (dt_ms as f64 / 1000.0))
    }
}

/// Total polyline length
pub fn path_length(points: &[Position]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// How much longer the travelled path was than the straight line from
/// `start` to `end`, as a percentage of the straight line.
///
/// 0 for a perfectly straight path, for fewer than two points, or when
/// start and end coincide.
pub fn path_deviation_percent(start: Position, end: Position, path: &[Position]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    let ideal = start.distance_to(&end);
    let actual = path_length(path);
    if actual > 0.0 && ideal > 0.0 {
        (actual - ideal) / ideal * 100.0
    } else {
        0.0
    }
}

/// Velocity and acceleration series of a timed trajectory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionProfile {
    /// Instantaneous velocity per step (px/s, 0 for zero-duration steps)
    pub velocities: Vec<f64>,
    /// Signed change of consecutive velocities over the step duration (px/s²)
    pub accelerations: Vec<f64>,
    /// Sum of step distances
    pub total_distance: f64,
}

impl MotionProfile {
    /// Build the profile of `points`, assumed to be in time order
    pub fn from_points(points: &[TimedPoint]) -> Self {
        let mut profile = MotionProfile {
            velocities: Vec::with_capacity(points.len().saturating_sub(1)),
            accelerations: Vec::with_capacity(points.len().saturating_sub(2)),
            total_distance: 0.0,
        };

        for w in points.windows(2) {
            let dt_ms = w[1].t_ms.saturating_sub(w[0].t_ms);
            let distance = w[0].position().distance_to(&w[1].position());
            let velocity = speed_px_per_s(distance, dt_ms).unwrap_or(0.0);

            if let Some(&previous) = profile.velocities.last() {
                if let Some(acceleration) = acceleration_px_per_s2(previous, velocity, dt_ms) {
                    profile.accelerations.push(acceleration);
                }
            }

            profile.velocities.push(velocity);
            profile.total_distance += distance;
        }

        profile
    }

    /// Peak velocity, 0 when there are no steps
    pub fn max_velocity(&self) -> f64 {
        max_or_zero(&self.velocities)
    }

    /// Peak signed acceleration, 0 when fewer than two steps
    pub fn max_acceleration(&self) -> f64 {
        max_or_zero(&self.accelerations)
    }

    /// Mean velocity, 0 when there are no steps
    pub fn mean_velocity(&self) -> f64 {
        mean(&self.velocities)
    }

    /// Population standard deviation of the velocity series
    pub fn velocity_std_dev(&self) -> f64 {
        std_dev(&self.velocities)
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation, 0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Largest value, 0 for an empty slice
pub fn max_or_zero(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_requires_elapsed_time() {
        assert_eq!(speed_px_per_s(10.0, 0), None);
        assert_eq!(speed_px_per_s(10.0, 100), Some(100.0));
    }

    #[test]
    fn test_profile_of_constant_motion() {
        let points: Vec<TimedPoint> = (0..5)
            .map(|i| TimedPoint::new(i as f64 * 10.0, 0.0, i * 100))
            .collect();
        let profile = MotionProfile::from_points(&points);

        assert_eq!(profile.velocities, vec![100.0; 4]);
        assert_eq!(profile.accelerations, vec![0.0; 3]);
        assert_eq!(profile.total_distance, 40.0);
        assert_eq!(profile.max_velocity(), 100.0);
        assert_eq!(profile.velocity_std_dev(), 0.0);
    }

    #[test]
    fn test_acceleration_uses_current_step_duration() {
        let points = [
            TimedPoint::new(0.0, 0.0, 0),
            TimedPoint::new(10.0, 0.0, 100),  // 100 px/s
            TimedPoint::new(40.0, 0.0, 200),  // 300 px/s
            TimedPoint::new(50.0, 0.0, 300),  // 100 px/s
        ];
        let profile = MotionProfile::from_points(&points);

        assert_eq!(profile.accelerations, vec![2000.0, -2000.0]);
        assert_eq!(profile.max_acceleration(), 2000.0);
        assert_eq!(profile.max_velocity(), 300.0);
    }

    #[test]
    fn test_decelerating_profile_has_negative_peak() {
        let points = [
            TimedPoint::new(0.0, 0.0, 0),
            TimedPoint::new(30.0, 0.0, 100),
            TimedPoint::new(40.0, 0.0, 200),
        ];
        let profile = MotionProfile::from_points(&points);
        assert_eq!(profile.max_acceleration(), -2000.0);
    }

    #[test]
    fn test_degenerate_profiles() {
        assert_eq!(MotionProfile::from_points(&[]), MotionProfile::default());

        let single = MotionProfile::from_points(&[TimedPoint::new(1.0, 1.0, 5)]);
        assert_eq!(single.max_velocity(), 0.0);
        assert_eq!(single.max_acceleration(), 0.0);
        assert_eq!(single.total_distance, 0.0);
    }

    #[test]
    fn test_zero_duration_step_has_zero_velocity() {
        let points = [
            TimedPoint::new(0.0, 0.0, 0),
            TimedPoint::new(10.0, 0.0, 0),
            TimedPoint::new(20.0, 0.0, 100),
        ];
        let profile = MotionProfile::from_points(&points);
        assert_eq!(profile.velocities, vec![0.0, 100.0]);
        assert_eq!(profile.accelerations, vec![1000.0]);
    }

    #[test]
    fn test_path_deviation() {
        let start = Position::new(0.0, 0.0);
        let end = Position::new(100.0, 0.0);
        let straight = [start, Position::new(50.0, 0.0), end];
        assert_eq!(path_deviation_percent(start, end, &straight), 0.0);

        let detour = [start, Position::new(50.0, 50.0), Position::new(100.0, 50.0), end];
        let expected = ((50.0_f64 * 50.0 * 2.0).sqrt() + 50.0 + 50.0 - 100.0) / 100.0 * 100.0;
        assert!((path_deviation_percent(start, end, &detour) - expected).abs() < 1e-9);

        assert_eq!(path_deviation_percent(start, start, &detour), 0.0);
        assert_eq!(path_deviation_percent(start, end, &[start]), 0.0);
    }
}
