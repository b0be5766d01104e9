//! Core types for pointer capture
//!
//! Defines the fundamental data structures used throughout the capture pipeline.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Largest number of speed observations kept for the running average
pub const SPEED_WINDOW_CAPACITY: usize = 50;

/// A raw pointer-move event as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPointerEvent {
    /// Client-space x coordinate (pixels)
    pub x: f64,
    /// Client-space y coordinate (pixels)
    pub y: f64,
    /// Wall-clock timestamp (ms since epoch)
    #[serde(rename = "t")]
    pub timestamp_ms: u64,
}

impl RawPointerEvent {
    pub fn new(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A point in client space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    #[inline]
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An accepted, immutable pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    /// Capture timestamp (ms since epoch)
    #[serde(rename = "time")]
    pub captured_at_ms: u64,
    /// Distance from the previously accepted sample (0 for the first)
    #[serde(rename = "distance")]
    pub segment_distance: f64,
}

impl Sample {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Bounded FIFO of recent speed observations (px/s)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedWindow {
    capacity: usize,
    speeds: VecDeque<f64>,
}

impl SpeedWindow {
    /// Window holding `capacity` speeds, clamped to [1, SPEED_WINDOW_CAPACITY]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, SPEED_WINDOW_CAPACITY);
        Self {
            capacity,
            speeds: VecDeque::with_capacity(capacity),
        }
    }

    /// Push a speed, evicting the oldest entry when full.
    /// Returns the evicted value, if any.
    pub fn push(&mut self, speed: f64) -> Option<f64> {
        self.speeds.push_back(speed);
        if self.speeds.len() > self.capacity {
            self.speeds.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.speeds.iter()
    }

    /// Mean of the window, 0 when empty
    pub fn mean(&self) -> f64 {
        if self.speeds.is_empty() {
            0.0
        } else {
            self.speeds.iter().sum::<f64>() / self.speeds.len() as f64
        }
    }

    /// Population standard deviation of the window, 0 when empty
    pub fn std_dev(&self) -> f64 {
        if self.speeds.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .speeds
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f64>()
            / self.speeds.len() as f64;
        variance.sqrt()
    }
}

impl Default for SpeedWindow {
    fn default() -> Self {
        Self::new(SPEED_WINDOW_CAPACITY)
    }
}

/// Sign bucket of a per-axis step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisDirection {
    Negative,
    None,
    Positive,
}

impl AxisDirection {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            AxisDirection::Positive
        } else if delta < 0.0 {
            AxisDirection::Negative
        } else {
            AxisDirection::None
        }
    }
}

/// Per-axis classification of a step between two samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepDirection {
    pub x: AxisDirection,
    pub y: AxisDirection,
}

impl StepDirection {
    pub fn between(from: &Position, to: &Position) -> Self {
        Self {
            x: AxisDirection::of(to.x - from.x),
            y: AxisDirection::of(to.y - from.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_speed_window_evicts_oldest() {
        let mut window = SpeedWindow::new(SPEED_WINDOW_CAPACITY);
        for i in 0..50 {
            assert_eq!(window.push(i as f64), None);
        }
        assert_eq!(window.len(), 50);

        // The 51st insertion evicts the very first entry
        assert_eq!(window.push(50.0), Some(0.0));
        assert_eq!(window.len(), 50);
        assert_eq!(window.iter().next().copied(), Some(1.0));
    }

    #[test]
    fn test_speed_window_capacity_is_capped() {
        let mut window = SpeedWindow::new(200);
        assert_eq!(window.capacity(), SPEED_WINDOW_CAPACITY);
        for i in 0..120 {
            window.push(i as f64);
        }
        assert_eq!(window.len(), SPEED_WINDOW_CAPACITY);
        assert_eq!(SpeedWindow::new(0).capacity(), 1);
    }

    #[test]
    fn test_speed_window_statistics() {
        let mut window = SpeedWindow::new(4);
        assert_eq!(window.mean(), 0.0);
        assert_eq!(window.std_dev(), 0.0);

        for s in [2.0, 4.0, 4.0, 6.0] {
            window.push(s);
        }
        assert_eq!(window.mean(), 4.0);
        assert!((window.std_dev() - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_step_direction_buckets() {
        let origin = Position::new(10.0, 10.0);
        let step = StepDirection::between(&origin, &Position::new(12.0, 10.0));
        assert_eq!(step.x, AxisDirection::Positive);
        assert_eq!(step.y, AxisDirection::None);

        let step = StepDirection::between(&origin, &Position::new(8.0, 5.0));
        assert_eq!(step.x, AxisDirection::Negative);
        assert_eq!(step.y, AxisDirection::Negative);
    }

    #[test]
    fn test_sample_serializes_with_export_names() {
        let sample = Sample {
            x: 1.0,
            y: 2.0,
            captured_at_ms: 42,
            segment_distance: 0.0,
        };
        let json = serde_json::to_value(sample).unwrap();
        assert_eq!(json["time"], 42);
        assert_eq!(json["distance"], 0.0);
    }
}
