//! Throttled Sample Capture
//!
//! Turns a stream of raw pointer events into accepted [`Sample`]s:
//!
//! 1. **Throttle** - drop events closer than `sample_interval_ms` to the last
//!    accepted sample.
//! 2. **Movement filter** - drop events that moved less than
//!    `min_distance_px` from the last accepted position.
//! 3. **Speed quality filter** - only plausible speeds feed `max_speed` and
//!    the speed window; the sample itself is still recorded.
//!
//! Rejected events leave the session untouched.

use super::session::{Cursor, Session};
use super::types::{RawPointerEvent, Sample, StepDirection};
use crate::app::config::CaptureConfig;
use crate::kinematics::motion;
use tracing::{debug, trace};

/// Why a raw event was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Arrived within the sampling interval of the last accepted sample
    Throttled,
    /// Moved less than the minimum distance
    BelowMinDistance,
}

/// Result of offering one raw event to the capture stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// Sample recorded. `speed_counted` is false when the speed quality
    /// filter kept the step out of the speed statistics.
    Accepted { sample: Sample, speed_counted: bool },
    Rejected(RejectReason),
}

impl CaptureOutcome {
    pub fn accepted_sample(&self) -> Option<&Sample> {
        match self {
            CaptureOutcome::Accepted { sample, .. } => Some(sample),
            CaptureOutcome::Rejected(_) => None,
        }
    }
}

/// Synchronous capture reducer
#[derive(Debug, Clone)]
pub struct SampleCapture {
    config: CaptureConfig,
}

impl SampleCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Offer a raw pointer event to `session`
    pub fn accept(&self, session: &mut Session, raw: RawPointerEvent) -> CaptureOutcome {
        let position = raw.position();

        let (segment_distance, speed_counted) = match session.cursor {
            None => (0.0, false),
            Some(cursor) => {
                if raw.timestamp_ms < cursor.at_ms.saturating_add(self.config.sample_interval_ms) {
                    trace!(t = raw.timestamp_ms, "pointer event throttled");
                    return CaptureOutcome::Rejected(RejectReason::Throttled);
                }

                let distance = cursor.position.distance_to(&position);
                if distance < self.config.min_distance_px {
                    trace!(distance, "pointer event below movement threshold");
                    return CaptureOutcome::Rejected(RejectReason::BelowMinDistance);
                }

                let counted = match motion::speed_px_per_s(distance, raw.timestamp_ms - cursor.at_ms) {
                    Some(speed) if self.is_plausible_speed(speed) => {
                        if speed > session.max_speed {
                            session.max_speed = speed;
                        }
                        session.speed_window.push(speed);
                        true
                    }
                    _ => false,
                };

                let step = StepDirection::between(&cursor.position, &position);
                if let Some(previous) = session.last_step {
                    if previous != step {
                        session.direction_change_count += 1;
                    }
                }
                session.last_step = Some(step);
                session.total_distance += distance;

                (distance, counted)
            }
        };

        if session.start_position.is_none() {
            session.start_position = Some(position);
        }

        let sample = Sample {
            x: raw.x,
            y: raw.y,
            captured_at_ms: raw.timestamp_ms,
            segment_distance,
        };
        session.samples.push(sample);
        session.point_count += 1;
        session.cursor = Some(Cursor {
            position,
            at_ms: raw.timestamp_ms,
        });

        if session.point_count % 100 == 0 {
            debug!(
                points = session.point_count,
                distance_px = session.total_distance.round(),
                "capture progress"
            );
        }

        CaptureOutcome::Accepted {
            sample,
            speed_counted,
        }
    }

    fn is_plausible_speed(&self, speed: f64) -> bool {
        speed.is_finite() && speed >= self.config.min_speed_px_s && speed <= self.config.max_speed_px_s
    }
}

impl Default for SampleCapture {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(0, 50)
    }

    fn ev(x: f64, y: f64, t: u64) -> RawPointerEvent {
        RawPointerEvent::new(x, y, t)
    }

    #[test]
    fn test_first_event_always_accepted() {
        let capture = SampleCapture::default();
        let mut s = session();

        let outcome = capture.accept(&mut s, ev(5.0, 5.0, 0));
        let sample = outcome.accepted_sample().copied().unwrap();
        assert_eq!(sample.segment_distance, 0.0);
        assert_eq!(s.point_count, 1);
        assert_eq!(s.start_position.unwrap().x, 5.0);
    }

    #[test]
    fn test_throttle_rejects_fast_events() {
        let capture = SampleCapture::default();
        let mut s = session();
        capture.accept(&mut s, ev(0.0, 0.0, 0));

        let outcome = capture.accept(&mut s, ev(50.0, 0.0, 10));
        assert_eq!(outcome, CaptureOutcome::Rejected(RejectReason::Throttled));
        assert_eq!(s.point_count, 1);
        assert_eq!(s.total_distance, 0.0);

        // Exactly at the interval boundary passes
        assert!(capture.accept(&mut s, ev(50.0, 0.0, 16)).accepted_sample().is_some());
    }

    #[test]
    fn test_rejection_does_not_move_cursor() {
        let capture = SampleCapture::default();
        let mut s = session();
        capture.accept(&mut s, ev(0.0, 0.0, 0));

        // Too small a move: cursor stays at the origin
        let outcome = capture.accept(&mut s, ev(1.0, 1.0, 100));
        assert_eq!(outcome, CaptureOutcome::Rejected(RejectReason::BelowMinDistance));
        assert_eq!(s.cursor.unwrap().at_ms, 0);

        // Distance is measured from the last accepted sample, not the rejected one
        let sample = capture.accept(&mut s, ev(3.0, 0.0, 200)).accepted_sample().copied().unwrap();
        assert_eq!(sample.segment_distance, 3.0);
    }

    #[test]
    fn test_implausible_speed_recorded_but_not_counted() {
        let capture = SampleCapture::default();
        let mut s = session();
        capture.accept(&mut s, ev(0.0, 0.0, 0));

        // 3 px over 1000 ms = 3 px/s, below the 10 px/s floor
        match capture.accept(&mut s, ev(3.0, 0.0, 1_000)) {
            CaptureOutcome::Accepted { speed_counted, .. } => assert!(!speed_counted),
            other => panic!("expected acceptance, got {:?}", other),
        }
        assert_eq!(s.total_distance, 3.0);
        assert!(s.speed_window.is_empty());
        assert_eq!(s.max_speed, 0.0);

        // 200 px over 20 ms = 10000 px/s, above the ceiling
        capture.accept(&mut s, ev(203.0, 0.0, 1_020));
        assert!(s.speed_window.is_empty());
        assert_eq!(s.point_count, 3);
        assert_eq!(s.total_distance, 203.0);
    }

    #[test]
    fn test_plausible_speed_updates_max() {
        let capture = SampleCapture::default();
        let mut s = session();
        capture.accept(&mut s, ev(0.0, 0.0, 0));
        capture.accept(&mut s, ev(10.0, 0.0, 100)); // 100 px/s
        capture.accept(&mut s, ev(40.0, 0.0, 200)); // 300 px/s

        assert_eq!(s.speed_window.len(), 2);
        assert_eq!(s.max_speed, 300.0);
        assert_eq!(s.speed_window.mean(), 200.0);
    }

    #[test]
    fn test_direction_changes_counted_per_step() {
        let capture = SampleCapture::default();
        let mut s = session();
        capture.accept(&mut s, ev(0.0, 0.0, 0));
        capture.accept(&mut s, ev(10.0, 0.0, 100));
        capture.accept(&mut s, ev(10.0, 10.0, 200));

        assert_eq!(s.direction_change_count, 1);
        assert_eq!(s.total_distance, 20.0);
    }

    #[test]
    fn test_monotonic_movement_has_no_direction_changes() {
        let capture = SampleCapture::default();
        let mut s = session();
        for i in 0..20 {
            capture.accept(&mut s, ev(i as f64 * 5.0, i as f64 * 2.0, i * 20));
        }
        assert_eq!(s.point_count, 20);
        assert_eq!(s.direction_change_count, 0);
    }

    #[test]
    fn test_out_of_order_timestamp_is_throttled() {
        let capture = SampleCapture::default();
        let mut s = session();
        capture.accept(&mut s, ev(0.0, 0.0, 1_000));
        let outcome = capture.accept(&mut s, ev(100.0, 0.0, 500));
        assert_eq!(outcome, CaptureOutcome::Rejected(RejectReason::Throttled));
    }
}
