//! Clock Abstraction
//!
//! The pipeline never reads the system time directly. Command handlers and the
//! replay driver receive their timestamps from a [`Clock`], which lets tests
//! and trace replays run against a deterministic timeline.

use std::cell::Cell;

/// Source of millisecond timestamps
pub trait Clock {
    /// Current time in milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}

/// Clock backed by the host's wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Negative values only occur for clocks set before 1970
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually driven clock for replays and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    /// Create a clock frozen at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    /// Jump to an absolute time. Moving backwards is ignored so the
    /// timeline stays monotonic.
    pub fn set(&self, now_ms: u64) {
        if now_ms >= self.now.get() {
            self.now.set(now_ms);
        }
    }

    /// Advance by `delta_ms`
    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Elapsed milliseconds between two timestamps.
/// Returns 0 if `end_ms < start_ms`.
#[inline]
pub fn elapsed_ms(start_ms: u64, end_ms: u64) -> u64 {
    end_ms.saturating_sub(start_ms)
}
