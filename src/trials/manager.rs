//! Trial Manager
//!
//! Brackets go/no-go trials inside a tracking session:
//!
//! ```text
//! idle ──start_trial──▶ active ──end_trial──▶ recorded (back to idle)
//!                         │
//!                         └─start_trial─▶ previous recorded, new active
//! ```
//!
//! Starting a trial while one is active records the active trial first; the
//! two are never merged.

use super::types::{Coherence, Trial, TrialKind, TrialSample};
use crate::capture::types::Sample;
use crate::time::elapsed_ms;
use tracing::{debug, info};

/// Result of a `start_trial` request
#[derive(Debug, Clone, PartialEq)]
pub struct TrialStart {
    /// Trial that was still active and has been recorded to make room
    pub superseded: Option<Trial>,
}

/// Per-session trial state machine
#[derive(Debug, Default)]
pub struct TrialManager {
    active: Option<Trial>,
}

impl TrialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Trial> {
        self.active.as_ref()
    }

    /// Open a new trial. An already active trial is ended at `now_ms` and
    /// handed back in [`TrialStart::superseded`] for recording.
    pub fn start_trial(
        &mut self,
        kind: TrialKind,
        coherence: Coherence,
        experiment_label: &str,
        now_ms: u64,
    ) -> TrialStart {
        let superseded = self.end_trial(now_ms);
        if let Some(previous) = &superseded {
            info!(kind = %previous.kind, "trial still active at start_trial, recording it first");
        }

        debug!(%kind, %coherence, "trial started");
        self.active = Some(Trial::new(kind, coherence, experiment_label.to_string(), now_ms));

        TrialStart { superseded }
    }

    /// Close the active trial. Returns `None` when idle.
    pub fn end_trial(&mut self, now_ms: u64) -> Option<Trial> {
        let mut trial = self.active.take()?;
        trial.ended_at_ms = Some(now_ms.max(trial.started_at_ms));
        debug!(
            kind = %trial.kind,
            samples = trial.samples.len(),
            moved = trial.moved,
            "trial ended"
        );
        Some(trial)
    }

    /// Forward an accepted session sample into the active trial, if any
    pub fn record_sample(&mut self, sample: &Sample) {
        let Some(trial) = self.active.as_mut() else {
            return;
        };

        let relative_time_ms = elapsed_ms(trial.started_at_ms, sample.captured_at_ms);
        trial.samples.push(TrialSample {
            relative_time_ms,
            x: sample.x,
            y: sample.y,
        });

        if !trial.moved {
            trial.moved = true;
            if trial.kind == TrialKind::Go {
                trial.first_move_time_ms = Some(relative_time_ms);
            }
        }
    }

    /// Drop any active trial without recording it
    pub fn reset(&mut self) {
        self.active = None;
    }
}
