//! Stop-Signal Reaction Time (integration method)
//!
//! ```text
//! latencies  = sorted first-movement times of go trials that moved
//! fail_rate  = stop trials that moved / stop trials        (0 if none)
//! nth        = latencies[floor(fail_rate * n)]             (mean if out of range)
//! ssrt       = nth - mean_stop_signal_delay
//! ```

use crate::kinematics::motion::mean;
use crate::trials::Trial;

/// Inputs of the integration estimator, extracted from a trial list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SsrtInputs {
    /// Go-trial movement latencies (ms), unsorted
    pub go_latencies_ms: Vec<f64>,
    /// Stop trials with movement
    pub stop_failures: usize,
    /// All stop trials
    pub stop_total: usize,
}

impl SsrtInputs {
    pub fn from_trials(trials: &[Trial]) -> Self {
        let go_latencies_ms = trials
            .iter()
            .filter(|t| t.is_go())
            .filter_map(|t| t.first_move_time_ms)
            .map(|ms| ms as f64)
            .collect();
        let stop_total = trials.iter().filter(|t| t.is_stop()).count();
        let stop_failures = trials.iter().filter(|t| t.is_stop() && t.moved).count();

        Self {
            go_latencies_ms,
            stop_failures,
            stop_total,
        }
    }

    /// Fraction of stop trials that failed to inhibit, 0 without stop trials
    pub fn failure_rate(&self) -> f64 {
        if self.stop_total == 0 {
            0.0
        } else {
            self.stop_failures as f64 / self.stop_total as f64
        }
    }
}

/// Integration-method SSRT estimate (ms)
pub fn integration_ssrt(inputs: &SsrtInputs, mean_stop_signal_delay_ms: f64) -> f64 {
    let mut sorted = inputs.go_latencies_ms.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let index = (inputs.failure_rate() * sorted.len() as f64).floor() as usize;
    let nth_latency = sorted
        .get(index)
        .copied()
        .unwrap_or_else(|| mean(&inputs.go_latencies_ms));

    nth_latency - mean_stop_signal_delay_ms
}
