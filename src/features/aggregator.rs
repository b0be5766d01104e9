//! Feature Aggregator
//!
//! Reduces completed trials, or the whole-session analytics when no trials
//! were recorded, into a [`FeatureVector`]. Every function here is a pure
//! reduction over finished data.

use super::ssrt::{integration_ssrt, SsrtInputs};
use super::vector::{FeatureMode, FeatureSet, FeatureVector, NoGoKinematics};
use crate::app::config::{FeatureConfig, DEFAULT_EXPERIMENT_LABEL};
use crate::kinematics::analytics::AnalyticsSnapshot;
use crate::kinematics::motion::{mean, MotionProfile};
use crate::trials::{Coherence, Trial};
use tracing::debug;

/// Scaling of the session-wide kinematics per coherence tier in fallback mode
pub const FALLBACK_COHERENCE_SCALE: [(Coherence, f64); 3] = [
    (Coherence::Low, 1.0),
    (Coherence::Medium, 0.8),
    (Coherence::High, 0.6),
];

/// Fraction of the session duration reported as `ssrt_integ` in fallback mode
pub const FALLBACK_SSRT_FRACTION: f64 = 0.3;

/// Direction changes absorbed before any count as inhibitions in fallback mode
const FALLBACK_INHIBIT_OFFSET: f64 = 5.0;

/// Cap on the fallback violation count
const FALLBACK_VIOLATION_CAP: f64 = 10.0;

/// Per-trial kinematics summary
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrialKinematics {
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub total_distance: f64,
}

impl TrialKinematics {
    pub fn of(trial: &Trial) -> Self {
        let profile = MotionProfile::from_points(&trial.timed_points());
        Self {
            max_velocity: profile.max_velocity(),
            max_acceleration: profile.max_acceleration(),
            total_distance: profile.total_distance,
        }
    }
}

/// One-hot flag for the experiment label
pub fn experiment_indicator(label: &str) -> u8 {
    u8::from(label == DEFAULT_EXPERIMENT_LABEL)
}

/// Mean kinematics over the stop trials of one coherence level, zeros if none
fn nogo_kinematics(trials: &[Trial], coherence: Coherence) -> NoGoKinematics {
    let subset: Vec<TrialKinematics> = trials
        .iter()
        .filter(|t| t.is_stop() && t.coherence == coherence)
        .map(TrialKinematics::of)
        .collect();

    let column = |f: fn(&TrialKinematics) -> f64| mean(&subset.iter().map(f).collect::<Vec<_>>());

    NoGoKinematics {
        vel_max: column(|k| k.max_velocity),
        acc_max: column(|k| k.max_acceleration),
        total_dist: column(|k| k.total_distance),
    }
}

/// Trial-based feature vector
pub fn compute_features(trials: &[Trial], config: &FeatureConfig) -> FeatureVector {
    let mut vector = FeatureVector::default();

    for coherence in Coherence::ALL {
        vector.set_nogo(coherence, nogo_kinematics(trials, coherence));
    }

    let ssrt_inputs = SsrtInputs::from_trials(trials);
    vector.ssrt_integ = integration_ssrt(&ssrt_inputs, config.mean_stop_signal_delay_ms);

    let stop_total = ssrt_inputs.stop_total;
    let violations = ssrt_inputs.stop_failures;
    vector.inhibitions = (stop_total - violations) as f64;
    vector.violations = violations as f64;

    let go_total = trials.iter().filter(|t| t.is_go()).count();
    let go_moved = trials.iter().filter(|t| t.is_go() && t.moved).count();
    vector.go_acc = if go_total == 0 {
        0.0
    } else {
        go_moved as f64 / go_total as f64
    };
    vector.mean_movement_time = mean(&ssrt_inputs.go_latencies_ms);
    vector.experiment_staircase_ssd = experiment_indicator(&config.experiment_label);

    debug!(
        trials = trials.len(),
        go = go_total,
        stop = stop_total,
        ssrt = vector.ssrt_integ,
        "computed trial features"
    );

    vector
}

/// Degraded feature vector scaled from whole-session analytics
pub fn session_fallback_features(snapshot: &AnalyticsSnapshot, experiment_label: &str) -> FeatureVector {
    let mut vector = FeatureVector::default();

    for (coherence, scale) in FALLBACK_COHERENCE_SCALE {
        vector.set_nogo(
            coherence,
            NoGoKinematics {
                vel_max: snapshot.max_speed * scale,
                acc_max: snapshot.average_speed * scale,
                total_dist: snapshot.total_distance * scale,
            },
        );
    }

    let duration_ms = snapshot.session_duration_ms as f64;
    let direction_changes = f64::from(snapshot.direction_changes);

    vector.ssrt_integ = duration_ms * FALLBACK_SSRT_FRACTION;
    vector.inhibitions = (direction_changes - FALLBACK_INHIBIT_OFFSET).max(0.0);
    vector.violations = direction_changes.min(FALLBACK_VIOLATION_CAP);
    vector.go_acc = snapshot.movement_efficiency.min(1.0);
    vector.mean_movement_time = duration_ms / snapshot.total_points.max(1) as f64;
    vector.experiment_staircase_ssd = experiment_indicator(experiment_label);

    vector
}

/// Pick the richest available derivation.
///
/// Trials win when any were recorded; otherwise the session snapshot is
/// scaled in the labeled fallback mode. `None` when neither exists.
pub fn build_feature_set(
    trials: &[Trial],
    snapshot: Option<&AnalyticsSnapshot>,
    config: &FeatureConfig,
) -> Option<FeatureSet> {
    if !trials.is_empty() {
        return Some(FeatureSet {
            mode: FeatureMode::Trials,
            vector: compute_features(trials, config),
        });
    }

    let snapshot = snapshot?;
    debug!("no trials recorded, using session fallback features");
    Some(FeatureSet {
        mode: FeatureMode::SessionFallback,
        vector: session_fallback_features(snapshot, &config.experiment_label),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trials::{TrialKind, TrialSample};

    fn trial(kind: TrialKind, coherence: Coherence, samples: &[(f64, f64, u64)]) -> Trial {
        let mut trial = Trial::new(kind, coherence, DEFAULT_EXPERIMENT_LABEL.to_string(), 0);
        trial.samples = samples
            .iter()
            .map(|&(x, y, t)| TrialSample { relative_time_ms: t, x, y })
            .collect();
        trial.moved = !trial.samples.is_empty();
        if kind == TrialKind::Go {
            trial.first_move_time_ms = trial.samples.first().map(|s| s.relative_time_ms);
        }
        trial.ended_at_ms = Some(1_000);
        trial
    }

    fn snapshot() -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            session_duration_ms: 10_000,
            time_range_ms: 9_000,
            total_points: 200,
            total_distance: 1_000.0,
            optimal_distance: 400.0,
            path_efficiency: 80.0,
            max_speed: 900.0,
            average_speed: 300.0,
            speed_std_dev: 20.0,
            horizontal_movement: 800.0,
            vertical_movement: 500.0,
            direction_changes: 12,
            movement_efficiency: 0.77,
            points_per_second: 20.0,
            data_density: 0.2,
        }
    }

    #[test]
    fn test_nogo_means_per_coherence() {
        let trials = vec![
            // 100 px/s then 300 px/s: acc 2000
            trial(TrialKind::Stop, Coherence::Low, &[(0.0, 0.0, 0), (10.0, 0.0, 100), (40.0, 0.0, 200)]),
            trial(TrialKind::Stop, Coherence::Low, &[(0.0, 0.0, 0), (20.0, 0.0, 100)]),
            trial(TrialKind::Stop, Coherence::High, &[]),
            trial(TrialKind::Go, Coherence::Medium, &[(0.0, 0.0, 300), (50.0, 0.0, 400)]),
        ];
        let v = compute_features(&trials, &FeatureConfig::default());

        assert_eq!(v.vel_max_nogo10coh, (300.0 + 200.0) / 2.0);
        assert_eq!(v.acc_max_nogo10coh, (2000.0 + 0.0) / 2.0);
        assert_eq!(v.total_dist_nogo10coh, (40.0 + 20.0) / 2.0);

        // Go trials never feed no-go columns
        assert_eq!(v.vel_max_nogo50coh, 0.0);
        assert_eq!(v.total_dist_nogo50coh, 0.0);

        assert_eq!(v.vel_max_nogo80coh, 0.0);
        assert_eq!(v.total_dist_nogo80coh, 0.0);
    }

    #[test]
    fn test_scalar_features() {
        let trials = vec![
            trial(TrialKind::Go, Coherence::Low, &[(0.0, 0.0, 200)]),
            trial(TrialKind::Go, Coherence::Low, &[(0.0, 0.0, 400)]),
            trial(TrialKind::Go, Coherence::Low, &[]),
            trial(TrialKind::Stop, Coherence::Low, &[(0.0, 0.0, 50)]),
            trial(TrialKind::Stop, Coherence::Medium, &[]),
            trial(TrialKind::Stop, Coherence::High, &[]),
        ];
        let v = compute_features(&trials, &FeatureConfig::default());

        assert_eq!(v.inhibitions, 2.0);
        assert_eq!(v.violations, 1.0);
        assert!((v.go_acc - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(v.mean_movement_time, 300.0);
        assert_eq!(v.experiment_staircase_ssd, 1);
        // rate 1/3 over [200, 400] → index 0
        assert_eq!(v.ssrt_integ, 200.0 - 250.0);
    }

    #[test]
    fn test_other_experiment_label_clears_indicator() {
        let config = FeatureConfig {
            experiment_label: "fixed_SSD".to_string(),
            ..Default::default()
        };
        let v = compute_features(&[trial(TrialKind::Go, Coherence::Low, &[])], &config);
        assert_eq!(v.experiment_staircase_ssd, 0);
    }

    #[test]
    fn test_session_fallback_scaling() {
        let v = session_fallback_features(&snapshot(), DEFAULT_EXPERIMENT_LABEL);

        assert_eq!(v.vel_max_nogo10coh, 900.0);
        assert_eq!(v.vel_max_nogo50coh, 900.0 * 0.8);
        assert_eq!(v.vel_max_nogo80coh, 900.0 * 0.6);
        assert_eq!(v.acc_max_nogo10coh, 300.0);
        assert_eq!(v.total_dist_nogo80coh, 1_000.0 * 0.6);
        assert_eq!(v.ssrt_integ, 3_000.0);
        assert_eq!(v.inhibitions, 7.0);
        assert_eq!(v.violations, 10.0);
        assert_eq!(v.go_acc, 0.77);
        assert_eq!(v.mean_movement_time, 50.0);
        assert_eq!(v.experiment_staircase_ssd, 1);
    }

    #[test]
    fn test_session_fallback_few_direction_changes() {
        let mut s = snapshot();
        s.direction_changes = 3;
        s.movement_efficiency = 1.4;
        let v = session_fallback_features(&s, DEFAULT_EXPERIMENT_LABEL);
        assert_eq!(v.inhibitions, 0.0);
        assert_eq!(v.violations, 3.0);
        assert_eq!(v.go_acc, 1.0);
    }

    #[test]
    fn test_build_feature_set_modes() {
        let config = FeatureConfig::default();
        let snap = snapshot();

        let trials = vec![trial(TrialKind::Go, Coherence::Low, &[(0.0, 0.0, 300)])];
        let set = build_feature_set(&trials, Some(&snap), &config).unwrap();
        assert_eq!(set.mode, FeatureMode::Trials);

        let set = build_feature_set(&[], Some(&snap), &config).unwrap();
        assert_eq!(set.mode, FeatureMode::SessionFallback);

        assert!(build_feature_set(&[], None, &config).is_none());
    }
}
