//! Rule-based probability estimate
//!
//! Deterministic stand-in for the inference service. Each indicator that
//! crosses its threshold adds a fixed weight on top of a baseline score:
//!
//! ```text
//! score = baseline
//!       + speed_std_weight         if speed_std_dev   > speed_std_threshold
//!       + path_efficiency_weight   if path_efficiency < path_efficiency_threshold
//!       + latency_weight           if latency_ms      > latency_threshold_ms
//! ```
//!
//! The score is clamped to [0, 1].

use super::vector::FeatureSet;
use crate::app::config::FallbackConfig;
use crate::kinematics::analytics::AnalyticsSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable signals the rule-based estimate scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicators {
    /// Spread of pointer speed (px/s)
    pub speed_std_dev: f64,
    /// Path efficiency (0-100)
    pub path_efficiency: f64,
    /// Movement or click latency (ms)
    pub latency_ms: f64,
}

impl Default for RiskIndicators {
    fn default() -> Self {
        Self {
            speed_std_dev: 0.0,
            path_efficiency: 100.0,
            latency_ms: 0.0,
        }
    }
}

impl RiskIndicators {
    /// Latency comes from the feature set's mean movement time; speed spread
    /// and efficiency from the session snapshot when one exists.
    pub fn from_features(features: &FeatureSet, snapshot: Option<&AnalyticsSnapshot>) -> Self {
        let base = Self::default();
        Self {
            speed_std_dev: snapshot.map_or(base.speed_std_dev, |s| s.speed_std_dev),
            path_efficiency: snapshot.map_or(base.path_efficiency, |s| s.path_efficiency),
            latency_ms: features.vector.mean_movement_time,
        }
    }
}

/// Coarse bucket of a probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn of(probability: f64) -> Self {
        if probability < 0.4 {
            RiskBand::Low
        } else if probability < 0.7 {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskBand::Low => write!(f, "low"),
            RiskBand::Moderate => write!(f, "moderate"),
            RiskBand::High => write!(f, "high"),
        }
    }
}

/// Additive threshold score, clamped to [0, 1]
pub fn rule_based_probability(indicators: &RiskIndicators, config: &FallbackConfig) -> f64 {
    let mut score = config.baseline;

    if indicators.speed_std_dev > config.speed_std_threshold {
        score += config.speed_std_weight;
    }
    if indicators.path_efficiency < config.path_efficiency_threshold {
        score += config.path_efficiency_weight;
    }
    if indicators.latency_ms > config.latency_threshold_ms {
        score += config.latency_weight;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::vector::{FeatureMode, FeatureVector};

    #[test]
    fn test_calm_indicators_score_baseline() {
        let p = rule_based_probability(&RiskIndicators::default(), &FallbackConfig::default());
        assert_eq!(p, 0.2);
        assert_eq!(RiskBand::of(p), RiskBand::Low);
    }

    #[test]
    fn test_all_indicators_fire() {
        let indicators = RiskIndicators {
            speed_std_dev: 55.0,
            path_efficiency: 12.0,
            latency_ms: 4_500.0,
        };
        let p = rule_based_probability(&indicators, &FallbackConfig::default());
        assert!((p - 0.9).abs() < 1e-12);
        assert_eq!(RiskBand::of(p), RiskBand::High);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let indicators = RiskIndicators {
            speed_std_dev: 40.0,
            path_efficiency: 30.0,
            latency_ms: 4_000.0,
        };
        assert_eq!(rule_based_probability(&indicators, &FallbackConfig::default()), 0.2);
    }

    #[test]
    fn test_score_is_clamped() {
        let config = FallbackConfig {
            baseline: 0.9,
            ..Default::default()
        };
        let indicators = RiskIndicators {
            speed_std_dev: 100.0,
            path_efficiency: 0.0,
            latency_ms: 0.0,
        };
        assert_eq!(rule_based_probability(&indicators, &config), 1.0);
    }

    #[test]
    fn test_indicators_without_snapshot() {
        let set = FeatureSet {
            mode: FeatureMode::Trials,
            vector: FeatureVector {
                mean_movement_time: 4_200.0,
                ..Default::default()
            },
        };
        let indicators = RiskIndicators::from_features(&set, None);
        assert_eq!(indicators.speed_std_dev, 0.0);
        assert_eq!(indicators.path_efficiency, 100.0);
        assert_eq!(indicators.latency_ms, 4_200.0);

        let p = rule_based_probability(&indicators, &FallbackConfig::default());
        assert!((p - 0.4).abs() < 1e-12);
        assert_eq!(RiskBand::of(p), RiskBand::Moderate);
    }
}
