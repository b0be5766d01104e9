//! Trial data model

use crate::kinematics::motion::TimedPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Go/no-go trial kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialKind {
    /// The subject should move
    Go,
    /// The subject should withhold movement
    Stop,
}

impl fmt::Display for TrialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialKind::Go => write!(f, "go"),
            TrialKind::Stop => write!(f, "stop"),
        }
    }
}

/// Stimulus coherence level (%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Coherence {
    Low,
    Medium,
    High,
}

impl Coherence {
    pub const ALL: [Coherence; 3] = [Coherence::Low, Coherence::Medium, Coherence::High];

    pub fn percent(&self) -> u8 {
        match self {
            Coherence::Low => 10,
            Coherence::Medium => 50,
            Coherence::High => 80,
        }
    }
}

impl TryFrom<u8> for Coherence {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(Coherence::Low),
            50 => Ok(Coherence::Medium),
            80 => Ok(Coherence::High),
            other => Err(format!("coherence must be 10, 50 or 80, got {}", other)),
        }
    }
}

impl From<Coherence> for u8 {
    fn from(value: Coherence) -> Self {
        value.percent()
    }
}

impl fmt::Display for Coherence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// A pointer sample inside a trial, timed relative to the trial start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialSample {
    #[serde(rename = "t")]
    pub relative_time_ms: u64,
    pub x: f64,
    pub y: f64,
}

impl From<&TrialSample> for TimedPoint {
    fn from(s: &TrialSample) -> Self {
        TimedPoint::new(s.x, s.y, s.relative_time_ms)
    }
}

/// A go/no-go trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub kind: TrialKind,
    pub coherence: Coherence,
    pub started_at_ms: u64,
    /// Set when the trial is recorded
    pub ended_at_ms: Option<u64>,
    pub samples: Vec<TrialSample>,
    /// At least one sample arrived during the trial
    pub moved: bool,
    /// Relative time of the first sample (go trials only)
    pub first_move_time_ms: Option<u64>,
    pub experiment_label: String,
}

impl Trial {
    pub fn new(kind: TrialKind, coherence: Coherence, experiment_label: String, started_at_ms: u64) -> Self {
        Self {
            kind,
            coherence,
            started_at_ms,
            ended_at_ms: None,
            samples: Vec::new(),
            moved: false,
            first_move_time_ms: None,
            experiment_label,
        }
    }

    /// Trajectory in the form the kinematics utilities consume
    pub fn timed_points(&self) -> Vec<TimedPoint> {
        self.samples.iter().map(TimedPoint::from).collect()
    }

    pub fn is_go(&self) -> bool {
        self.kind == TrialKind::Go
    }

    pub fn is_stop(&self) -> bool {
        self.kind == TrialKind::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coherence_parses_known_levels() {
        assert_eq!(Coherence::try_from(10), Ok(Coherence::Low));
        assert_eq!(Coherence::try_from(50), Ok(Coherence::Medium));
        assert_eq!(Coherence::try_from(80), Ok(Coherence::High));
        assert!(Coherence::try_from(30).is_err());
    }

    #[test]
    fn test_coherence_serde_as_number() {
        let json = serde_json::to_string(&Coherence::Medium).unwrap();
        assert_eq!(json, "50");
        let parsed: Coherence = serde_json::from_str("80").unwrap();
        assert_eq!(parsed, Coherence::High);
        assert!(serde_json::from_str::<Coherence>("20").is_err());
    }

    #[test]
    fn test_trial_kind_serde_lowercase() {
        assert_eq!(serde_json::to_string(&TrialKind::Stop).unwrap(), "\"stop\"");
        let kind: TrialKind = serde_json::from_str("\"go\"").unwrap();
        assert_eq!(kind, TrialKind::Go);
    }

    #[test]
    fn test_trial_keys_are_camel_case() {
        let mut trial = Trial::new(TrialKind::Go, Coherence::High, "fixed_SSD".into(), 1_000);
        trial.first_move_time_ms = Some(250);
        let json = serde_json::to_value(&trial).unwrap();

        assert_eq!(json["startedAtMs"], 1_000);
        assert_eq!(json["firstMoveTimeMs"], 250);
        assert_eq!(json["experimentLabel"], "fixed_SSD");
        assert_eq!(json["coherence"], 80);
        assert!(json.get("started_at_ms").is_none());
    }
}
