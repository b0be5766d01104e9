//! Control commands and their acknowledgments
//!
//! Commands arrive as JSON objects tagged by `command`:
//!
//! ```json
//! {"command": "start"}
//! {"command": "start_trial", "kind": "stop", "coherence": 50}
//! {"command": "set_experiment", "label": "staircase_SSD"}
//! ```

use crate::capture::session::SessionId;
use crate::kinematics::analytics::AnalyticsSnapshot;
use crate::transport::inference::Prediction;
use crate::trials::{Coherence, TrialKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Start,
    Stop,
    GetStatus,
    GetAnalytics,
    StartTrial { kind: TrialKind, coherence: Coherence },
    EndTrial,
    SetExperiment { label: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::GetStatus => "get_status",
            Command::GetAnalytics => "get_analytics",
            Command::StartTrial { .. } => "start_trial",
            Command::EndTrial => "end_trial",
            Command::SetExperiment { .. } => "set_experiment",
        }
    }
}

/// Pipeline status as reported by `get_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub tracking: bool,
    pub session_id: Option<SessionId>,
    pub point_count: usize,
    pub trial_active: bool,
    pub trials_recorded: usize,
    pub experiment_label: String,
    /// Prediction of the most recently finalized session
    pub last_prediction: Option<Prediction>,
}

/// Structured acknowledgment of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ack", rename_all = "snake_case")]
pub enum Ack {
    Started {
        session_id: SessionId,
        /// Session that was still tracking and has been stopped
        superseded: Option<SessionId>,
    },
    Stopped {
        session_id: SessionId,
        point_count: usize,
        trials: usize,
    },
    NotTracking,
    Status {
        status: StatusReport,
    },
    /// `None` until the session has at least two samples
    Analytics {
        analytics: Option<AnalyticsSnapshot>,
    },
    TrialStarted {
        kind: TrialKind,
        coherence: Coherence,
        /// An active trial was recorded to make room
        superseded: bool,
    },
    TrialEnded {
        kind: TrialKind,
        samples: usize,
        moved: bool,
    },
    NoActiveTrial,
    ExperimentSet {
        label: String,
    },
    Rejected {
        command: String,
        reason: String,
    },
}

impl Ack {
    pub fn rejected(command: &Command, reason: impl Into<String>) -> Self {
        Ack::Rejected {
            command: command.name().to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Ack::Rejected { .. })
    }
}
