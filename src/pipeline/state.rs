//! Pipeline State
//!
//! Single owner of all mutable pipeline state. Commands and pointer events
//! are applied synchronously, one at a time:
//!
//! ```text
//!            start                     stop
//!   idle ───────────▶ tracking ───────────────▶ idle + FinishedSession
//!                       │  ▲
//!        start_trial    │  │  end_trial
//!                       ▼  │
//!                  tracking + trial
//! ```
//!
//! A `start` while tracking stops the running session first and hands it
//! back for finalization. Results of asynchronous finalization come back
//! through [`PipelineState::accept_outcome`], which drops anything that no
//! longer belongs to the most recent session.

use super::commands::{Ack, Command, StatusReport};
use super::finalize::SessionOutcome;
use crate::app::config::{Config, FeatureConfig};
use crate::capture::sampler::{CaptureOutcome, SampleCapture};
use crate::capture::session::{Session, SessionId};
use crate::capture::types::RawPointerEvent;
use crate::features::aggregator::build_feature_set;
use crate::features::fallback::RiskIndicators;
use crate::features::vector::FeatureSet;
use crate::kinematics::analytics::{compute_analytics, AnalyticsSnapshot};
use crate::time::Clock;
use crate::transport::export::SessionExport;
use crate::transport::inference::Prediction;
use crate::trials::TrialManager;
use tracing::{debug, info, warn};

/// A stopped session with everything derived from it
#[derive(Debug, Clone)]
pub struct FinishedSession {
    pub session: Session,
    pub ended_at_ms: u64,
    pub analytics: Option<AnalyticsSnapshot>,
    /// `None` when neither trials nor analytics were available
    pub features: Option<FeatureSet>,
}

impl FinishedSession {
    pub fn id(&self) -> SessionId {
        self.session.id
    }

    pub fn export(&self) -> SessionExport {
        SessionExport::new(
            &self.session,
            self.ended_at_ms,
            self.analytics.clone(),
            self.features.clone(),
        )
    }

    pub fn indicators(&self) -> Option<RiskIndicators> {
        self.features
            .as_ref()
            .map(|f| RiskIndicators::from_features(f, self.analytics.as_ref()))
    }
}

/// Acknowledgment plus any session the command finished
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub ack: Ack,
    pub finished: Option<FinishedSession>,
}

impl Dispatch {
    fn ack(ack: Ack) -> Self {
        Self { ack, finished: None }
    }
}

pub struct PipelineState {
    capture: SampleCapture,
    features: FeatureConfig,
    speed_window: usize,
    session: Option<Session>,
    trials: TrialManager,
    last_stopped: Option<SessionId>,
    last_outcome: Option<SessionOutcome>,
}

impl PipelineState {
    pub fn new(config: &Config) -> Self {
        Self {
            capture: SampleCapture::new(config.capture.clone()),
            features: config.features.clone(),
            speed_window: config.capture.speed_window,
            session: None,
            trials: TrialManager::new(),
            last_stopped: None,
            last_outcome: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn experiment_label(&self) -> &str {
        &self.features.experiment_label
    }

    pub fn last_outcome(&self) -> Option<&SessionOutcome> {
        self.last_outcome.as_ref()
    }

    /// Offer a pointer event. `None` while idle.
    pub fn on_pointer(&mut self, raw: RawPointerEvent) -> Option<CaptureOutcome> {
        let session = self.session.as_mut()?;
        let outcome = self.capture.accept(session, raw);
        if let Some(sample) = outcome.accepted_sample() {
            self.trials.record_sample(sample);
        }
        Some(outcome)
    }

    /// Apply `command` at `now_ms`
    pub fn handle_at(&mut self, command: Command, now_ms: u64) -> Dispatch {
        debug!(command = command.name(), now_ms, "handling command");

        match command {
            Command::Start => self.start(now_ms),
            Command::Stop => match self.stop(now_ms) {
                Some(finished) => Dispatch {
                    ack: Ack::Stopped {
                        session_id: finished.id(),
                        point_count: finished.session.point_count,
                        trials: finished.session.trials.len(),
                    },
                    finished: Some(finished),
                },
                None => Dispatch::ack(Ack::NotTracking),
            },
            Command::GetStatus => Dispatch::ack(Ack::Status {
                status: self.status(),
            }),
            Command::GetAnalytics => Dispatch::ack(Ack::Analytics {
                analytics: self.session.as_ref().and_then(|s| compute_analytics(s, now_ms)),
            }),
            Command::StartTrial { kind, coherence } => {
                let Some(session) = self.session.as_mut() else {
                    return Dispatch::ack(Ack::rejected(&command, "not tracking"));
                };
                let start = self
                    .trials
                    .start_trial(kind, coherence, &self.features.experiment_label, now_ms);
                let superseded = start.superseded.is_some();
                session.trials.extend(start.superseded);
                Dispatch::ack(Ack::TrialStarted {
                    kind,
                    coherence,
                    superseded,
                })
            }
            Command::EndTrial => {
                let Some(session) = self.session.as_mut() else {
                    return Dispatch::ack(Ack::NoActiveTrial);
                };
                match self.trials.end_trial(now_ms) {
                    Some(trial) => {
                        let ack = Ack::TrialEnded {
                            kind: trial.kind,
                            samples: trial.samples.len(),
                            moved: trial.moved,
                        };
                        session.trials.push(trial);
                        Dispatch::ack(ack)
                    }
                    None => Dispatch::ack(Ack::NoActiveTrial),
                }
            }
            Command::SetExperiment { ref label } => {
                if label.trim().is_empty() {
                    return Dispatch::ack(Ack::rejected(&command, "experiment label must not be empty"));
                }
                info!(label = %label, "experiment label set");
                self.features.experiment_label = label.clone();
                Dispatch::ack(Ack::ExperimentSet { label: label.clone() })
            }
        }
    }

    fn start(&mut self, now_ms: u64) -> Dispatch {
        let finished = self.stop(now_ms);
        if let Some(previous) = &finished {
            warn!(session_id = %previous.id(), "start while tracking, previous session stopped");
        }

        let session = Session::new(now_ms, self.speed_window);
        let session_id = session.id;
        info!(%session_id, "session started");
        self.session = Some(session);

        Dispatch {
            ack: Ack::Started {
                session_id,
                superseded: finished.as_ref().map(FinishedSession::id),
            },
            finished,
        }
    }

    /// Stop tracking, record any active trial, and derive analytics and
    /// features. `None` while idle.
    pub fn stop(&mut self, now_ms: u64) -> Option<FinishedSession> {
        let mut session = self.session.take()?;
        if let Some(trial) = self.trials.end_trial(now_ms) {
            session.trials.push(trial);
        }

        let analytics = compute_analytics(&session, now_ms);
        let features = build_feature_set(&session.trials, analytics.as_ref(), &self.features);
        self.last_stopped = Some(session.id);

        info!(
            session_id = %session.id,
            points = session.point_count,
            trials = session.trials.len(),
            features = ?features.as_ref().map(|f| f.mode),
            "session stopped"
        );

        Some(FinishedSession {
            session,
            ended_at_ms: now_ms,
            analytics,
            features,
        })
    }

    /// Whether an outcome for `session_id` would still be applied
    pub fn is_current(&self, session_id: SessionId) -> bool {
        self.session.is_none() && self.last_stopped == Some(session_id)
    }

    /// Apply a finalization outcome unless a newer session superseded it.
    /// Returns whether it was applied.
    pub fn accept_outcome(&mut self, outcome: SessionOutcome) -> bool {
        if !self.is_current(outcome.session_id) {
            debug!(session_id = %outcome.session_id, "dropping stale session outcome");
            return false;
        }
        self.last_outcome = Some(outcome);
        true
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            tracking: self.is_tracking(),
            session_id: self.session.as_ref().map(|s| s.id),
            point_count: self.session.as_ref().map_or(0, |s| s.point_count),
            trial_active: self.trials.is_active(),
            trials_recorded: self.session.as_ref().map_or(0, |s| s.trials.len()),
            experiment_label: self.features.experiment_label.clone(),
            last_prediction: self
                .last_outcome
                .as_ref()
                .and_then(|o| o.prediction.clone()),
        }
    }
}

/// [`PipelineState`] driven by a [`Clock`]
pub struct Pipeline<C: Clock> {
    clock: C,
    state: PipelineState,
}

impl<C: Clock> Pipeline<C> {
    pub fn new(config: &Config, clock: C) -> Self {
        Self {
            clock,
            state: PipelineState::new(config),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PipelineState {
        &mut self.state
    }

    pub fn handle(&mut self, command: Command) -> Dispatch {
        let now = self.clock.now_ms();
        self.state.handle_at(command, now)
    }

    /// Offer a pointer position stamped with the clock's current time
    pub fn pointer(&mut self, x: f64, y: f64) -> Option<CaptureOutcome> {
        let now = self.clock.now_ms();
        self.state.on_pointer(RawPointerEvent::new(x, y, now))
    }

    pub fn accept_outcome(&mut self, outcome: SessionOutcome) -> bool {
        self.state.accept_outcome(outcome)
    }
}
