//! Trace Replay
//!
//! Drives a [`Pipeline`] from a JSON-lines trace against a manual clock.
//! Each line is either a pointer event or a command, both stamped with `t`:
//!
//! ```text
//! {"command": "start", "t": 0}
//! {"x": 10.5, "y": 20.0, "t": 16}
//! {"command": "start_trial", "kind": "go", "coherence": 50, "t": 400}
//! {"command": "stop", "t": 5000}
//! ```
//!
//! Finished sessions are finalized on spawned tasks while the replay keeps
//! feeding events, so an outcome can arrive after a newer session started.
//! Outcomes are applied in stop order once the trace is exhausted.

use crate::pipeline::{Ack, Command, Finalizer, Pipeline, SessionOutcome};
use crate::time::{Clock, ManualClock};
use crate::{Config, Error, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One line of a replay trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceEvent {
    Pointer {
        x: f64,
        y: f64,
        t: u64,
    },
    Command {
        t: u64,
        #[serde(flatten)]
        command: Command,
    },
}

impl TraceEvent {
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            TraceEvent::Pointer { t, .. } | TraceEvent::Command { t, .. } => *t,
        }
    }
}

/// Parse a JSON-lines trace. Blank lines and `#` comments are skipped.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|e| Error::Trace {
            line: index + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Finalization result and whether the pipeline applied it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayedSession {
    pub outcome: SessionOutcome,
    pub applied: bool,
}

/// Summary of a replay run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayReport {
    pub pointer_events: usize,
    pub accepted_samples: usize,
    pub ignored_while_idle: usize,
    pub acks: Vec<Ack>,
    pub sessions: Vec<ReplayedSession>,
}

impl ReplayReport {
    /// Outcome the pipeline ended up holding
    pub fn applied(&self) -> Option<&SessionOutcome> {
        self.sessions.iter().rev().find(|s| s.applied).map(|s| &s.outcome)
    }
}

/// Replay `events` through a fresh pipeline. A session still tracking at
/// the end of the trace is stopped at the last timestamp.
pub async fn replay(events: &[TraceEvent], config: &Config, finalizer: Arc<Finalizer>) -> Result<ReplayReport> {
    let start = events.first().map_or(0, TraceEvent::timestamp_ms);
    let mut pipeline = Pipeline::new(config, ManualClock::new(start));
    let mut report = ReplayReport::default();
    let mut pending: Vec<JoinHandle<SessionOutcome>> = Vec::new();

    for event in events {
        let t = event.timestamp_ms();
        if t < pipeline.clock().now_ms() {
            warn!(t, "trace timestamp moves backwards, clock held");
        }
        pipeline.clock().set(t);

        match event {
            TraceEvent::Pointer { x, y, .. } => {
                report.pointer_events += 1;
                match pipeline.pointer(*x, *y) {
                    Some(outcome) if outcome.accepted_sample().is_some() => report.accepted_samples += 1,
                    Some(_) => {}
                    None => report.ignored_while_idle += 1,
                }
            }
            TraceEvent::Command { command, .. } => {
                let dispatch = pipeline.handle(command.clone());
                debug!(command = command.name(), ack = ?dispatch.ack, "replayed command");
                report.acks.push(dispatch.ack);
                if let Some(finished) = dispatch.finished {
                    pending.push(spawn_finalize(&finalizer, finished));
                }
            }
        }
    }

    if pipeline.state().is_tracking() {
        info!("trace ended while tracking, stopping session");
        let dispatch = pipeline.handle(Command::Stop);
        report.acks.push(dispatch.ack);
        if let Some(finished) = dispatch.finished {
            pending.push(spawn_finalize(&finalizer, finished));
        }
    }

    for handle in pending {
        let outcome = handle.await?;
        let applied = pipeline.accept_outcome(outcome.clone());
        report.sessions.push(ReplayedSession { outcome, applied });
    }

    info!(
        pointer_events = report.pointer_events,
        accepted = report.accepted_samples,
        sessions = report.sessions.len(),
        "replay complete"
    );

    Ok(report)
}

fn spawn_finalize(
    finalizer: &Arc<Finalizer>,
    finished: crate::pipeline::FinishedSession,
) -> JoinHandle<SessionOutcome> {
    let finalizer = Arc::clone(finalizer);
    tokio::spawn(async move { finalizer.finalize(&finished).await })
}
