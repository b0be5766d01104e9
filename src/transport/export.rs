//! Session export payload
//!
//! JSON document of a finished session plus a flat CSV of its samples
//! (`x,y,time,distance`). Both are named after the session start time:
//! `drift_mouse_data_<stamp>.json` and `.csv`.

use super::storage::BlobStore;
use super::TransportError;
use crate::capture::session::{Session, SessionId};
use crate::capture::types::Sample;
use crate::features::vector::FeatureSet;
use crate::kinematics::analytics::AnalyticsSnapshot;
use crate::time::elapsed_ms;
use crate::trials::Trial;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const FILE_PREFIX: &str = "drift_mouse_data";

/// Header of the sample CSV
pub const CSV_HEADER: &str = "x,y,time,distance";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub point_count: usize,
}

/// Everything persisted about one finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub session_metadata: SessionMetadata,
    pub samples: Vec<Sample>,
    /// Absent when the session had too few samples
    pub analytics: Option<AnalyticsSnapshot>,
    pub trials: Vec<Trial>,
    pub features: Option<FeatureSet>,
}

/// Locations of a persisted export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedExport {
    pub json: String,
    pub csv: Option<String>,
}

fn timestamp(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default()
}

impl SessionExport {
    pub fn new(
        session: &Session,
        ended_at_ms: u64,
        analytics: Option<AnalyticsSnapshot>,
        features: Option<FeatureSet>,
    ) -> Self {
        Self {
            session_metadata: SessionMetadata {
                session_id: session.id,
                started_at: timestamp(session.started_at_ms),
                duration_ms: elapsed_ms(session.started_at_ms, ended_at_ms),
                point_count: session.point_count,
            },
            samples: session.samples.clone(),
            analytics,
            trials: session.trials.clone(),
            features,
        }
    }

    /// `drift_mouse_data_<YYYY-MM-DDTHH-MM-SS>`
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            FILE_PREFIX,
            self.session_metadata.started_at.format("%Y-%m-%dT%H-%M-%S")
        )
    }

    pub fn to_json(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_csv(&self) -> String {
        samples_to_csv(&self.samples)
    }

    /// Write the JSON document and, if requested, the CSV through `store`
    pub async fn persist(&self, store: &dyn BlobStore, write_csv: bool) -> Result<PersistedExport, TransportError> {
        let stem = self.file_stem();

        let json = store
            .put(&format!("{}.json", stem), self.to_json()?.into_bytes())
            .await?;
        let csv = if write_csv {
            Some(store.put(&format!("{}.csv", stem), self.to_csv().into_bytes()).await?)
        } else {
            None
        };

        Ok(PersistedExport { json, csv })
    }
}

/// Flatten samples to `x,y,time,distance` rows
pub fn samples_to_csv(samples: &[Sample]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + samples.len() * 24);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for s in samples {
        let _ = writeln!(out, "{},{},{},{}", s.x, s.y, s.captured_at_ms, s.segment_distance);
    }
    out
}
