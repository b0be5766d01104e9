//! Session finalization
//!
//! The only asynchronous step of the pipeline. Scoring and persistence of a
//! [`FinishedSession`] run concurrently and never touch
//! [`PipelineState`](super::state::PipelineState); the resulting
//! [`SessionOutcome`] is handed back through `accept_outcome`.

use super::state::FinishedSession;
use crate::capture::session::SessionId;
use crate::features::vector::FeatureSet;
use crate::transport::export::PersistedExport;
use crate::transport::inference::{Prediction, Scorer};
use crate::transport::storage::BlobStore;
use crate::transport::TransportError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything finalization produced for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: SessionId,
    pub features: Option<FeatureSet>,
    /// `None` when the session had no usable data
    pub prediction: Option<Prediction>,
    pub persisted: Option<PersistedExport>,
    /// Persistence failure; the in-memory result stands regardless
    pub persist_error: Option<String>,
}

/// Scores and persists finished sessions
pub struct Finalizer {
    scorer: Scorer,
    store: Option<Arc<dyn BlobStore>>,
    write_csv: bool,
}

impl Finalizer {
    /// `store` of `None` skips persistence
    pub fn new(scorer: Scorer, store: Option<Arc<dyn BlobStore>>, write_csv: bool) -> Self {
        Self {
            scorer,
            store,
            write_csv,
        }
    }

    pub async fn finalize(&self, finished: &FinishedSession) -> SessionOutcome {
        finalize_session(finished, &self.scorer, self.store.as_deref(), self.write_csv).await
    }
}

/// Score and persist `finished` concurrently
pub async fn finalize_session(
    finished: &FinishedSession,
    scorer: &Scorer,
    store: Option<&dyn BlobStore>,
    write_csv: bool,
) -> SessionOutcome {
    let session_id = finished.id();

    let scoring = async {
        let features = finished.features.as_ref()?;
        let indicators = finished.indicators()?;
        let mut prediction = scorer.score_or_fallback(features, &indicators).await;
        prediction.session_id = Some(session_id);
        Some(prediction)
    };

    let persistence = async {
        match store {
            Some(store) => {
                let export = finished.export();
                Some(export.persist(store, write_csv).await)
            }
            None => None,
        }
    };

    let (prediction, persisted) = tokio::join!(scoring, persistence);

    let (persisted, persist_error) = match persisted {
        Some(Ok(paths)) => {
            info!(%session_id, path = %paths.json, "session exported");
            (Some(paths), None)
        }
        Some(Err(e)) => {
            warn!(%session_id, error = %e, "session export failed");
            (None, Some(e.to_string()))
        }
        None => (None, None),
    };

    if prediction.is_none() {
        info!(%session_id, "no data to score");
    }

    SessionOutcome {
        session_id,
        features: finished.features.clone(),
        prediction,
        persisted,
        persist_error,
    }
}

/// Storage result as a plain `Result`, for callers that want to propagate it
impl SessionOutcome {
    pub fn persistence(&self) -> Result<Option<&PersistedExport>, TransportError> {
        match &self.persist_error {
            Some(e) => Err(TransportError::Storage(e.clone())),
            None => Ok(self.persisted.as_ref()),
        }
    }
}
