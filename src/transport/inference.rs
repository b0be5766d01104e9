//! Inference client
//!
//! Posts a [`FeatureVector`] to the scoring service and reads back a
//! probability. [`Scorer`] wraps any client and substitutes the rule-based
//! estimate whenever the service cannot be used, tagging the result so the
//! two are never confused.

use super::retry::{send_with_retry, RetryPolicy};
use super::TransportError;
use crate::app::config::{FallbackConfig, TransportConfig};
use crate::capture::session::SessionId;
use crate::features::fallback::{rule_based_probability, RiskBand, RiskIndicators};
use crate::features::vector::{FeatureSet, FeatureVector};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Remote `score(features) -> probability` capability
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn score(&self, features: &FeatureVector) -> Result<f64, TransportError>;
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(alias = "probability")]
    adhd_probability: f64,
}

/// Extract the probability from a service response body
pub fn parse_probability(body: &str) -> Result<f64, TransportError> {
    let parsed: ScoreResponse =
        serde_json::from_str(body).map_err(|e| TransportError::MalformedBody(e.to_string()))?;
    let p = parsed.adhd_probability;
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(TransportError::MalformedBody(format!(
            "probability {} outside [0, 1]",
            p
        )));
    }
    Ok(p)
}

/// JSON-over-HTTP inference client
pub struct HttpInferenceClient {
    client: Client,
    endpoint: String,
    policy: RetryPolicy,
}

impl HttpInferenceClient {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            policy: RetryPolicy::from_config(config),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn score(&self, features: &FeatureVector) -> Result<f64, TransportError> {
        let response = send_with_retry(
            &self.client,
            |c| c.post(self.endpoint.as_str()).json(features),
            &self.policy,
            "inference",
        )
        .await?;

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::MalformedBody(e.to_string()))?;
        parse_probability(&body)
    }
}

/// Where a probability came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// The inference service answered
    Model,
    /// Local threshold estimate after a transport failure
    RuleBased,
}

/// A scored session (or standalone feature vector)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_id: Option<SessionId>,
    pub probability: f64,
    pub source: PredictionSource,
    pub band: RiskBand,
    /// Transport failure that forced the rule-based estimate
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fallback_reason: Option<String>,
}

impl Prediction {
    pub fn is_fallback(&self) -> bool {
        self.source == PredictionSource::RuleBased
    }
}

/// Scores feature sets, falling back to the rule-based estimate
#[derive(Clone)]
pub struct Scorer {
    client: Arc<dyn InferenceClient>,
    fallback: FallbackConfig,
}

impl Scorer {
    pub fn new(client: Arc<dyn InferenceClient>, fallback: FallbackConfig) -> Self {
        Self { client, fallback }
    }

    /// Always yields a prediction: the model's when the service answers,
    /// otherwise the rule-based estimate over `indicators`.
    pub async fn score_or_fallback(&self, features: &FeatureSet, indicators: &RiskIndicators) -> Prediction {
        match self.client.score(&features.vector).await {
            Ok(probability) => {
                info!(probability, mode = ?features.mode, "model prediction received");
                Prediction {
                    session_id: None,
                    probability,
                    source: PredictionSource::Model,
                    band: RiskBand::of(probability),
                    fallback_reason: None,
                }
            }
            Err(e) => {
                let probability = rule_based_probability(indicators, &self.fallback);
                warn!(error = %e, probability, "inference unavailable, using rule-based estimate");
                Prediction {
                    session_id: None,
                    probability,
                    source: PredictionSource::RuleBased,
                    band: RiskBand::of(probability),
                    fallback_reason: Some(e.to_string()),
                }
            }
        }
    }
}
