//! HTTP retry with exponential backoff.
//!
//! Handles 429 rate limiting, 5xx server errors, and network timeouts
//! with a configurable attempt count and backoff base.

use super::TransportError;
use crate::app::config::TransportConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Attempt budget and backoff base of a retried request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Delay before the attempt following `attempt` (0-based).
    ///
    /// Rate limiting waits one doubling longer than other transient errors.
    pub fn delay(&self, attempt: u32, rate_limited: bool) -> Duration {
        let exponent = if rate_limited { attempt + 1 } else { attempt };
        self.backoff_base.saturating_mul(2u32.saturating_pow(exponent))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TransportConfig::default())
    }
}

/// Send an HTTP request with retry and exponential backoff.
///
/// Returns the first 2xx response, or the error of the last attempt.
///
/// Retry behavior (base `b`):
/// - 429 (rate limited): backoff 2b, 4b, 8b
/// - 5xx (server error): backoff b, 2b, 4b
/// - Timeout/connect error: backoff b, 2b, 4b
/// - Other 4xx and request errors: non-retriable, returned immediately
///
/// No delay follows the final attempt.
pub async fn send_with_retry<F>(
    client: &Client,
    build_request: F,
    policy: &RetryPolicy,
    context: &str,
) -> Result<Response, TransportError>
where
    F: Fn(&Client) -> RequestBuilder,
{
    let mut last_error = TransportError::Network(format!("{}: no attempts made", context));

    for attempt in 0..policy.max_attempts {
        let is_last = attempt + 1 == policy.max_attempts;

        let delay = match build_request(client).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return Ok(resp);
                }

                let rate_limited = status == StatusCode::TOO_MANY_REQUESTS;
                if !rate_limited && !status.is_server_error() {
                    warn!(context, %status, "non-retriable status");
                    return Err(TransportError::Status(status.as_u16()));
                }

                last_error = TransportError::Status(status.as_u16());
                let delay = policy.delay(attempt, rate_limited);
                if !is_last {
                    warn!(context, %status, ?delay, "retriable status, retrying");
                }
                delay
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_error = TransportError::Network(e.to_string());
                let delay = policy.delay(attempt, false);
                if !is_last {
                    warn!(context, error = %e, ?delay, "network error, retrying");
                }
                delay
            }
            Err(e) => {
                warn!(context, error = %e, "request failed");
                return Err(TransportError::Network(e.to_string()));
            }
        };

        if !is_last {
            tokio::time::sleep(delay).await;
        }
    }

    warn!(context, attempts = policy.max_attempts, error = %last_error, "giving up");
    Err(last_error)
}
