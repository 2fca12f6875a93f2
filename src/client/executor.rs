//! Request executor: one operation, retried until success or abort.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{error, instrument};

use super::classifier::{classify, Failure};
use super::retry::{AttemptState, RetryDecision, RetryPolicy};
use super::transport::{Operation, RawResponse, Transport};
use crate::error::{ApiError, Error, Result};

/// Runs [`Operation`]s against a [`Transport`] under a [`RetryPolicy`].
///
/// Cheap to clone; clones share the transport but nothing mutable.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute `operation`, returning the decoded 2xx body as-is.
    ///
    /// Retry eligibility depends only on the failure, not on the method, so a
    /// POST that hit a 5xx is sent again.
    #[instrument(
        name = "n8n.request",
        skip(self, operation),
        fields(method = %operation.method, endpoint = %operation.endpoint)
    )]
    pub async fn execute(&self, operation: &Operation) -> Result<Value> {
        let mut state = AttemptState::default();
        let started = Instant::now();
        let method = operation.method.as_str();

        loop {
            let failure = match self.transport.send(operation).await {
                Ok(response) if response.is_success() => {
                    crate::metrics::record_request(method, "success", started.elapsed());
                    return decode_success(operation, response);
                }
                Ok(response) => Failure::Status {
                    status: response.status,
                    retry_after: response.retry_after,
                    body: response.body,
                },
                Err(e) => Failure::Transport(e),
            };

            let verdict = classify(&failure);
            match self.policy.decide(&state, &verdict) {
                RetryDecision::Retry(delay) => {
                    self.policy
                        .wait(&mut state, operation, &verdict, failure, delay)
                        .await;
                }
                RetryDecision::Abort => {
                    let api_error = ApiError::new(
                        verdict.kind,
                        failure.status(),
                        failure.detail(),
                        state.requests_sent(),
                    );
                    error!(
                        kind = %api_error.kind,
                        status = ?api_error.status,
                        attempts = api_error.attempts,
                        retried_for_ms = state.elapsed_delay.as_millis() as u64,
                        detail = %api_error.detail,
                        "n8n request failed"
                    );
                    let outcome = api_error.kind.to_string();
                    crate::metrics::record_request(method, &outcome, started.elapsed());
                    return Err(Error::Api(api_error));
                }
            }
        }
    }
}

fn decode_success(operation: &Operation, response: RawResponse) -> Result<Value> {
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(json!({ "success": true }));
    }
    serde_json::from_str(&response.body).map_err(|e| {
        error!(status = response.status, "n8n returned a non-JSON body: {}", e);
        Error::MalformedResponse(operation.to_string())
    })
}
