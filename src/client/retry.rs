//! Retry scheduling with capped exponential backoff.
//!
//! ## Policy
//!
//! - `max_retries`: retries beyond the first attempt (default: 3, so up to 4
//!   requests). `0` disables retrying.
//! - `max_delay`: ceiling for every wait (default: 8s).
//!
//! The k-th retry waits `min(2^(k-1)s, max_delay)`: 1s, 2s, 4s, 8s, 8s...
//! A server-suggested delay (`Retry-After` on a 429) replaces the computed
//! value but is capped by the same ceiling.

use std::time::Duration;

use tracing::warn;

use super::classifier::{ErrorVerdict, Failure};
use super::transport::Operation;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(8);

/// Retry bounds for one executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    Abort,
}

/// Per-operation retry bookkeeping. Never shared between operations.
#[derive(Debug, Default)]
pub struct AttemptState {
    /// Retries performed so far.
    pub attempt: u32,
    /// Sum of all waits so far.
    pub elapsed_delay: Duration,
    pub last_error: Option<Failure>,
}

impl AttemptState {
    /// Requests sent so far, given that one more has just failed.
    pub fn requests_sent(&self) -> u32 {
        self.attempt + 1
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Decide whether the failure described by `verdict` is retried.
    pub fn decide(&self, state: &AttemptState, verdict: &ErrorVerdict) -> RetryDecision {
        if !verdict.retryable || state.attempt >= self.max_retries {
            return RetryDecision::Abort;
        }

        let delay = match verdict.suggested_delay {
            Some(suggested) => suggested.min(self.max_delay),
            None => self.backoff(state.attempt + 1),
        };
        RetryDecision::Retry(delay)
    }

    /// Exponential delay for the 1-indexed `retry`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(20);
        Duration::from_secs(1u64 << shift).min(self.max_delay)
    }

    /// Log the decision, wait, and record the failed attempt.
    ///
    /// The sleep suspends only the calling task; if the caller is dropped the
    /// wait is dropped with it.
    pub async fn wait(
        &self,
        state: &mut AttemptState,
        operation: &Operation,
        verdict: &ErrorVerdict,
        failure: Failure,
        delay: Duration,
    ) {
        let retry = state.attempt + 1;
        warn!(
            kind = %verdict.kind,
            attempt = retry,
            max_retries = self.max_retries,
            delay_ms = delay.as_millis() as u64,
            method = %operation.method,
            endpoint = %operation.endpoint,
            status = ?failure.status(),
            "n8n request failed, retrying"
        );
        crate::metrics::record_retry(verdict.kind);

        tokio::time::sleep(delay).await;

        state.attempt = retry;
        state.elapsed_delay += delay;
        state.last_error = Some(failure);
    }
}
