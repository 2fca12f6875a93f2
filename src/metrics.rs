//! Application metrics for n8n-mcp.
//!
//! Recorded through the `metrics` facade; installing a recorder (and any
//! exporter) is left to the embedding process. Without one, every call is a
//! no-op.
//!
//! ## Metrics
//!
//! ### Counters
//! - `n8n_mcp_requests_total` - Terminal request outcomes by method and outcome
//! - `n8n_mcp_retries_total` - Retried attempts by error kind
//! - `n8n_mcp_validation_downgrades_total` - Responses returned unvalidated, by entity
//!
//! ### Histograms
//! - `n8n_mcp_request_duration_seconds` - Wall time of a request including retries

use std::time::Duration;

use metrics::{counter, histogram};

use crate::client::ErrorKind;
use crate::models::EntityKind;

// =============================================================================
// Request Metrics
// =============================================================================

/// Record the terminal outcome of one operation.
///
/// `outcome` is `"success"` or the snake_case [`ErrorKind`] name.
pub fn record_request(method: &str, outcome: &str, duration: Duration) {
    counter!(
        "n8n_mcp_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(
        "n8n_mcp_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a retried attempt.
pub fn record_retry(kind: ErrorKind) {
    counter!("n8n_mcp_retries_total", "kind" => kind.to_string()).increment(1);
}

// =============================================================================
// Validation Metrics
// =============================================================================

/// Record a payload (or list element) returned without validation.
pub fn record_validation_downgrade(entity: EntityKind, count: usize) {
    counter!(
        "n8n_mcp_validation_downgrades_total",
        "entity" => entity.to_string()
    )
    .increment(count as u64);
}
