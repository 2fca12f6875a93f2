//! Error types for n8n-mcp.
//!
//! All errors are designed to be agent-friendly with structured information
//! that AI agents can parse and act upon.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::client::ErrorKind;

/// Result type alias for n8n-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Longest slice of an upstream body kept for diagnostics.
const MAX_DETAIL_CHARS: usize = 2048;

/// Terminal failure of an upstream request, after any retries.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    /// HTTP status, if a response was received.
    pub status: Option<u16>,
    /// Raw response body or transport message. Internal only.
    #[serde(skip)]
    pub detail: String,
    /// Requests sent, including the first.
    pub attempts: u32,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: Option<u16>, detail: &str, attempts: u32) -> Self {
        Self {
            kind,
            status,
            detail: detail.chars().take(MAX_DETAIL_CHARS).collect(),
            attempts,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.user_message())
    }
}

/// n8n-mcp error types.
///
/// Each error variant includes a code that agents can parse programmatically.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Api(ApiError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotWebhookWorkflow(String),

    #[error("Malformed response from {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error code for agent parsing.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Api(e) => e.kind.code(),
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::NotWebhookWorkflow(_) => "NOT_A_WEBHOOK_WORKFLOW",
            Error::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Upstream failure category, for errors that came from n8n.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Get a sanitized error message safe for external consumers.
    ///
    /// Upstream bodies, URLs and addresses are never included.
    pub fn external_message(&self) -> String {
        match self {
            // Fixed per-kind text; detail stays in logs
            Error::Api(e) => e.kind.user_message().to_string(),

            // Caller-facing errors - safe to expose the message
            Error::InvalidArgument(msg) => msg.clone(),
            Error::NotWebhookWorkflow(msg) => msg.clone(),
            Error::Config(msg) => format!("Configuration error: {}", msg),

            Error::MalformedResponse(_) => "n8n returned a response that is not valid JSON.".to_string(),
            Error::Internal(_) => "An internal error occurred".to_string(),
            Error::Io(_) => "An I/O error occurred".to_string(),
            Error::Json(_) => "Invalid JSON format".to_string(),
            Error::Http(e) => {
                if e.is_timeout() {
                    "HTTP request timed out".to_string()
                } else if e.is_connect() {
                    "Failed to connect to remote server".to_string()
                } else {
                    "HTTP request failed".to_string()
                }
            }
        }
    }

    /// Convert to agent-friendly JSON response with sanitized message.
    pub fn to_external_json(&self) -> serde_json::Value {
        let mut error = serde_json::json!({
            "code": self.code(),
            "message": self.external_message(),
        });
        if let Error::Api(api) = self {
            if let Some(status) = api.status {
                error["status"] = status.into();
            }
            error["attempts"] = api.attempts.into();
        }
        serde_json::json!({
            "success": false,
            "error": error,
        })
    }
}
