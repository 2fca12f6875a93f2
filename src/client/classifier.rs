//! Failure classification for retry decisions.
//!
//! Maps an upstream failure (an HTTP status or a transport error) to an
//! [`ErrorKind`] and decides whether the failure is worth another attempt.
//! Classification is pure: the same input always yields the same verdict.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::transport::TransportError;

/// Category of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response was received (connect, DNS, timeout).
    Unavailable,
    /// HTTP 429.
    RateLimited,
    /// HTTP 500, 502, 503 or 504.
    ServerFault,
    /// HTTP 400.
    BadRequest,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// Any other non-success status. Never retried.
    Unknown,
}

impl ErrorKind {
    /// Machine-parseable code for agent consumers.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::ServerFault => "SERVER_FAULT",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unknown => "UPSTREAM_ERROR",
        }
    }

    /// Fixed user-facing message for a terminal failure of this kind.
    ///
    /// These never include upstream bodies, so nothing the server says
    /// (stack traces, file paths, addresses) reaches the agent.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => {
                "Unable to connect to n8n. Please check N8N_URL and that the service is running."
            }
            ErrorKind::RateLimited => "Rate limit exceeded. Please try again later.",
            ErrorKind::ServerFault => "n8n server error. Please check your n8n instance.",
            ErrorKind::BadRequest => "The request was rejected by n8n as invalid.",
            ErrorKind::Unauthorized => "Authentication failed. Please check your API key.",
            ErrorKind::Forbidden => "Access denied. Insufficient permissions.",
            ErrorKind::NotFound => "Resource not found.",
            ErrorKind::Unknown => "An error occurred while communicating with n8n.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ServerFault => "server_fault",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Outcome of classifying one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorVerdict {
    pub kind: ErrorKind,
    pub retryable: bool,
    /// Wait requested by the server (`Retry-After`), if any.
    pub suggested_delay: Option<Duration>,
}

impl ErrorVerdict {
    fn retry(kind: ErrorKind) -> Self {
        Self {
            kind,
            retryable: true,
            suggested_delay: None,
        }
    }

    fn fatal(kind: ErrorKind) -> Self {
        Self {
            kind,
            retryable: false,
            suggested_delay: None,
        }
    }
}

/// A failed attempt, as seen by the classifier.
#[derive(Debug, Clone)]
pub enum Failure {
    /// A response arrived with a non-success status.
    Status {
        status: u16,
        retry_after: Option<String>,
        body: String,
    },
    /// No response arrived.
    Transport(TransportError),
}

impl Failure {
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::Status { status, .. } => Some(*status),
            Failure::Transport(_) => None,
        }
    }

    /// Raw diagnostic text: the response body or the transport message.
    pub fn detail(&self) -> &str {
        match self {
            Failure::Status { body, .. } => body,
            Failure::Transport(e) => &e.message,
        }
    }
}

/// Classify a failed attempt.
pub fn classify(failure: &Failure) -> ErrorVerdict {
    match failure {
        Failure::Transport(_) => ErrorVerdict::retry(ErrorKind::Unavailable),
        Failure::Status {
            status,
            retry_after,
            ..
        } => classify_status(*status, retry_after.as_deref()),
    }
}

/// Classify a non-success HTTP status and its `Retry-After` header value.
pub fn classify_status(status: u16, retry_after: Option<&str>) -> ErrorVerdict {
    match status {
        429 => ErrorVerdict {
            kind: ErrorKind::RateLimited,
            retryable: true,
            suggested_delay: retry_after.and_then(parse_retry_after),
        },
        500 | 502 | 503 | 504 => ErrorVerdict::retry(ErrorKind::ServerFault),
        400 => ErrorVerdict::fatal(ErrorKind::BadRequest),
        401 => ErrorVerdict::fatal(ErrorKind::Unauthorized),
        403 => ErrorVerdict::fatal(ErrorKind::Forbidden),
        404 => ErrorVerdict::fatal(ErrorKind::NotFound),
        _ => ErrorVerdict::fatal(ErrorKind::Unknown),
    }
}

/// Parse a `Retry-After` value given in (possibly fractional) seconds.
///
/// HTTP-date values, negatives and non-finite numbers yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
