//! n8n operations exposed as MCP tools.
//!
//! Each operation validates its identifiers, builds one [`Operation`], runs
//! it through the [`RequestExecutor`] and, where the response is a known
//! entity, passes it through the lenient validator.

mod credentials;
mod executions;
mod webhooks;
mod workflows;

use std::sync::{Arc, OnceLock};

use regex_lite::Regex;
use serde_json::Value;

use crate::client::{Operation, RequestExecutor, ReqwestTransport};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{validate, Entity};

pub use executions::ExecutionFilter;
pub use workflows::WorkflowDraft;

/// Longest identifier accepted in a request path.
pub const MAX_ID_LEN: usize = 100;

/// Client for one n8n instance.
#[derive(Clone)]
pub struct N8nApi {
    executor: RequestExecutor,
    base_url: String,
}

impl N8nApi {
    pub fn new(executor: RequestExecutor, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build a client backed by `reqwest` from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config.n8n)?);
        let executor = RequestExecutor::new(transport, config.retry_policy());
        Ok(Self::new(executor, config.n8n.base_url()))
    }

    /// Instance URL, used to build webhook URLs.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `operation` and return the body untouched.
    async fn send(&self, operation: Operation) -> Result<Value> {
        self.executor.execute(&operation).await
    }

    /// Run `operation` and validate the body as `E`.
    async fn fetch<E: Entity>(&self, operation: Operation, name: &str) -> Result<Value> {
        let raw = self.executor.execute(&operation).await?;
        Ok(validate::<E>(raw, name).into_value())
    }
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"))
}

/// Check that `value` is safe to place in a request path.
///
/// Returns the trimmed identifier. `label` names it in error messages.
pub fn validate_id(value: &str, label: &str) -> Result<String> {
    let id = value.trim();
    if id.is_empty() {
        return Err(Error::InvalidArgument(format!("{} is required", label)));
    }
    if id.contains("..") || id.contains('/') || id.contains('\\') {
        return Err(Error::InvalidArgument(format!(
            "{} contains invalid path characters",
            label
        )));
    }
    if !id_pattern().is_match(id) {
        return Err(Error::InvalidArgument(format!(
            "{} contains invalid characters. Only alphanumeric, hyphens, and underscores are allowed.",
            label
        )));
    }
    if id.len() > MAX_ID_LEN {
        return Err(Error::InvalidArgument(format!(
            "{} is too long (max {} characters)",
            label, MAX_ID_LEN
        )));
    }
    Ok(id.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        for id in ["workflow-123", "test_workflow_1", "ABC-123-XYZ", "42"] {
            assert_eq!(validate_id(id, "Workflow ID").unwrap(), id);
        }
        assert_eq!(validate_id(&"a".repeat(100), "ID").unwrap().len(), 100);
        assert_eq!(validate_id("  abc  ", "ID").unwrap(), "abc");
    }

    #[test]
    fn test_empty_ids() {
        for id in ["", "   "] {
            let err = validate_id(id, "Workflow ID").unwrap_err();
            assert_eq!(err.to_string(), "Invalid argument: Workflow ID is required");
        }
    }

    #[test]
    fn test_path_traversal() {
        for id in ["../../../etc/passwd", "id/../secrets", "..", "a\\b"] {
            let err = validate_id(id, "Execution ID").unwrap_err();
            assert!(err.external_message().contains("invalid path"), "{}", id);
        }
    }

    #[test]
    fn test_invalid_characters() {
        for id in [
            "id with spaces",
            "<script>alert('xss')",
            "id;DROP TABLE workflows;",
            "id|rm -rf",
            "ünïcode",
        ] {
            let err = validate_id(id, "Workflow ID").unwrap_err();
            assert!(err.external_message().contains("invalid characters"), "{}", id);
        }
    }

    #[test]
    fn test_too_long() {
        let err = validate_id(&"a".repeat(101), "Workflow ID").unwrap_err();
        assert!(err.external_message().contains("too long"));
    }
}
