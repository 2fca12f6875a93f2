//! Execution operations.

use serde_json::Value;

use super::{validate_id, N8nApi};
use crate::client::Operation;
use crate::error::Result;
use crate::models::Execution;

/// Filters for [`N8nApi::list_executions`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter<'a> {
    pub workflow_id: Option<&'a str>,
    /// `success`, `error`, `waiting`, ...; passed through as given.
    pub status: Option<&'a str>,
    pub limit: Option<u32>,
    pub cursor: Option<&'a str>,
    pub include_data: Option<bool>,
}

impl N8nApi {
    pub async fn list_executions(&self, filter: ExecutionFilter<'_>) -> Result<Value> {
        let workflow_id = filter
            .workflow_id
            .map(|id| validate_id(id, "Workflow ID"))
            .transpose()?;
        let op = Operation::get("/executions")
            .with_optional_query("workflowId", workflow_id)
            .with_optional_query("status", filter.status)
            .with_optional_query("limit", filter.limit)
            .with_optional_query("cursor", filter.cursor)
            .with_optional_query("includeData", filter.include_data);
        self.fetch::<Execution>(op, "list_executions").await
    }

    pub async fn get_execution(&self, execution_id: &str, include_data: Option<bool>) -> Result<Value> {
        let id = validate_id(execution_id, "Execution ID")?;
        let op = Operation::get(format!("/executions/{}", id))
            .with_optional_query("includeData", include_data);
        self.fetch::<Execution>(op, "get_execution").await
    }

    pub async fn delete_execution(&self, execution_id: &str) -> Result<Value> {
        let id = validate_id(execution_id, "Execution ID")?;
        self.send(Operation::delete(format!("/executions/{}", id)))
            .await
    }
}
