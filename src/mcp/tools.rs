//! MCP Tool definitions for n8n-mcp.
//!
//! Every tool maps onto one [`N8nApi`] operation. Failures are returned as
//! MCP tool errors carrying the sanitized error JSON, so agents see a stable
//! `code` and never the raw upstream body.

use rmcp::{model::*, tool, Error as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::operations::{ExecutionFilter, N8nApi, WorkflowDraft};

/// n8n MCP Service - handles all tool calls
#[derive(Clone)]
pub struct N8nService {
    api: N8nApi,
}

impl N8nService {
    pub fn new(api: N8nApi) -> Self {
        Self { api }
    }
}

// ============================================================================
// Tool Parameter Types
// ============================================================================

/// Parameters for listing workflows
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListWorkflowsParams {
    /// Only active (true) or inactive (false) workflows
    #[serde(default)]
    pub active: Option<bool>,
    /// Page size
    #[serde(default)]
    pub limit: Option<u32>,
    /// Cursor from a previous page's `nextCursor`
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Parameters naming a single workflow
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkflowIdParams {
    /// Workflow ID
    pub workflow_id: String,
}

/// Parameters for creating a workflow
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateWorkflowParams {
    /// Workflow name
    pub name: String,
    /// Node definitions
    #[serde(default)]
    pub nodes: Option<Vec<Value>>,
    /// Connections between nodes, keyed by source node name
    #[serde(default)]
    pub connections: Option<Map<String, Value>>,
    /// Activate immediately (default: false)
    #[serde(default)]
    pub active: Option<bool>,
    /// Workflow settings
    #[serde(default)]
    pub settings: Option<Map<String, Value>>,
    /// Tags to attach
    #[serde(default)]
    pub tags: Option<Vec<Value>>,
}

/// Parameters for updating a workflow. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateWorkflowParams {
    /// Workflow ID
    pub workflow_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Option<Vec<Value>>,
    #[serde(default)]
    pub connections: Option<Map<String, Value>>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub settings: Option<Map<String, Value>>,
    #[serde(default)]
    pub tags: Option<Vec<Value>>,
}

impl UpdateWorkflowParams {
    fn changes(self) -> Map<String, Value> {
        let mut changes = Map::new();
        if let Some(name) = self.name {
            changes.insert("name".into(), Value::String(name));
        }
        if let Some(nodes) = self.nodes {
            changes.insert("nodes".into(), Value::Array(nodes));
        }
        if let Some(connections) = self.connections {
            changes.insert("connections".into(), Value::Object(connections));
        }
        if let Some(active) = self.active {
            changes.insert("active".into(), Value::Bool(active));
        }
        if let Some(settings) = self.settings {
            changes.insert("settings".into(), Value::Object(settings));
        }
        if let Some(tags) = self.tags {
            changes.insert("tags".into(), Value::Array(tags));
        }
        changes
    }
}

/// Parameters for running a workflow
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteWorkflowParams {
    /// Workflow ID
    pub workflow_id: String,
    /// Input data for the run (JSON object)
    #[serde(default)]
    pub data: Option<Value>,
}

/// Parameters for listing executions
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListExecutionsParams {
    /// Only executions of this workflow
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// success, error, waiting, running, canceled
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub cursor: Option<String>,
    /// Include full run data
    #[serde(default)]
    pub include_data: Option<bool>,
}

/// Parameters for getting an execution
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetExecutionParams {
    /// Execution ID
    pub execution_id: String,
    /// Include full run data
    #[serde(default)]
    pub include_data: Option<bool>,
}

/// Parameters naming a single execution
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecutionIdParams {
    /// Execution ID
    pub execution_id: String,
}

/// Parameters for listing credentials
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListCredentialsParams {
    /// Credential type, e.g. `slackApi`
    #[serde(default, alias = "type")]
    pub credential_type: Option<String>,
}

/// Parameters for listing tags
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListTagsParams {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Parameters for listing webhooks
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListWebhooksParams {
    /// Only scan active (true) or inactive (false) workflows
    #[serde(default)]
    pub active: Option<bool>,
}

/// Parameters for testing a webhook workflow
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TestWebhookParams {
    /// Workflow ID
    pub workflow_id: String,
    /// Payload to run the workflow with
    #[serde(default)]
    pub data: Option<Value>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool(tool_box)]
impl N8nService {
    #[tool(description = "List n8n workflows. Supports filtering by active state and cursor pagination.")]
    pub async fn list_workflows(
        &self,
        #[tool(aggr)] params: ListWorkflowsParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "list_workflows",
            self.api
                .list_workflows(params.active, params.limit, params.cursor.as_deref())
                .await,
        )
    }

    #[tool(description = "Get a workflow by ID, including its nodes and connections.")]
    pub async fn get_workflow(
        &self,
        #[tool(aggr)] params: WorkflowIdParams,
    ) -> Result<CallToolResult, McpError> {
        respond("get_workflow", self.api.get_workflow(&params.workflow_id).await)
    }

    #[tool(description = "Create a new workflow from a name, nodes and connections.")]
    pub async fn create_workflow(
        &self,
        #[tool(aggr)] params: CreateWorkflowParams,
    ) -> Result<CallToolResult, McpError> {
        let draft = WorkflowDraft {
            name: params.name,
            nodes: params.nodes.unwrap_or_default(),
            connections: params.connections.unwrap_or_default(),
            active: params.active.unwrap_or(false),
            settings: params.settings.unwrap_or_default(),
            tags: params.tags,
        };
        respond("create_workflow", self.api.create_workflow(draft).await)
    }

    #[tool(description = "Update an existing workflow. Only the provided fields are changed.")]
    pub async fn update_workflow(
        &self,
        #[tool(aggr)] params: UpdateWorkflowParams,
    ) -> Result<CallToolResult, McpError> {
        let workflow_id = params.workflow_id.clone();
        respond(
            "update_workflow",
            self.api.update_workflow(&workflow_id, params.changes()).await,
        )
    }

    #[tool(description = "Delete a workflow by ID.")]
    pub async fn delete_workflow(
        &self,
        #[tool(aggr)] params: WorkflowIdParams,
    ) -> Result<CallToolResult, McpError> {
        respond("delete_workflow", self.api.delete_workflow(&params.workflow_id).await)
    }

    #[tool(description = "Activate a workflow so its triggers start listening.")]
    pub async fn activate_workflow(
        &self,
        #[tool(aggr)] params: WorkflowIdParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "activate_workflow",
            self.api.activate_workflow(&params.workflow_id).await,
        )
    }

    #[tool(description = "Deactivate a workflow.")]
    pub async fn deactivate_workflow(
        &self,
        #[tool(aggr)] params: WorkflowIdParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "deactivate_workflow",
            self.api.deactivate_workflow(&params.workflow_id).await,
        )
    }

    #[tool(description = "Execute a workflow manually with optional input data.")]
    pub async fn execute_workflow(
        &self,
        #[tool(aggr)] params: ExecuteWorkflowParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "execute_workflow",
            self.api
                .execute_workflow(&params.workflow_id, params.data)
                .await,
        )
    }

    #[tool(description = "List workflow executions, optionally filtered by workflow and status.")]
    pub async fn list_executions(
        &self,
        #[tool(aggr)] params: ListExecutionsParams,
    ) -> Result<CallToolResult, McpError> {
        let filter = ExecutionFilter {
            workflow_id: params.workflow_id.as_deref(),
            status: params.status.as_deref(),
            limit: params.limit,
            cursor: params.cursor.as_deref(),
            include_data: params.include_data,
        };
        respond("list_executions", self.api.list_executions(filter).await)
    }

    #[tool(description = "Get the status and result of a workflow execution.")]
    pub async fn get_execution(
        &self,
        #[tool(aggr)] params: GetExecutionParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_execution",
            self.api
                .get_execution(&params.execution_id, params.include_data)
                .await,
        )
    }

    #[tool(description = "Delete an execution record.")]
    pub async fn delete_execution(
        &self,
        #[tool(aggr)] params: ExecutionIdParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "delete_execution",
            self.api.delete_execution(&params.execution_id).await,
        )
    }

    #[tool(description = "List credentials (metadata only), optionally filtered by type.")]
    pub async fn list_credentials(
        &self,
        #[tool(aggr)] params: ListCredentialsParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "list_credentials",
            self.api
                .list_credentials(params.credential_type.as_deref())
                .await,
        )
    }

    #[tool(description = "List workflow tags.")]
    pub async fn list_tags(
        &self,
        #[tool(aggr)] params: ListTagsParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "list_tags",
            self.api
                .list_tags(params.limit, params.cursor.as_deref())
                .await,
        )
    }

    #[tool(description = "List every webhook trigger across workflows, with production and test URLs.")]
    pub async fn list_webhooks(
        &self,
        #[tool(aggr)] params: ListWebhooksParams,
    ) -> Result<CallToolResult, McpError> {
        respond("list_webhooks", self.api.list_webhooks(params.active).await)
    }

    #[tool(description = "Get the webhook triggers of one workflow: path, method, response mode, authentication.")]
    pub async fn get_webhook(
        &self,
        #[tool(aggr)] params: WorkflowIdParams,
    ) -> Result<CallToolResult, McpError> {
        respond("get_webhook", self.api.get_webhook(&params.workflow_id).await)
    }

    #[tool(description = "Run a webhook-triggered workflow with test data. Fails if the workflow has no webhook trigger.")]
    pub async fn test_webhook(
        &self,
        #[tool(aggr)] params: TestWebhookParams,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "test_webhook",
            self.api
                .test_webhook(&params.workflow_id, params.data)
                .await,
        )
    }
}

/// Render an operation result as an MCP tool result.
fn respond(
    tool: &str,
    result: crate::error::Result<Value>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::text(pretty(&value)?)])),
        Err(e @ (Error::Internal(_) | Error::Io(_))) => {
            Err(McpError::internal_error("internal_error", Some(e.to_external_json())))
        }
        Err(e) => {
            debug!(tool, code = e.code(), "Tool call failed");
            Ok(CallToolResult::error(vec![Content::text(pretty(
                &e.to_external_json(),
            )?)]))
        }
    }
}

fn pretty(value: &Value) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {}", e), None))
}

#[tool(tool_box)]
impl ServerHandler for N8nService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Manage an n8n instance: list, create, update and run workflows, inspect executions, credentials and tags, and discover webhook triggers. Failed calls return JSON with a stable error code."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "n8n-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            ..Default::default()
        }
    }
}
