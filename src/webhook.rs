//! Webhook trigger discovery.
//!
//! Scans a workflow's nodes for webhook triggers and describes each one.
//! Works on validated and unvalidated workflow JSON alike: anything missing
//! or of the wrong type falls back to n8n's default for that field.

use serde::Serialize;
use serde_json::{Map, Value};

/// Node type of the webhook trigger.
pub const WEBHOOK_NODE_TYPE: &str = "n8n-nodes-base.webhook";

const WEBHOOK_SHORT_TYPE: &str = "webhook";

const DEFAULT_HTTP_METHOD: &str = "GET";
const DEFAULT_RESPONSE_MODE: &str = "onReceived";
const DEFAULT_AUTHENTICATION: &str = "none";

/// One webhook trigger found in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookDescriptor {
    pub workflow_id: Option<String>,
    pub workflow_name: String,
    pub workflow_active: bool,
    pub node_name: String,
    pub node_id: Option<String>,
    pub webhook_path: String,
    pub http_method: String,
    pub response_mode: String,
    pub authentication: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_whitelist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<Value>,
}

impl WebhookDescriptor {
    /// URL n8n serves while the workflow is active.
    pub fn production_url(&self, base_url: &str) -> String {
        webhook_url(base_url, "webhook", &self.webhook_path)
    }

    /// URL n8n serves while the editor is listening for a test event.
    pub fn test_url(&self, base_url: &str) -> String {
        webhook_url(base_url, "webhook-test", &self.webhook_path)
    }
}

fn webhook_url(base_url: &str, prefix: &str, path: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        prefix,
        path.trim_start_matches('/')
    )
}

pub fn is_webhook_node(node_type: &str) -> bool {
    node_type == WEBHOOK_NODE_TYPE || node_type == WEBHOOK_SHORT_TYPE
}

/// Describe every webhook trigger in `workflow`, in node order.
///
/// A workflow without webhook nodes yields an empty vec.
pub fn scan_workflow(workflow: &Value) -> Vec<WebhookDescriptor> {
    let Some(nodes) = workflow.get("nodes").and_then(Value::as_array) else {
        return Vec::new();
    };

    let workflow_id = workflow.get("id").and_then(id_string);
    let workflow_name = text(workflow, "name").unwrap_or_default();
    let workflow_active = workflow
        .get("active")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    nodes
        .iter()
        .filter(|node| text(node, "type").is_some_and(|t| is_webhook_node(&t)))
        .map(|node| {
            let empty = Map::new();
            let params = node
                .get("parameters")
                .and_then(Value::as_object)
                .unwrap_or(&empty);

            WebhookDescriptor {
                workflow_id: workflow_id.clone(),
                workflow_name: workflow_name.clone(),
                workflow_active,
                node_name: text(node, "name").unwrap_or_default(),
                node_id: node.get("id").and_then(id_string),
                webhook_path: param_text(params, "path").unwrap_or_default(),
                http_method: param_text(params, "httpMethod")
                    .unwrap_or_else(|| DEFAULT_HTTP_METHOD.to_string()),
                response_mode: param_text(params, "responseMode")
                    .unwrap_or_else(|| DEFAULT_RESPONSE_MODE.to_string()),
                authentication: param_text(params, "authentication")
                    .unwrap_or_else(|| DEFAULT_AUTHENTICATION.to_string()),
                ip_whitelist: option_text(params, "ipWhitelist"),
                response_data: param_text(params, "responseData"),
                allowed_origins: option_text(params, "allowedOrigins"),
                response_code: option_value(params, "responseCode"),
            }
        })
        .collect()
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn param_text(params: &Map<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Newer node versions move some settings under `parameters.options`.
fn option_value(params: &Map<String, Value>, key: &str) -> Option<Value> {
    params
        .get(key)
        .or_else(|| params.get("options").and_then(|o| o.get(key)))
        .filter(|v| !v.is_null())
        .cloned()
}

fn option_text(params: &Map<String, Value>, key: &str) -> Option<String> {
    option_value(params, key).and_then(|v| v.as_str().map(str::to_string))
}
