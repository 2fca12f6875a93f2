//! Webhook discovery and testing.

use futures_util::stream::{self, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{validate_id, workflows::payload, N8nApi};
use crate::client::Operation;
use crate::error::{Error, Result};
use crate::webhook::{scan_workflow, WebhookDescriptor};

/// Workflow detail fetches in flight at once during `list_webhooks`.
const DETAIL_CONCURRENCY: usize = 4;

impl N8nApi {
    /// Every webhook trigger across the listed workflows.
    ///
    /// Only the first page of workflows is scanned. A workflow whose details
    /// cannot be fetched is skipped with a warning.
    pub async fn list_webhooks(&self, active: Option<bool>) -> Result<Value> {
        let listing = self.list_workflows(active, None, None).await?;
        let ids = workflow_ids(&listing);

        let details: Vec<(String, Result<Value>)> = stream::iter(ids)
            .map(|id| async move {
                let detail = self.get_workflow(&id).await;
                (id, detail)
            })
            .buffered(DETAIL_CONCURRENCY)
            .collect()
            .await;

        let mut webhooks = Vec::new();
        for (id, detail) in details {
            match detail {
                Ok(workflow) => {
                    for hook in scan_workflow(&workflow) {
                        webhooks.push(self.describe(&hook)?);
                    }
                }
                Err(e) => warn!(workflow_id = %id, code = e.code(), "Skipping workflow: {}", e),
            }
        }

        Ok(json!({
            "total_count": webhooks.len(),
            "webhooks": webhooks,
        }))
    }

    /// Webhook triggers of one workflow.
    pub async fn get_webhook(&self, workflow_id: &str) -> Result<Value> {
        let id = validate_id(workflow_id, "Workflow ID")?;
        let workflow = self.get_workflow(&id).await?;
        let hooks = scan_workflow(&workflow);
        if hooks.is_empty() {
            return Err(Error::NotWebhookWorkflow(format!(
                "No webhook nodes found in workflow {}",
                id
            )));
        }

        let nodes = hooks
            .iter()
            .map(|hook| self.describe(hook))
            .collect::<Result<Vec<_>>>()?;
        Ok(json!({
            "workflow_id": id,
            "workflow_name": hooks[0].workflow_name,
            "workflow_active": hooks[0].workflow_active,
            "total_webhook_nodes": nodes.len(),
            "webhook_nodes": nodes,
        }))
    }

    /// Check the workflow has a webhook trigger, then run it with `data`.
    pub async fn test_webhook(&self, workflow_id: &str, data: Option<Value>) -> Result<Value> {
        let id = validate_id(workflow_id, "Workflow ID")?;
        let workflow = self.get_workflow(&id).await?;
        let hooks = scan_workflow(&workflow);
        let Some(first) = hooks.first() else {
            return Err(Error::NotWebhookWorkflow(format!(
                "Workflow {} does not contain any webhook nodes",
                id
            )));
        };
        debug!(workflow_id = %id, webhooks = hooks.len(), "Testing webhook workflow");

        let op = Operation::post(format!("/workflows/{}/execute", id)).with_body(payload(data));
        let execution = self.send(op).await?;

        Ok(json!({
            "workflow_id": id,
            "workflow_name": first.workflow_name,
            "webhook_path": first.webhook_path,
            "test_url": first.test_url(self.base_url()),
            "test_result": "success",
            "execution": execution,
        }))
    }

    fn describe(&self, hook: &WebhookDescriptor) -> Result<Value> {
        let mut value = serde_json::to_value(hook)?;
        value["production_url"] = hook.production_url(self.base_url()).into();
        value["test_url"] = hook.test_url(self.base_url()).into();
        Ok(value)
    }
}

/// Ids of the workflows in a list response, in order.
fn workflow_ids(listing: &Value) -> Vec<String> {
    let items = listing
        .get("data")
        .and_then(Value::as_array)
        .or_else(|| listing.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    items
        .iter()
        .filter_map(|item| match item.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => {
                warn!("Skipping listed workflow without an id");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedTransport;
    use crate::operations::test_support::{api, BASE_URL};
    use reqwest::Method;
    use std::sync::Arc;

    fn webhook_workflow() -> Value {
        json!({
            "id": "webhook-workflow-1",
            "name": "Test Webhook Workflow",
            "active": true,
            "nodes": [
                {
                    "id": "webhook-node-1",
                    "name": "Webhook",
                    "type": "n8n-nodes-base.webhook",
                    "parameters": {
                        "path": "test-webhook",
                        "httpMethod": "POST",
                        "responseMode": "lastNode",
                        "responseData": "firstEntryJson",
                        "authentication": "basicAuth",
                        "allowedOrigins": "https://example.com",
                        "responseCode": 200,
                        "ipWhitelist": "192.168.1.0/24"
                    },
                    "position": [250, 300]
                },
                {
                    "id": "set-node-1",
                    "name": "Set",
                    "type": "n8n-nodes-base.set",
                    "parameters": {},
                    "position": [450, 300]
                }
            ],
            "connections": {},
            "tags": ["webhook", "test"]
        })
    }

    fn scheduled_workflow() -> Value {
        json!({
            "id": "regular-workflow-1",
            "name": "Regular Workflow",
            "active": true,
            "nodes": [{
                "id": "schedule-node-1",
                "name": "Schedule",
                "type": "n8n-nodes-base.scheduleTrigger",
                "parameters": {}
            }],
            "connections": {}
        })
    }

    #[tokio::test]
    async fn test_list_webhooks() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .json(
                    200,
                    json!({"data": [
                        {"id": "webhook-workflow-1", "name": "Test Webhook Workflow", "active": true},
                        {"id": "regular-workflow-1", "name": "Regular Workflow", "active": true}
                    ]}),
                )
                .json(200, webhook_workflow())
                .json(200, scheduled_workflow()),
        );

        let result = api(&transport).list_webhooks(None).await.unwrap();

        assert_eq!(result["total_count"], 1);
        let hook = &result["webhooks"][0];
        assert_eq!(hook["workflow_id"], "webhook-workflow-1");
        assert_eq!(hook["workflow_name"], "Test Webhook Workflow");
        assert_eq!(hook["workflow_active"], true);
        assert_eq!(hook["node_name"], "Webhook");
        assert_eq!(hook["webhook_path"], "test-webhook");
        assert_eq!(hook["http_method"], "POST");
        assert_eq!(hook["response_mode"], "lastNode");
        assert_eq!(hook["authentication"], "basicAuth");
        assert_eq!(
            hook["production_url"],
            format!("{}/webhook/test-webhook", BASE_URL)
        );

        let endpoints: Vec<String> = transport
            .requests()
            .into_iter()
            .map(|op| op.endpoint)
            .collect();
        assert_eq!(
            endpoints,
            vec![
                "/workflows",
                "/workflows/webhook-workflow-1",
                "/workflows/regular-workflow-1"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_webhooks_active_filter() {
        let transport = Arc::new(ScriptedTransport::new().json(200, json!({"data": []})));

        let result = api(&transport).list_webhooks(Some(true)).await.unwrap();

        assert_eq!(result["total_count"], 0);
        assert_eq!(
            transport.requests()[0].query,
            vec![("active".to_string(), "true".to_string())]
        );
    }

    #[tokio::test]
    async fn test_list_webhooks_skips_failed_details() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .json(200, json!({"data": [{"id": "gone"}, {"id": "webhook-workflow-1"}]}))
                .status(404)
                .json(200, webhook_workflow()),
        );

        let result = api(&transport).list_webhooks(None).await.unwrap();

        assert_eq!(result["total_count"], 1);
        assert_eq!(result["webhooks"][0]["workflow_id"], "webhook-workflow-1");
    }

    #[tokio::test]
    async fn test_list_webhooks_multiple_nodes() {
        let workflow = json!({
            "id": "multi-webhook-1",
            "name": "Multi Webhook Workflow",
            "active": true,
            "nodes": [
                {"id": "webhook-1", "name": "Webhook 1", "type": "n8n-nodes-base.webhook",
                 "parameters": {"path": "webhook-1", "httpMethod": "GET"}},
                {"id": "webhook-2", "name": "Webhook 2", "type": "n8n-nodes-base.webhook",
                 "parameters": {"path": "webhook-2", "httpMethod": "POST"}}
            ],
            "connections": {}
        });
        let transport = Arc::new(
            ScriptedTransport::new()
                .json(200, json!({"data": [{"id": "multi-webhook-1"}]}))
                .json(200, workflow),
        );

        let result = api(&transport).list_webhooks(None).await.unwrap();

        assert_eq!(result["total_count"], 2);
        assert_eq!(result["webhooks"][0]["webhook_path"], "webhook-1");
        assert_eq!(result["webhooks"][1]["http_method"], "POST");
    }

    #[tokio::test]
    async fn test_get_webhook() {
        let transport = Arc::new(ScriptedTransport::new().json(200, webhook_workflow()));

        let result = api(&transport)
            .get_webhook("webhook-workflow-1")
            .await
            .unwrap();

        assert_eq!(result["workflow_id"], "webhook-workflow-1");
        assert_eq!(result["workflow_name"], "Test Webhook Workflow");
        assert_eq!(result["workflow_active"], true);
        assert_eq!(result["total_webhook_nodes"], 1);

        let node = &result["webhook_nodes"][0];
        assert_eq!(node["node_id"], "webhook-node-1");
        assert_eq!(node["response_data"], "firstEntryJson");
        assert_eq!(node["allowed_origins"], "https://example.com");
        assert_eq!(node["response_code"], 200);
        assert_eq!(node["ip_whitelist"], "192.168.1.0/24");
        assert_eq!(
            node["test_url"],
            format!("{}/webhook-test/test-webhook", BASE_URL)
        );
    }

    #[tokio::test]
    async fn test_get_webhook_without_webhook_nodes() {
        let transport = Arc::new(ScriptedTransport::new().json(200, scheduled_workflow()));

        let err = api(&transport)
            .get_webhook("regular-workflow-1")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotWebhookWorkflow(_)));
        assert!(err.external_message().contains("No webhook nodes found"));
    }

    #[tokio::test]
    async fn test_get_webhook_validates_id() {
        let transport = Arc::new(ScriptedTransport::new().json(200, webhook_workflow()));
        let err = api(&transport)
            .get_webhook("../../../etc/passwd")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_test_webhook() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .json(200, webhook_workflow())
                .json(200, json!({"executionId": "exec-123", "status": "success"})),
        );

        let result = api(&transport)
            .test_webhook("webhook-workflow-1", Some(json!({"test": "data"})))
            .await
            .unwrap();

        assert_eq!(result["workflow_id"], "webhook-workflow-1");
        assert_eq!(result["workflow_name"], "Test Webhook Workflow");
        assert_eq!(result["test_result"], "success");
        assert_eq!(result["execution"]["executionId"], "exec-123");

        let sent = transport.requests();
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(sent[1].endpoint, "/workflows/webhook-workflow-1/execute");
        assert_eq!(sent[1].body, Some(json!({"test": "data"})));
    }

    #[tokio::test]
    async fn test_test_webhook_without_data() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .json(200, webhook_workflow())
                .json(200, json!({"executionId": "exec-124"})),
        );

        api(&transport)
            .test_webhook("webhook-workflow-1", None)
            .await
            .unwrap();

        assert_eq!(transport.requests()[1].body, Some(json!({})));
    }

    #[tokio::test]
    async fn test_test_webhook_rejects_non_webhook_workflow() {
        let transport = Arc::new(ScriptedTransport::new().json(200, scheduled_workflow()));

        let err = api(&transport)
            .test_webhook("regular-workflow-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotWebhookWorkflow(_)));
        assert!(err
            .external_message()
            .contains("does not contain any webhook nodes"));
        // Nothing was executed
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_workflow_ids() {
        assert_eq!(
            workflow_ids(&json!({"data": [{"id": "a"}, {"id": 2}, {"name": "no id"}]})),
            vec!["a", "2"]
        );
        assert_eq!(workflow_ids(&json!([{"id": "x"}])), vec!["x"]);
        assert!(workflow_ids(&json!({"message": "odd"})).is_empty());
    }
}
