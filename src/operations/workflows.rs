//! Workflow operations.

use serde_json::{json, Map, Value};
use tracing::info;

use super::{validate_id, N8nApi};
use crate::client::Operation;
use crate::error::{Error, Result};
use crate::models::Workflow;

/// Fields for a new workflow.
#[derive(Debug, Clone, Default)]
pub struct WorkflowDraft {
    pub name: String,
    pub nodes: Vec<Value>,
    pub connections: Map<String, Value>,
    pub active: bool,
    pub settings: Map<String, Value>,
    pub tags: Option<Vec<Value>>,
}

impl WorkflowDraft {
    fn into_body(self) -> Value {
        let mut body = json!({
            "name": self.name,
            "nodes": self.nodes,
            "connections": self.connections,
            "active": self.active,
            "settings": self.settings,
        });
        if let Some(tags) = self.tags {
            body["tags"] = Value::Array(tags);
        }
        body
    }
}

impl N8nApi {
    /// List workflows, optionally filtered by active state.
    pub async fn list_workflows(
        &self,
        active: Option<bool>,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Value> {
        let op = Operation::get("/workflows")
            .with_optional_query("active", active)
            .with_optional_query("limit", limit)
            .with_optional_query("cursor", cursor);
        self.fetch::<Workflow>(op, "list_workflows").await
    }

    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Value> {
        let id = validate_id(workflow_id, "Workflow ID")?;
        self.fetch::<Workflow>(Operation::get(format!("/workflows/{}", id)), "get_workflow")
            .await
    }

    pub async fn create_workflow(&self, draft: WorkflowDraft) -> Result<Value> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidArgument("Workflow name is required".into()));
        }
        info!(name = %draft.name, nodes = draft.nodes.len(), "Creating workflow");
        let op = Operation::post("/workflows").with_body(draft.into_body());
        self.fetch::<Workflow>(op, "create_workflow").await
    }

    /// Patch a workflow with only the fields in `changes`.
    pub async fn update_workflow(
        &self,
        workflow_id: &str,
        changes: Map<String, Value>,
    ) -> Result<Value> {
        let id = validate_id(workflow_id, "Workflow ID")?;
        if changes.is_empty() {
            return Err(Error::InvalidArgument("No fields to update".into()));
        }
        let op = Operation::patch(format!("/workflows/{}", id)).with_body(Value::Object(changes));
        self.fetch::<Workflow>(op, "update_workflow").await
    }

    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<Value> {
        let id = validate_id(workflow_id, "Workflow ID")?;
        info!(workflow_id = %id, "Deleting workflow");
        self.send(Operation::delete(format!("/workflows/{}", id)))
            .await
    }

    pub async fn activate_workflow(&self, workflow_id: &str) -> Result<Value> {
        self.set_active(workflow_id, true, "activate_workflow").await
    }

    pub async fn deactivate_workflow(&self, workflow_id: &str) -> Result<Value> {
        self.set_active(workflow_id, false, "deactivate_workflow")
            .await
    }

    async fn set_active(&self, workflow_id: &str, active: bool, name: &str) -> Result<Value> {
        let id = validate_id(workflow_id, "Workflow ID")?;
        let op = Operation::patch(format!("/workflows/{}", id)).with_body(json!({ "active": active }));
        self.fetch::<Workflow>(op, name).await
    }

    /// Run a workflow manually. A missing or empty payload sends `{}`.
    ///
    /// The request is retried on 5xx like any other, so a flaky server may
    /// see the execution more than once.
    pub async fn execute_workflow(&self, workflow_id: &str, data: Option<Value>) -> Result<Value> {
        let id = validate_id(workflow_id, "Workflow ID")?;
        info!(workflow_id = %id, "Executing workflow");
        let op = Operation::post(format!("/workflows/{}/execute", id)).with_body(payload(data));
        self.send(op).await
    }
}

/// Execution payload: the caller's data, or `{}` when absent or empty.
pub(super) fn payload(data: Option<Value>) -> Value {
    match data {
        None | Some(Value::Null) => json!({}),
        Some(Value::Object(map)) if map.is_empty() => json!({}),
        Some(other) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedTransport;
    use crate::operations::test_support::api;
    use reqwest::Method;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_workflows_query() {
        let transport = Arc::new(ScriptedTransport::new().json(
            200,
            json!({"data": [{"id": "1", "name": "A"}], "nextCursor": null}),
        ));

        let result = api(&transport)
            .list_workflows(Some(true), Some(20), None)
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.endpoint, "/workflows");
        assert_eq!(
            sent.query,
            vec![
                ("active".to_string(), "true".to_string()),
                ("limit".to_string(), "20".to_string())
            ]
        );
        assert_eq!(result["data"][0]["active"], false);
        assert_eq!(result["data"][0]["nodes"], json!([]));
    }

    #[tokio::test]
    async fn test_get_workflow_validates_id_before_request() {
        let transport = Arc::new(ScriptedTransport::new().json(200, json!({})));

        let err = api(&transport)
            .get_workflow("../../admin")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_workflow_keeps_unexpected_shape() {
        let raw = json!({"id": "1", "name": 12345, "custom": true});
        let transport = Arc::new(ScriptedTransport::new().json(200, raw.clone()));

        let result = api(&transport).get_workflow("1").await.unwrap();

        assert_eq!(transport.requests()[0].endpoint, "/workflows/1");
        assert_eq!(result, raw);
    }

    #[tokio::test]
    async fn test_create_workflow_body() {
        let transport = Arc::new(
            ScriptedTransport::new().json(200, json!({"id": "9", "name": "New", "active": false})),
        );

        let draft = WorkflowDraft {
            name: "New".to_string(),
            nodes: vec![json!({"name": "Start", "type": "n8n-nodes-base.start"})],
            ..Default::default()
        };
        let result = api(&transport).create_workflow(draft).await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.endpoint, "/workflows");
        assert_eq!(
            sent.body,
            Some(json!({
                "name": "New",
                "nodes": [{"name": "Start", "type": "n8n-nodes-base.start"}],
                "connections": {},
                "active": false,
                "settings": {}
            }))
        );
        assert_eq!(result["id"], "9");
    }

    #[tokio::test]
    async fn test_create_workflow_requires_name() {
        let transport = Arc::new(ScriptedTransport::new().json(200, json!({})));
        let err = api(&transport)
            .create_workflow(WorkflowDraft::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_only_provided_fields() {
        let transport = Arc::new(ScriptedTransport::new().json(200, json!({"id": "1", "name": "Renamed"})));

        let mut changes = Map::new();
        changes.insert("name".to_string(), json!("Renamed"));
        api(&transport).update_workflow("1", changes).await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::PATCH);
        assert_eq!(sent.endpoint, "/workflows/1");
        assert_eq!(sent.body, Some(json!({"name": "Renamed"})));
    }

    #[tokio::test]
    async fn test_update_without_changes_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new().json(200, json!({})));
        let err = api(&transport)
            .update_workflow("1", Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_activate_and_deactivate() {
        let transport = Arc::new(ScriptedTransport::new().json(200, json!({"id": "1", "name": "A", "active": true})));
        let client = api(&transport);

        client.activate_workflow("1").await.unwrap();
        client.deactivate_workflow("1").await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].body, Some(json!({"active": true})));
        assert_eq!(sent[1].body, Some(json!({"active": false})));
        assert!(sent.iter().all(|op| op.method == Method::PATCH));
    }

    #[tokio::test]
    async fn test_delete_is_passthrough() {
        let transport = Arc::new(ScriptedTransport::new().empty(204));
        let result = api(&transport).delete_workflow("1").await.unwrap();

        assert_eq!(transport.requests()[0].method, Method::DELETE);
        assert_eq!(result, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_execute_defaults_to_empty_payload() {
        let transport = Arc::new(ScriptedTransport::new().json(200, json!({"executionId": "55"})));
        let client = api(&transport);

        client.execute_workflow("1", None).await.unwrap();
        client
            .execute_workflow("1", Some(json!({"order": 7})))
            .await
            .unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].endpoint, "/workflows/1/execute");
        assert_eq!(sent[0].body, Some(json!({})));
        assert_eq!(sent[1].body, Some(json!({"order": 7})));
    }

    #[test]
    fn test_payload() {
        assert_eq!(payload(None), json!({}));
        assert_eq!(payload(Some(Value::Null)), json!({}));
        assert_eq!(payload(Some(json!({}))), json!({}));
        assert_eq!(payload(Some(json!([1]))), json!([1]));
    }
}
