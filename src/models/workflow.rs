//! Workflow and node shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::{null_as_default, nullable, nullable_id, Nullable};

/// An n8n workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub id: Nullable<String>,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<NodeEntry>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Map<String, Value>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub settings: Nullable<Map<String, Value>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub static_data: Nullable<Value>,

    /// Tag objects or bare tag names; n8n has returned both.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Value>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub created_at: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub updated_at: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub version_id: Nullable<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A workflow node: typed when it has the usual shape, raw otherwise.
///
/// One odd node never downgrades the whole workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeEntry {
    Typed(Node),
    Raw(Value),
}

impl NodeEntry {
    pub fn node_type(&self) -> Option<&str> {
        match self {
            NodeEntry::Typed(node) => Some(&node.node_type),
            NodeEntry::Raw(value) => value.get("type").and_then(Value::as_str),
        }
    }
}

/// A single step in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub id: Nullable<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub type_version: Nullable<Number>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub position: Nullable<Vec<Number>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub parameters: Nullable<Map<String, Value>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub credentials: Nullable<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_workflow_gets_defaults() {
        let wf: Workflow = serde_json::from_value(json!({"name": "Empty"})).unwrap();
        assert_eq!(wf.name, "Empty");
        assert!(!wf.active);
        assert!(wf.nodes.is_empty());
        assert!(wf.connections.is_empty());
        assert!(wf.tags.is_empty());
        assert_eq!(wf.id, None);
    }

    #[test]
    fn test_explicit_nulls_get_defaults() {
        let wf: Workflow = serde_json::from_value(json!({
            "name": "Nulls",
            "active": null,
            "nodes": null,
            "tags": null
        }))
        .unwrap();
        assert!(!wf.active);
        assert!(wf.nodes.is_empty());
        assert!(wf.tags.is_empty());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        assert!(serde_json::from_value::<Workflow>(json!({"id": "1"})).is_err());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(serde_json::from_value::<Workflow>(json!({"name": 12345})).is_err());
        assert!(
            serde_json::from_value::<Workflow>(json!({"name": "x", "active": "yes"})).is_err()
        );
    }

    #[test]
    fn test_odd_node_stays_raw() {
        let wf: Workflow = serde_json::from_value(json!({
            "name": "Mixed",
            "nodes": [
                {"name": "Start", "type": "n8n-nodes-base.start", "position": [250, 300]},
                {"type": "n8n-nodes-base.webhook"}
            ]
        }))
        .unwrap();

        assert!(matches!(wf.nodes[0], NodeEntry::Typed(_)));
        assert!(matches!(wf.nodes[1], NodeEntry::Raw(_)));
        assert_eq!(wf.nodes[1].node_type(), Some("n8n-nodes-base.webhook"));
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = json!({
            "id": "7",
            "name": "Keep",
            "active": true,
            "nodes": [{"name": "A", "type": "t", "notesInFlow": true}],
            "connections": {},
            "tags": [],
            "pinData": {"A": []},
            "foo": 1
        });
        let wf: Workflow = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(wf.extra.get("foo"), Some(&json!(1)));

        let back = serde_json::to_value(&wf).unwrap();
        assert_eq!(back, raw);
    }
}
