//! Credential and tag shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{nullable, nullable_id, Nullable};

/// Credential metadata. n8n does not return secret values from the list
/// endpoint; whatever `data` it sends is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub id: Nullable<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub credential_type: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub data: Nullable<Map<String, Value>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub nodes_access: Nullable<Vec<Map<String, Value>>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub shared_with: Nullable<Vec<Map<String, Value>>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub created_at: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub updated_at: Nullable<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A workflow tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub id: Nullable<String>,

    pub name: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub created_at: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub updated_at: Nullable<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
