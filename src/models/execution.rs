//! Execution records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{nullable, nullable_id, Nullable};

/// One run of a workflow. Every field is optional; n8n trims the record
/// depending on `includeData` and the execution state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub id: Nullable<String>,

    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub workflow_id: Nullable<String>,

    /// Snapshot of the workflow as it ran; kept as a plain object.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub workflow_data: Nullable<Map<String, Value>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub mode: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub status: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub started_at: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub stopped_at: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub finished_at: Nullable<String>,

    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub retry_of: Nullable<String>,

    #[serde(default, deserialize_with = "nullable_id", skip_serializing_if = "Option::is_none")]
    pub retry_success_id: Nullable<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub data: Nullable<Map<String, Value>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub wait_till: Nullable<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
