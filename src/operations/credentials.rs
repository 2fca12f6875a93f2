//! Credential and tag listings.

use serde_json::Value;

use super::N8nApi;
use crate::client::Operation;
use crate::error::Result;
use crate::models::{Credential, Tag};

impl N8nApi {
    /// List credential metadata, optionally for one credential type.
    pub async fn list_credentials(&self, credential_type: Option<&str>) -> Result<Value> {
        let op = Operation::get("/credentials").with_optional_query("type", credential_type);
        self.fetch::<Credential>(op, "list_credentials").await
    }

    pub async fn list_tags(&self, limit: Option<u32>, cursor: Option<&str>) -> Result<Value> {
        let op = Operation::get("/tags")
            .with_optional_query("limit", limit)
            .with_optional_query("cursor", cursor);
        self.fetch::<Tag>(op, "list_tags").await
    }
}
