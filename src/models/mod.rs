//! n8n entity models.
//!
//! The structs here describe what n8n usually returns. They are deliberately
//! loose: every optional field has a default, identifiers accept strings or
//! numbers, and unknown fields are kept in a flattened `extra` map so that
//! re-serializing a validated entity loses nothing.
//!
//! Responses are never rejected for not matching these shapes; see
//! [`validate`] for how mismatches degrade.

mod credential;
mod execution;
pub mod validate;
mod workflow;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use credential::{Credential, Tag};
pub use execution::Execution;
pub use validate::{validate, Validated, ValidatedBody, Validation};
pub use workflow::{Node, NodeEntry, Workflow};

/// Entity kinds the validator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Workflow,
    Execution,
    Credential,
    Tag,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Workflow => write!(f, "workflow"),
            EntityKind::Execution => write!(f, "execution"),
            EntityKind::Credential => write!(f, "credential"),
            EntityKind::Tag => write!(f, "tag"),
        }
    }
}

/// A typed view of one n8n resource.
pub trait Entity: DeserializeOwned + Serialize {
    const KIND: EntityKind;
}

impl Entity for Workflow {
    const KIND: EntityKind = EntityKind::Workflow;
}

impl Entity for Execution {
    const KIND: EntityKind = EntityKind::Execution;
}

impl Entity for Credential {
    const KIND: EntityKind = EntityKind::Credential;
}

impl Entity for Tag {
    const KIND: EntityKind = EntityKind::Tag;
}

/// Accept an identifier given as a JSON string or number.
pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => Some(s),
        Some(RawId::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

/// An optional field that remembers an explicit `null`.
///
/// `None` means absent and is skipped on output; `Some(None)` is written
/// back as `null`.
pub type Nullable<T> = Option<Option<T>>;

/// Deserialize a [`Nullable`] field. Pair with `#[serde(default)]` so an
/// absent field stays `None`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// [`nullable`] for identifiers given as a string or number.
pub(crate) fn nullable_id<'de, D>(deserializer: D) -> Result<Nullable<String>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_id(deserializer).map(Some)
}

/// Treat an explicit `null` like an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
