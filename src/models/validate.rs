//! Lenient response validation.
//!
//! n8n responses are coerced into the typed [`Entity`] shapes when they fit,
//! and handed back untouched when they don't. Validation never fails:
//!
//! - a list (bare array, or an envelope whose `data` is an array) is
//!   validated per element; failing elements stay raw and the list gets a
//!   single aggregated warning
//! - a single object that does not fit is returned as-is with a warning
//! - `null` becomes `{}`, other scalars pass through, both with a warning
//!
//! Every downgrade is logged with the entity kind and operation name.

use serde_json::{Map, Value};
use tracing::warn;

use super::Entity;

/// One payload after validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    /// Coerced through the entity schema: defaults filled, extras kept.
    Entity(Value),
    /// Original payload, returned because it did not fit the schema.
    Unvalidated(Value),
}

impl Validated {
    pub fn is_validated(&self) -> bool {
        matches!(self, Validated::Entity(_))
    }

    pub fn as_value(&self) -> &Value {
        match self {
            Validated::Entity(v) | Validated::Unvalidated(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Validated::Entity(v) | Validated::Unvalidated(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedBody {
    Single(Validated),
    /// `envelope` holds the other fields of a paginated response
    /// (`nextCursor`, ...); `None` for a bare array.
    List {
        items: Vec<Validated>,
        envelope: Option<Map<String, Value>>,
    },
}

/// Result of validating one response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub body: ValidatedBody,
    pub warnings: Vec<String>,
}

impl Validation {
    /// Items of a list body, or the single payload as a one-element slice.
    pub fn items(&self) -> &[Validated] {
        match &self.body {
            ValidatedBody::Single(item) => std::slice::from_ref(item),
            ValidatedBody::List { items, .. } => items,
        }
    }

    /// Reassemble the body in the shape it arrived in.
    pub fn into_value(self) -> Value {
        match self.body {
            ValidatedBody::Single(item) => item.into_value(),
            ValidatedBody::List { items, envelope } => {
                let items = Value::Array(items.into_iter().map(Validated::into_value).collect());
                match envelope {
                    Some(mut envelope) => {
                        envelope.insert("data".to_string(), items);
                        Value::Object(envelope)
                    }
                    None => items,
                }
            }
        }
    }
}

/// Validate `raw` as `E` (or a list of `E`).
///
/// `operation` names the calling operation in warnings.
pub fn validate<E: Entity>(raw: Value, operation: &str) -> Validation {
    match raw {
        Value::Null => {
            let message = format!("{}: empty response, returning {{}}", operation);
            downgrade::<E>(operation, &message, 1);
            Validation {
                body: ValidatedBody::Single(Validated::Unvalidated(Value::Object(Map::new()))),
                warnings: vec![message],
            }
        }
        Value::Array(items) => validate_list::<E>(items, None, operation),
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_array) => {
            let items = match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            validate_list::<E>(items, Some(map), operation)
        }
        Value::Object(map) => {
            let (item, error) = validate_one::<E>(Value::Object(map));
            let warnings = match error {
                Some(error) => {
                    let message = format!(
                        "{}: response is not a valid {}, returning it unvalidated: {}",
                        operation,
                        E::KIND,
                        error
                    );
                    downgrade::<E>(operation, &message, 1);
                    vec![message]
                }
                None => Vec::new(),
            };
            Validation {
                body: ValidatedBody::Single(item),
                warnings,
            }
        }
        scalar => {
            let message = format!(
                "{}: expected a {} object, got a scalar; returning it unvalidated",
                operation,
                E::KIND
            );
            downgrade::<E>(operation, &message, 1);
            Validation {
                body: ValidatedBody::Single(Validated::Unvalidated(scalar)),
                warnings: vec![message],
            }
        }
    }
}

fn validate_list<E: Entity>(
    items: Vec<Value>,
    envelope: Option<Map<String, Value>>,
    operation: &str,
) -> Validation {
    let total = items.len();
    let mut failed = Vec::new();
    let items: Vec<Validated> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let (item, error) = validate_one::<E>(item);
            if let Some(error) = error {
                failed.push(format!("[{}] {}", index, error));
            }
            item
        })
        .collect();

    let mut warnings = Vec::new();
    if !failed.is_empty() {
        let message = format!(
            "{}: {} of {} {} items returned unvalidated: {}",
            operation,
            failed.len(),
            total,
            E::KIND,
            failed.join("; ")
        );
        downgrade::<E>(operation, &message, failed.len());
        warnings.push(message);
    }

    Validation {
        body: ValidatedBody::List { items, envelope },
        warnings,
    }
}

/// Coerce one payload, returning the schema error if it does not fit.
fn validate_one<E: Entity>(item: Value) -> (Validated, Option<String>) {
    let coerced = serde_json::from_value::<E>(item.clone())
        .and_then(|entity| serde_json::to_value(&entity));
    match coerced {
        Ok(value) => (Validated::Entity(value), None),
        Err(e) => (Validated::Unvalidated(item), Some(e.to_string())),
    }
}

fn downgrade<E: Entity>(operation: &str, message: &str, count: usize) {
    warn!(entity = %E::KIND, operation, count, "{}", message);
    crate::metrics::record_validation_downgrade(E::KIND, count);
}
