//! Typed schema values: the unit of data exchanged between workers.
//!
//! A schema is a serde-backed record type implementing the [`Schema`] trait.
//! Values are validated structurally at every stage boundary: each declared
//! required field must be present with the declared type before the value may
//! flow into a worker. Validation failure ([`ValidationError`]) is a distinct
//! error kind from stage-execution failure.
//!
//! Values are immutable by convention: a worker that wants to "extend" a value
//! constructs a new one rather than mutating its input in place.
//!
//! # Validation modes
//!
//! Unknown fields in a raw payload are either ignored
//! ([`ValidationMode::Lenient`], the default, forward-compatible) or rejected
//! ([`ValidationMode::Strict`]), configured per graph via
//! [`GraphBuilder::with_validation`](crate::graphs::GraphBuilder::with_validation).
//!
//! # Examples
//!
//! ```rust
//! use formweaver::schema::{Schema, ValidationMode};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Greeting {
//!     text: String,
//! }
//!
//! impl Schema for Greeting {
//!     fn name() -> &'static str {
//!         "Greeting"
//!     }
//! }
//!
//! let ok = Greeting::validate(&json!({"text": "hello"}), ValidationMode::Lenient);
//! assert!(ok.is_ok());
//!
//! // Missing required field is a validation error, not a worker failure.
//! let missing = Greeting::validate(&json!({}), ValidationMode::Lenient);
//! assert!(missing.is_err());
//!
//! // Unknown fields pass in lenient mode, fail in strict mode.
//! let extra = json!({"text": "hello", "color": "blue"});
//! assert!(Greeting::validate(&extra, ValidationMode::Lenient).is_ok());
//! assert!(Greeting::validate(&extra, ValidationMode::Strict).is_err());
//! ```

use miette::Diagnostic;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Controls how unknown fields in a raw payload are treated during validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Unknown fields are ignored (forward-compatible). The default.
    #[default]
    Lenient,
    /// Unknown fields are rejected with a [`ValidationError`].
    Strict,
}

/// A raw value failed structural validation against a declared schema.
#[derive(Debug, Error, Diagnostic)]
#[error("schema `{schema}` rejected value: {detail}")]
#[diagnostic(
    code(formweaver::schema::validation),
    help("Check that every required field is present with the declared type.")
)]
pub struct ValidationError {
    /// Name of the schema that rejected the value.
    pub schema: &'static str,
    /// Human-readable description of the mismatch.
    pub detail: String,
}

impl ValidationError {
    pub(crate) fn new(schema: &'static str, detail: impl Into<String>) -> Self {
        Self {
            schema,
            detail: detail.into(),
        }
    }
}

/// Compile-time description of a schema, used for graph wiring checks.
///
/// Two workers may be connected by an identity bridge only when the source's
/// output descriptor equals the destination's input descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SchemaDescriptor {
    /// The schema's declared name.
    pub name: &'static str,
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A validated, strongly-typed value container with named, typed fields.
///
/// Implementors are plain serde records; the trait adds a stable name (for
/// wiring checks and diagnostics), structural validation, and optional
/// documentation examples. Primitive fields, nested records, and ordered
/// sequences of records are all supported through serde.
pub trait Schema: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable name of this schema, unique within the embedding application.
    fn name() -> &'static str;

    /// Descriptor used for graph-construction compatibility checks.
    #[must_use]
    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor { name: Self::name() }
    }

    /// Documentation examples for this schema.
    ///
    /// Descriptive only: examples never participate in validation.
    #[must_use]
    fn examples() -> Vec<Value> {
        Vec::new()
    }

    /// Validates a raw value against this schema.
    ///
    /// Every declared required field must be present with the declared type.
    /// In [`ValidationMode::Strict`], fields the schema does not declare are
    /// rejected as well.
    fn validate(raw: &Value, mode: ValidationMode) -> Result<Self, ValidationError> {
        let typed: Self = serde_json::from_value(raw.clone())
            .map_err(|e| ValidationError::new(Self::name(), e.to_string()))?;
        if mode == ValidationMode::Strict {
            let canonical = serde_json::to_value(&typed)
                .map_err(|e| ValidationError::new(Self::name(), e.to_string()))?;
            if let Some(path) = find_unknown_field(raw, &canonical, String::new()) {
                return Err(ValidationError::new(
                    Self::name(),
                    format!("unknown field `{path}`"),
                ));
            }
        }
        Ok(typed)
    }

    /// Serializes this value back to its raw representation.
    fn to_value(&self) -> Result<Value, ValidationError> {
        serde_json::to_value(self).map_err(|e| ValidationError::new(Self::name(), e.to_string()))
    }
}

/// Walks `raw` against the canonical serialization of the typed value and
/// returns the dotted path of the first field `raw` carries that the schema
/// does not declare. Arrays are compared element-wise; deserialization has
/// already guaranteed equal lengths.
fn find_unknown_field(raw: &Value, canonical: &Value, prefix: String) -> Option<String> {
    match (raw, canonical) {
        (Value::Object(raw_map), Value::Object(canon_map)) => {
            for (key, raw_child) in raw_map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match canon_map.get(key) {
                    None => return Some(path),
                    Some(canon_child) => {
                        if let Some(found) = find_unknown_field(raw_child, canon_child, path) {
                            return Some(found);
                        }
                    }
                }
            }
            None
        }
        (Value::Array(raw_items), Value::Array(canon_items)) => {
            for (idx, (raw_child, canon_child)) in
                raw_items.iter().zip(canon_items.iter()).enumerate()
            {
                let path = format!("{prefix}[{idx}]");
                if let Some(found) = find_unknown_field(raw_child, canon_child, path) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}
