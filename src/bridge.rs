//! Bridges: adapter links between two workers.
//!
//! A bridge is the stage-like entity sitting on a graph edge: a total,
//! synchronous, schema-to-schema field mapping with no external effects.
//! [`IdentityBridge`] is the default and connects two workers whose schema
//! types already match; [`FieldMapBridge`] remaps field names for edges where
//! the schemas are compatible but not identical.
//!
//! Compatibility is checked once, at graph construction
//! ([`GraphBuilder::compile`](crate::graphs::GraphBuilder::compile)): an
//! identity bridge between mismatched schema types is a configuration error,
//! not a runtime failure.

use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::schema::SchemaDescriptor;

/// Errors raised by bridge compatibility checks or field mapping.
#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    /// The identity default cannot resolve a structural mismatch.
    #[error("identity bridge cannot connect `{source_schema}` to `{target}`")]
    #[diagnostic(
        code(formweaver::bridge::incompatible),
        help("Connect the nodes with a FieldMapBridge, or align the workers' schema types.")
    )]
    Incompatible {
        source_schema: &'static str,
        target: &'static str,
    },

    /// A mapped source field was absent from the payload.
    #[error("missing source field `{field}` while remapping")]
    #[diagnostic(code(formweaver::bridge::missing_field))]
    MissingField { field: String },

    /// Field remapping needs an object payload.
    #[error("bridge expected an object payload, got {kind}")]
    #[diagnostic(code(formweaver::bridge::not_an_object))]
    NotAnObject { kind: &'static str },
}

/// Schema-to-schema connector between two workers.
///
/// Implementations must be total and synchronous and must perform no
/// external effects. `map` runs once per edge traversal during a run.
pub trait Bridge: Send + Sync + 'static {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Checked at graph construction for every edge this bridge sits on.
    fn compatibility(
        &self,
        source: &SchemaDescriptor,
        target: &SchemaDescriptor,
    ) -> Result<(), BridgeError>;

    /// Maps the source worker's output into the destination worker's input.
    fn map(&self, body: Value) -> Result<Value, BridgeError>;
}

/// The default bridge: output schema fields are read directly from
/// same-named input fields, so the payload passes through untouched.
///
/// Compatible only when both ends declare the same schema type.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityBridge;

impl Bridge for IdentityBridge {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn compatibility(
        &self,
        source: &SchemaDescriptor,
        target: &SchemaDescriptor,
    ) -> Result<(), BridgeError> {
        if source == target {
            Ok(())
        } else {
            Err(BridgeError::Incompatible {
                source: source.name,
                target: target.name,
            })
        }
    }

    fn map(&self, body: Value) -> Result<Value, BridgeError> {
        Ok(body)
    }
}

/// Bridge that renames fields between two compatible-but-not-identical
/// schemas. Fields not named in a mapping pass through unchanged.
///
/// # Examples
///
/// ```rust
/// use formweaver::bridge::{Bridge, FieldMapBridge};
/// use serde_json::json;
///
/// let bridge = FieldMapBridge::new().map_field("requirement", "user_requirement");
/// let out = bridge.map(json!({"requirement": "plan a survey"})).unwrap();
/// assert_eq!(out, json!({"user_requirement": "plan a survey"}));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FieldMapBridge {
    mappings: Vec<(String, String)>,
}

impl FieldMapBridge {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// Adds one source-to-target field rename.
    #[must_use]
    pub fn map_field(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.mappings.push((source.into(), target.into()));
        self
    }
}

impl Bridge for FieldMapBridge {
    fn name(&self) -> &'static str {
        "field_map"
    }

    fn compatibility(
        &self,
        _source: &SchemaDescriptor,
        _target: &SchemaDescriptor,
    ) -> Result<(), BridgeError> {
        // Renames are declared explicitly; the destination worker's input
        // validation is the authority on the mapped shape.
        Ok(())
    }

    fn map(&self, body: Value) -> Result<Value, BridgeError> {
        let Value::Object(mut fields) = body else {
            return Err(BridgeError::NotAnObject {
                kind: value_kind(&body),
            });
        };
        for (source, target) in &self.mappings {
            let value = fields
                .remove(source)
                .ok_or_else(|| BridgeError::MissingField {
                    field: source.clone(),
                })?;
            fields.insert(target.clone(), value);
        }
        Ok(Value::Object(fields))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(name: &'static str) -> SchemaDescriptor {
        SchemaDescriptor { name }
    }

    #[test]
    fn test_identity_compatible_same_schema() {
        let bridge = IdentityBridge;
        assert!(
            bridge
                .compatibility(&descriptor("Design"), &descriptor("Design"))
                .is_ok()
        );
    }

    #[test]
    fn test_identity_rejects_mismatch() {
        let bridge = IdentityBridge;
        let err = bridge
            .compatibility(&descriptor("Design"), &descriptor("Receipt"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Incompatible { .. }));
    }

    #[test]
    fn test_identity_map_is_passthrough() {
        let body = json!({"a": 1, "b": [2, 3]});
        assert_eq!(IdentityBridge.map(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_field_map_preserves_unmapped_fields() {
        let bridge = FieldMapBridge::new().map_field("old", "new");
        let out = bridge.map(json!({"old": 1, "keep": true})).unwrap();
        assert_eq!(out, json!({"new": 1, "keep": true}));
    }

    #[test]
    fn test_field_map_missing_source_field() {
        let bridge = FieldMapBridge::new().map_field("absent", "new");
        let err = bridge.map(json!({"present": 1})).unwrap_err();
        assert!(matches!(err, BridgeError::MissingField { field } if field == "absent"));
    }

    #[test]
    fn test_field_map_rejects_non_object() {
        let bridge = FieldMapBridge::new().map_field("a", "b");
        let err = bridge.map(json!([1, 2])).unwrap_err();
        assert!(matches!(err, BridgeError::NotAnObject { kind: "array" }));
    }
}
