//! Parser: JSON text → validated `SceneDocument`.
//!
//! Validation happens in two passes. `validate` checks the untyped shape
//! (root object, `elements` array, supported version) so that callers get a
//! precise error for the common failure modes; the typed decode then checks
//! every element, after which grid metadata, element scale and id uniqueness
//! are verified.

use crate::document::SceneDocument;
use crate::error::SchemaError;
use crate::model::{SCHEMA_VERSION, validate_scale};
use serde_json::Value;
use std::collections::HashSet;

/// Major schema version this build understands.
const SUPPORTED_MAJOR: &str = "1";

/// The document's declared version, or `"1.0.0"` when absent.
pub fn document_version(value: &Value) -> Result<&str, SchemaError> {
    match value.get("version") {
        None | Some(Value::Null) => Ok(SCHEMA_VERSION),
        Some(Value::String(v)) => Ok(v.as_str()),
        Some(other) => Err(SchemaError::Malformed(format!(
            "`version` must be a string, got {other}"
        ))),
    }
}

/// Check the untyped shape of a scene document.
pub fn validate(value: &Value) -> Result<(), SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
    match obj.get("elements") {
        None => return Err(SchemaError::MissingElements),
        Some(Value::Array(_)) => {}
        Some(_) => return Err(SchemaError::ElementsNotArray),
    }

    let version = document_version(value)?;
    let major = version.split('.').next().unwrap_or_default();
    if major != SUPPORTED_MAJOR {
        return Err(SchemaError::UnsupportedVersion(version.to_string()));
    }
    Ok(())
}

/// Boolean form of `validate`.
pub fn is_valid(value: &Value) -> bool {
    validate(value).is_ok()
}

/// Validate and decode an already-parsed JSON value.
pub fn parse_value(value: Value) -> Result<SceneDocument, SchemaError> {
    validate(&value)?;
    let doc: SceneDocument =
        serde_json::from_value(value).map_err(|e| SchemaError::Malformed(e.to_string()))?;

    doc.metadata.grid_config()?;

    let mut seen = HashSet::with_capacity(doc.elements.len());
    for el in &doc.elements {
        if !seen.insert(el.id) {
            return Err(SchemaError::DuplicateId(el.id));
        }
        validate_scale(el.scale).map_err(|e| SchemaError::Malformed(format!("element `{}`: {e}", el.id)))?;
    }

    log::debug!(
        "parsed scene document v{} with {} elements",
        doc.version,
        doc.elements.len()
    );
    Ok(doc)
}

/// Parse and validate a scene document from JSON text.
pub fn parse_document(text: &str) -> Result<SceneDocument, SchemaError> {
    let value: Value = serde_json::from_str(text)?;
    parse_value(value)
}
