//! Error types shared by the scene model and the document schema.

use crate::id::ElementId;
use thiserror::Error;

/// Errors raised by scene mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("no element with id `{0}`")]
    NotFound(ElementId),

    #[error("invalid grid configuration: {0}")]
    InvalidGrid(&'static str),

    #[error("invalid scale {0}: must be finite and greater than zero")]
    InvalidScale(f64),
}

/// Errors raised while validating or decoding a persisted scene document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("scene document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scene document must be a JSON object")]
    NotAnObject,

    #[error("scene document has no `elements` field")]
    MissingElements,

    #[error("`elements` must be an array")]
    ElementsNotArray,

    #[error("unsupported scene version `{0}`")]
    UnsupportedVersion(String),

    #[error("malformed scene document: {0}")]
    Malformed(String),

    #[error("invalid grid metadata: {0}")]
    InvalidGrid(&'static str),

    #[error("duplicate element id `{0}`")]
    DuplicateId(ElementId),
}
