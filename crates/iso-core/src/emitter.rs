//! Emitter: scene state → `SceneDocument` / JSON text.
//!
//! Output is deterministic for identical scene state, apart from the
//! document `timestamp`.

use crate::document::SceneDocument;
use crate::model::{Element, GridConfig, SCHEMA_VERSION};
use chrono::Utc;

/// Capture the grid and element collection as a document stamped with the current time.
#[must_use]
pub fn emit_document(grid: &GridConfig, elements: &[Element]) -> SceneDocument {
    SceneDocument {
        version: SCHEMA_VERSION.to_string(),
        timestamp: Utc::now(),
        metadata: (*grid).into(),
        elements: elements.to_vec(),
    }
}

/// Pretty-printed JSON for a document.
pub fn emit_json(doc: &SceneDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}
