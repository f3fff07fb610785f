//! Scene documents as standalone JSON files.

use crate::error::PersistError;
use iso_core::SceneDocument;
use iso_core::emitter::emit_json;
use iso_core::parser::parse_document;
use std::fs;
use std::path::Path;

/// Read and validate a scene file.
pub fn import_file(path: impl AsRef<Path>) -> Result<SceneDocument, PersistError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let doc = parse_document(&text).inspect_err(|err| {
        log::warn!("rejected {}: {err}", path.display());
    })?;
    log::debug!("imported {} ({} elements)", path.display(), doc.elements.len());
    Ok(doc)
}

/// Write `doc` as pretty-printed JSON.
pub fn export_file(path: impl AsRef<Path>, doc: &SceneDocument) -> Result<(), PersistError> {
    let path = path.as_ref();
    fs::write(path, emit_json(doc)?)?;
    log::debug!("exported {}", path.display());
    Ok(())
}
