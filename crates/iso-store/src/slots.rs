//! Named scene slots over a `KeyValueStore`.
//!
//! Each slot is two records: the scene blob under `isogrid.scene.<name>`
//! and an entry in the shared index under `isogrid.scenes.index`. Save and
//! delete touch both; if the second write fails the first is rolled back,
//! so the blob set and the index never disagree. A corrupt index is
//! reported by `list` and replaced by the next save.

use crate::error::{PersistError, StorageError};
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use iso_core::SceneDocument;
use iso_core::emitter::emit_json;
use iso_core::parser::parse_document;
use serde::{Deserialize, Serialize};

pub const SLOT_KEY_PREFIX: &str = "isogrid.scene.";
pub const SLOT_INDEX_KEY: &str = "isogrid.scenes.index";

/// One row of the slot index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// Reserved for a thumbnail; always written as `null`.
    #[serde(default)]
    pub preview: Option<String>,
}

pub fn slot_key(name: &str) -> String {
    format!("{SLOT_KEY_PREFIX}{name}")
}

/// Named slots stored in `S`.
#[derive(Debug, Default)]
pub struct SlotStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SlotStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_inner(self) -> S {
        self.backend
    }

    /// Index entries, in the order slots were first saved.
    pub fn list(&self) -> Result<Vec<SlotEntry>, StorageError> {
        let Some(text) = self.backend.get(SLOT_INDEX_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&text).map_err(|e| StorageError::Corrupt {
            key: SLOT_INDEX_KEY.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.list()?.iter().any(|entry| entry.name == name))
    }

    /// Save `doc` under `name`, overwriting any previous slot of that name.
    pub fn save(&mut self, name: &str, doc: &SceneDocument) -> Result<SlotEntry, PersistError> {
        let json = emit_json(doc)?;
        self.save_json(name, &json)
    }

    /// Validate `json` as a scene document and store it verbatim under `name`.
    pub fn import_json(&mut self, name: &str, json: &str) -> Result<SlotEntry, PersistError> {
        parse_document(json)?;
        self.save_json(name, json)
    }

    fn save_json(&mut self, name: &str, json: &str) -> Result<SlotEntry, PersistError> {
        let key = slot_key(name);
        let mut index = match self.list() {
            Ok(index) => index,
            Err(StorageError::Corrupt { reason, .. }) => {
                log::warn!("slot index unreadable ({reason}), rebuilding it from `{name}`");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };
        let previous = self.backend.get(&key)?;

        self.backend.set(&key, json)?;

        let entry = SlotEntry {
            name: name.to_string(),
            timestamp: Utc::now(),
            preview: None,
        };
        match index.iter_mut().find(|e| e.name == name) {
            Some(existing) => *existing = entry.clone(),
            None => index.push(entry.clone()),
        }

        if let Err(err) = self.write_index(&index) {
            log::warn!("slot `{name}`: index write failed, rolling back blob");
            self.restore(&key, previous.as_deref());
            return Err(err.into());
        }
        log::debug!("slot `{name}` saved ({} bytes)", json.len());
        Ok(entry)
    }

    /// Read and validate the document stored under `name`.
    pub fn load(&self, name: &str) -> Result<SceneDocument, PersistError> {
        let json = self
            .backend
            .get(&slot_key(name))?
            .ok_or_else(|| StorageError::SlotNotFound(name.to_string()))?;
        let doc = parse_document(&json)?;
        log::debug!("slot `{name}` loaded: {} elements", doc.elements.len());
        Ok(doc)
    }

    /// Raw JSON stored under `name`.
    pub fn load_json(&self, name: &str) -> Result<String, StorageError> {
        self.backend
            .get(&slot_key(name))?
            .ok_or_else(|| StorageError::SlotNotFound(name.to_string()))
    }

    /// Remove the blob and its index entry.
    pub fn delete(&mut self, name: &str) -> Result<(), StorageError> {
        let key = slot_key(name);
        let mut index = self.list()?;
        let before = index.len();
        index.retain(|e| e.name != name);
        let previous = self.backend.get(&key)?;
        if previous.is_none() && index.len() == before {
            return Err(StorageError::SlotNotFound(name.to_string()));
        }

        self.backend.remove(&key)?;
        if let Err(err) = self.write_index(&index) {
            log::warn!("slot `{name}`: index write failed, restoring blob");
            self.restore(&key, previous.as_deref());
            return Err(err);
        }
        log::debug!("slot `{name}` deleted");
        Ok(())
    }

    fn write_index(&mut self, index: &[SlotEntry]) -> Result<(), StorageError> {
        let text = serde_json::to_string(index).map_err(|e| StorageError::Corrupt {
            key: SLOT_INDEX_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.backend.set(SLOT_INDEX_KEY, &text)
    }

    /// Best-effort: put `key` back to `previous`.
    fn restore(&mut self, key: &str, previous: Option<&str>) {
        let outcome = match previous {
            Some(value) => self.backend.set(key, value),
            None => self.backend.remove(key),
        };
        if let Err(err) = outcome {
            log::warn!("rollback of `{key}` failed: {err}");
        }
    }
}
