//! String key-value backends.
//!
//! The slot layer only needs three operations, so hosts can plug in
//! whatever they have (browser local storage, a settings database, a
//! directory on disk). Two backends ship with the crate:
//!
//! - `MemoryStore`: a `HashMap`, with a failure switch for exercising
//!   error paths.
//! - `DirStore`: one file per key under a directory.

use crate::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Minimal string blob storage.
pub trait KeyValueStore {
    /// Value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// ─── In-memory ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    /// Every operation fails.
    Everything,
    /// Writes and removals of this key fail; reads still work.
    WritesTo(String),
}

/// `HashMap`-backed store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    failure: Option<Failure>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `Unavailable`.
    pub fn fail_everything(&mut self) {
        self.failure = Some(Failure::Everything);
    }

    /// Make writes and removals of `key` fail with `Unavailable`.
    pub fn fail_writes_to(&mut self, key: &str) {
        self.failure = Some(Failure::WritesTo(key.to_string()));
    }

    /// Clear any injected failure.
    pub fn heal(&mut self) {
        self.failure = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn check_read(&self) -> Result<(), StorageError> {
        match self.failure {
            Some(Failure::Everything) => Err(StorageError::Unavailable("memory store offline".into())),
            _ => Ok(()),
        }
    }

    fn check_write(&self, key: &str) -> Result<(), StorageError> {
        match &self.failure {
            Some(Failure::Everything) => Err(StorageError::Unavailable("memory store offline".into())),
            Some(Failure::WritesTo(k)) if k == key => {
                Err(StorageError::Unavailable(format!("writes to `{key}` are failing")))
            }
            _ => Ok(()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_read()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_write(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

// ─── Directory ───────────────────────────────────────────────────────────

/// One `<key>.json` file per key under a root directory.
///
/// Keys are percent-encoded into file names: ASCII alphanumerics, `.`,
/// `-` and `_` pass through, every other byte becomes `%XX`. The mapping
/// is injective, so distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("dir store opened at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' | b'_' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
