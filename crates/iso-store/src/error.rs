use iso_core::SchemaError;
use thiserror::Error;

/// Failures of the key-value backend or the slot index on top of it.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored value for `{key}` is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("no saved scene named `{0}`")]
    SlotNotFound(String),
}

/// Anything that can go wrong moving a scene in or out of storage.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid scene document: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to serialize scene: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(StorageError::Io(err))
    }
}
