//! Isogrid persistence: key-value blob stores, named scene slots, and
//! JSON file import/export.
//!
//! Nothing here touches a live scene. Callers hand in a `SceneDocument`
//! to save and receive a fully validated one back on load, so a failed
//! operation can never leave an editor half-updated.

pub mod error;
pub mod io;
pub mod slots;
pub mod store;

pub use error::{PersistError, StorageError};
pub use io::{export_file, import_file};
pub use slots::{SlotEntry, SlotStore};
pub use store::{DirStore, KeyValueStore, MemoryStore};
