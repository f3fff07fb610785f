pub mod config;
pub mod document;
pub mod emitter;
pub mod error;
pub mod id;
pub mod lint;
pub mod model;
pub mod parser;
pub mod transform;

pub use config::EditorConfig;
pub use document::{DocumentMetadata, SceneDocument};
pub use error::{SceneError, SchemaError};
pub use id::ElementId;
pub use lint::{LintDiagnostic, LintSeverity, lint_document};
pub use model::*;
