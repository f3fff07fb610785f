//! Isogrid editor engine.
//!
//! `SceneModel` owns scene state and history, `DragResolver` turns pointer
//! gestures into `SceneMutation`s, `ShortcutMap` binds keys to actions, and
//! `Editor` ties them together with slot storage and raster export.

pub mod drag;
pub mod editor;
pub mod history;
pub mod input;
pub mod scene;
pub mod shortcuts;

pub use drag::{DragResolver, DragState, DropTarget, Gesture};
pub use editor::Editor;
pub use history::History;
pub use input::{InputEvent, Modifiers};
pub use scene::{SceneModel, SceneMutation};
pub use shortcuts::{ShortcutAction, ShortcutMap};
