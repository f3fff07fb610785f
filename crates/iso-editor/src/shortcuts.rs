//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, each of which
//! `Editor::run_shortcut` turns into exactly one scene or history call.
//! The map lives here so every host binds the same keys.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,

    // ── Transform selection ──
    Rotate,
    ScaleUp,
    ScaleDown,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    ToggleGrid,

    // ── UI ──
    Deselect,
}

/// Resolves key events into shortcut actions.
///
/// Platform-aware: on macOS `meta` is ⌘, elsewhere `ctrl` plays that role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, ctrl: bool, shift: bool, _alt: bool, meta: bool) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        if shift {
            return match key {
                "+" => Some(ShortcutAction::ZoomIn),
                _ => None,
            };
        }

        // ── Single keys (no modifiers) ──
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "r" | "R" => Some(ShortcutAction::Rotate),
            "]" => Some(ShortcutAction::ScaleUp),
            "[" => Some(ShortcutAction::ScaleDown),
            "=" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "ArrowLeft" => Some(ShortcutAction::PanLeft),
            "ArrowRight" => Some(ShortcutAction::PanRight),
            "ArrowUp" => Some(ShortcutAction::PanUp),
            "ArrowDown" => Some(ShortcutAction::PanDown),
            "g" | "G" => Some(ShortcutAction::ToggleGrid),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
