//! Input abstraction layer.
//!
//! Hosts (a browser canvas, a native window) normalize their pointer and
//! keyboard events into `InputEvent`s, which `Editor::handle_input` turns
//! into gestures and shortcuts. Pointer coordinates are canvas-relative
//! screen pixels, before pan/zoom.

use iso_core::model::ScreenPoint;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    /// Space bar held (hand tool).
    pub space: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
        space: false,
    };

    /// Alt or Space turns a canvas press into a pan.
    pub fn pans(&self) -> bool {
        self.alt || self.space
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed on the canvas.
    PointerDown { x: f64, y: f64, modifiers: Modifiers },

    PointerMove { x: f64, y: f64 },

    /// Pointer released. `over_canvas` is false when released over the
    /// palette, other chrome, or outside the window.
    PointerUp { x: f64, y: f64, over_canvas: bool },

    /// The host lost the pointer (blur, touch cancel).
    PointerCancel,

    /// Wheel / pinch zoom. `zoom` is a factor (1.0 = no change; >1 = zoom in).
    Scroll { zoom: f64 },

    /// Keyboard shortcut. `key` is the `KeyboardEvent.key` value.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y } | Self::PointerUp { x, y, .. } => {
                Some(ScreenPoint::new(*x, *y))
            }
            _ => None,
        }
    }
}
