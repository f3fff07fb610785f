//! Placement/drag resolver.
//!
//! Turns a pointer gesture spanning several events into at most one
//! `SceneMutation` per event. The resolver only reads the view and grid;
//! it never touches the scene, so an aborted gesture cannot leave a
//! partial edit behind.
//!
//! | State              | Event                | Result                                  |
//! |--------------------|----------------------|-----------------------------------------|
//! | any                | grab palette/element/canvas | previous gesture dropped, new state |
//! | `Panning`          | move                 | `SetViewOffset`                         |
//! | `Dragging*`        | move                 | hover cell updated                      |
//! | `DraggingNew`      | release on surface   | `AddElement` at clamped cell            |
//! | `DraggingExisting` | release on surface   | `MoveElement` to clamped cell           |
//! | any                | release elsewhere / cancel | back to `Idle`, no mutation       |

use crate::scene::SceneMutation;
use iso_core::id::ElementId;
use iso_core::model::{ElementKind, GridConfig, GridPos, ScreenPoint, ViewState};
use iso_core::transform::{clamp_to_grid, pointer_to_cell};

/// Where a pointer was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Over the grid canvas.
    Surface,
    /// Anywhere else (palette, chrome, outside the window).
    Outside,
}

/// Gesture steps fed to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Pick up a new element from the palette.
    GrabPalette(ElementKind),
    /// Pick up a placed element.
    GrabElement(ElementId),
    /// Start panning: pointer position and view offset at grab time.
    GrabCanvas { pointer: ScreenPoint, offset: ScreenPoint },
    Move(ScreenPoint),
    Release(ScreenPoint, DropTarget),
    Cancel,
}

/// Resolver state between gesture events.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    DraggingNew {
        kind: ElementKind,
    },
    DraggingExisting {
        id: ElementId,
    },
    Panning {
        start_pointer: ScreenPoint,
        start_offset: ScreenPoint,
    },
}

#[derive(Debug, Default)]
pub struct DragResolver {
    state: DragState,
    /// Clamped cell under the pointer while dragging an element.
    hover: Option<GridPos>,
}

impl DragResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// Preview cell for the element being dragged.
    pub fn hover_cell(&self) -> Option<GridPos> {
        self.hover
    }

    /// Cell a release at `point` resolves to: undo pan/zoom, project, clamp.
    pub fn release_cell(point: ScreenPoint, view: &ViewState, grid: &GridConfig) -> GridPos {
        clamp_to_grid(pointer_to_cell(point, view, grid), grid)
    }

    /// Advance the state machine by one event.
    pub fn handle(&mut self, gesture: Gesture, view: &ViewState, grid: &GridConfig) -> Option<SceneMutation> {
        log::trace!("drag: {:?} <- {gesture:?}", self.state);
        match gesture {
            Gesture::GrabPalette(kind) => {
                self.start(DragState::DraggingNew { kind });
                None
            }
            Gesture::GrabElement(id) => {
                self.start(DragState::DraggingExisting { id });
                None
            }
            Gesture::GrabCanvas { pointer, offset } => {
                self.start(DragState::Panning {
                    start_pointer: pointer,
                    start_offset: offset,
                });
                None
            }
            Gesture::Move(point) => match &self.state {
                DragState::Panning {
                    start_pointer,
                    start_offset,
                } => Some(SceneMutation::SetViewOffset {
                    offset: *start_offset + (point - *start_pointer),
                }),
                DragState::DraggingNew { .. } | DragState::DraggingExisting { .. } => {
                    self.hover = Some(Self::release_cell(point, view, grid));
                    None
                }
                DragState::Idle => None,
            },
            Gesture::Release(point, target) => {
                let state = self.finish();
                if target == DropTarget::Outside {
                    if !matches!(state, DragState::Idle | DragState::Panning { .. }) {
                        log::debug!("drag dropped outside the canvas; aborted");
                    }
                    return None;
                }
                let position = Self::release_cell(point, view, grid);
                match state {
                    DragState::DraggingNew { kind } => Some(SceneMutation::AddElement { kind, position }),
                    DragState::DraggingExisting { id } => Some(SceneMutation::MoveElement { id, position }),
                    DragState::Panning { .. } | DragState::Idle => None,
                }
            }
            Gesture::Cancel => {
                self.finish();
                None
            }
        }
    }

    fn start(&mut self, next: DragState) {
        if !self.is_idle() {
            log::debug!("drag: {:?} superseded by a new gesture", self.state);
        }
        self.state = next;
        self.hover = None;
    }

    fn finish(&mut self) -> DragState {
        self.hover = None;
        std::mem::take(&mut self.state)
    }
}
