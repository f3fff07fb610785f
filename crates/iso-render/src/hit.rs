//! Hit testing: pointer → element lookup.
//!
//! Each element occupies exactly one cell. The pointer is mapped to a cell
//! through the same pan/zoom transform the drag resolver uses, and the
//! topmost element on that cell wins: the one drawn last.
//!
//! Pointer coordinates are relative to the view origin; a host that draws
//! the grid shifted by `order::surface_origin` folds that shift into the
//! view offset.

use iso_core::id::ElementId;
use iso_core::model::{Element, GridConfig, GridPos, ScreenPoint, ViewState};
use iso_core::transform::{draw_order, pointer_to_cell};

/// Find the topmost element under the pointer.
/// Returns `None` if the pointer is over an empty cell.
pub fn hit_test(
    elements: &[Element],
    point: ScreenPoint,
    view: &ViewState,
    grid: &GridConfig,
) -> Option<ElementId> {
    let cell = pointer_to_cell(point, view, grid);
    topmost_at(elements, cell)
}

/// Topmost element on `cell`, in draw order. Out-of-grid cells are fine.
pub fn topmost_at(elements: &[Element], cell: GridPos) -> Option<ElementId> {
    draw_order(elements)
        .into_iter()
        .rev()
        .find(|el| el.position == cell)
        .map(|el| el.id)
}
