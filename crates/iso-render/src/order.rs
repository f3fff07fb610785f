//! Elements → back-to-front draw list.
//!
//! The renderer itself is external; this module decides *what* is drawn
//! *where* and in which order. Items are sorted by `z_order` with ties kept
//! in collection order, and anchors are shifted by `surface_origin` so the
//! whole grid lies in positive surface coordinates.

use iso_core::id::ElementId;
use iso_core::model::{Element, ElementType, Extent, GridConfig, GridPos, Rotation, ScreenPoint};
use iso_core::transform::{draw_order, grid_extent_pixels, grid_to_screen, z_order};

/// One element, ready to composite.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: ElementId,
    pub element_type: ElementType,
    pub cell: GridPos,
    /// Cell anchor in surface pixels (origin-shifted, unzoomed).
    pub anchor: ScreenPoint,
    pub z: i64,
    pub rotation: Rotation,
    pub scale: f64,
    /// False for elements left outside the grid (e.g. by duplication).
    pub in_bounds: bool,
}

/// Offset that moves the leftmost grid corner to `x = 0`.
///
/// Cell `(0, grid_height)` projects furthest left, at
/// `-grid_height * tile_width / 2`.
pub fn surface_origin(grid: &GridConfig) -> ScreenPoint {
    ScreenPoint::new(grid.grid_height as f64 * grid.tile_width / 2.0, 0.0)
}

/// Pixel size of a surface holding the full grid.
pub fn surface_extent(grid: &GridConfig) -> Extent {
    grid_extent_pixels(
        grid.grid_width,
        grid.grid_height,
        grid.tile_width,
        grid.tile_height,
    )
}

/// Build the back-to-front draw list for a scene.
pub fn draw_list(elements: &[Element], grid: &GridConfig) -> Vec<DrawItem> {
    let origin = surface_origin(grid);
    let items: Vec<DrawItem> = draw_order(elements)
        .into_iter()
        .map(|el| {
            let projected = grid_to_screen(
                el.position.x,
                el.position.y,
                grid.tile_width,
                grid.tile_height,
            );
            DrawItem {
                id: el.id,
                element_type: el.element_type(),
                cell: el.position,
                anchor: projected + origin,
                z: z_order(el.position.x, el.position.y),
                rotation: el.rotation,
                scale: el.scale,
                in_bounds: grid.contains(el.position),
            }
        })
        .collect();
    log::trace!("draw list: {} items", items.len());
    items
}
