//! Isometric coordinate transforms.
//!
//! Pure, stateless math: screen ↔ grid conversion, snapping, depth order,
//! and the pan/zoom view transform. Callers guarantee positive, finite tile
//! sizes; `GridConfig::validate` enforces this before any of these run.
//!
//! The projection is the 2:1 linear map
//!
//! ```text
//! screen_x = (grid_x - grid_y) * tile_width  / 2
//! screen_y = (grid_x + grid_y) * tile_height / 2
//! ```
//!
//! and `screen_to_grid` is its exact inverse, floored to a cell.

use crate::model::{Element, Extent, GridConfig, GridPos, ScreenPoint, ViewState};

/// Fractions closer than this to an integer are treated as that integer.
const FLOOR_EPSILON: f64 = 1e-9;

/// Floor that tolerates round-off: `2.9999999999999996` floors to 3.
///
/// Projected cell anchors divide back to integers only up to rounding, and a
/// plain floor would then land them in the neighbouring cell.
fn stable_floor(v: f64) -> i32 {
    let nearest = v.round();
    let f = if (v - nearest).abs() < FLOOR_EPSILON {
        nearest
    } else {
        v.floor()
    };
    f as i32
}

// ─── Projection ──────────────────────────────────────────────────────────

/// Invert the isometric projection: which cell contains screen point `(sx, sy)`.
pub fn screen_to_grid(sx: f64, sy: f64, tile_width: f64, tile_height: f64) -> GridPos {
    let a = sx / (tile_width / 2.0);
    let b = sy / (tile_height / 2.0);
    GridPos {
        x: stable_floor((a + b) / 2.0),
        y: stable_floor((b - a) / 2.0),
    }
}

/// Forward isometric projection of a cell to its screen anchor.
pub fn grid_to_screen(gx: i32, gy: i32, tile_width: f64, tile_height: f64) -> ScreenPoint {
    let (gx, gy) = (gx as f64, gy as f64);
    ScreenPoint {
        x: (gx - gy) * tile_width / 2.0,
        y: (gx + gy) * tile_height / 2.0,
    }
}

/// Snap a screen point to the anchor of the cell containing it. Idempotent.
pub fn snap_to_grid(x: f64, y: f64, tile_width: f64, tile_height: f64) -> ScreenPoint {
    let cell = screen_to_grid(x, y, tile_width, tile_height);
    grid_to_screen(cell.x, cell.y, tile_width, tile_height)
}

/// Back-to-front draw key: lower values are composited first.
pub fn z_order(gx: i32, gy: i32) -> i64 {
    gx as i64 + gy as i64
}

/// Bounding box of the full grid in pixels.
pub fn grid_extent_pixels(
    grid_width: u32,
    grid_height: u32,
    tile_width: f64,
    tile_height: f64,
) -> Extent {
    let cells = grid_width as f64 + grid_height as f64;
    Extent {
        width: cells * tile_width / 2.0,
        height: cells * tile_height / 2.0,
    }
}

// ─── Ordering ────────────────────────────────────────────────────────────

/// Elements in back-to-front order.
///
/// Stable: elements on the same diagonal keep their collection order, so
/// later-placed elements draw over earlier ones.
pub fn draw_order(elements: &[Element]) -> Vec<&Element> {
    let mut ordered: Vec<&Element> = elements.iter().collect();
    ordered.sort_by_key(|el| z_order(el.position.x, el.position.y));
    ordered
}

// ─── View transform & clamping ───────────────────────────────────────────

/// Undo the pan/zoom: screen pixels → unzoomed scene pixels.
pub fn screen_to_view(point: ScreenPoint, view: &ViewState) -> ScreenPoint {
    ScreenPoint {
        x: (point.x - view.offset.x) / view.zoom,
        y: (point.y - view.offset.y) / view.zoom,
    }
}

/// Apply the pan/zoom: unzoomed scene pixels → screen pixels.
pub fn view_to_screen(point: ScreenPoint, view: &ViewState) -> ScreenPoint {
    ScreenPoint {
        x: point.x * view.zoom + view.offset.x,
        y: point.y * view.zoom + view.offset.y,
    }
}

/// The cell under a pointer, accounting for pan/zoom. Not clamped.
pub fn pointer_to_cell(point: ScreenPoint, view: &ViewState, grid: &GridConfig) -> GridPos {
    let adjusted = screen_to_view(point, view);
    screen_to_grid(adjusted.x, adjusted.y, grid.tile_width, grid.tile_height)
}

/// Clamp a cell into `[0, grid_width-1] x [0, grid_height-1]`.
pub fn clamp_to_grid(pos: GridPos, grid: &GridConfig) -> GridPos {
    let max_x = (grid.grid_width.saturating_sub(1)).min(i32::MAX as u32) as i32;
    let max_y = (grid.grid_height.saturating_sub(1)).min(i32::MAX as u32) as i32;
    GridPos {
        x: pos.x.clamp(0, max_x),
        y: pos.y.clamp(0, max_y),
    }
}
