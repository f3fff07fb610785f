//! Isogrid rendering support: what to draw, in which order, and where the
//! pointer lands. Pixel output is delegated to a host `Rasterizer`.

pub mod export;
pub mod hit;
pub mod order;

pub use export::{ExportError, ExportGuard, RasterFormat, RasterImage, Rasterizer, RenderSurface};
pub use hit::hit_test;
pub use order::{DrawItem, draw_list};
