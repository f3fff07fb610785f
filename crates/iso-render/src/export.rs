//! Raster export through an external rasterizer.
//!
//! Rasterization is a host capability (a canvas, an offscreen GPU target,
//! an image encoder). The core hands it a `RenderSurface` (the z-ordered
//! draw list plus surface size) and a target format, and guards the
//! in-flight state so two exports never overlap.
//!
//! Export is begin/finish shaped so an asynchronous host can hold the
//! `ExportTicket` across event-loop turns; `ExportGuard::run` is the
//! synchronous convenience.

use crate::order::{DrawItem, draw_list, surface_extent};
use iso_core::model::{Element, Extent, GridConfig};
use thiserror::Error;

/// Supported raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Errors from raster export.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    InFlight,

    #[error("{format:?} rasterization failed: {reason}")]
    Rasterizer { format: RasterFormat, reason: String },
}

/// Everything a rasterizer needs to draw the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSurface {
    pub extent: Extent,
    pub grid: GridConfig,
    pub show_grid: bool,
    pub items: Vec<DrawItem>,
}

impl RenderSurface {
    /// Snapshot the scene into a full-grid surface.
    pub fn capture(elements: &[Element], grid: &GridConfig, show_grid: bool) -> Self {
        Self {
            extent: surface_extent(grid),
            grid: *grid,
            show_grid,
            items: draw_list(elements, grid),
        }
    }
}

/// Host-provided rasterization capability.
pub trait Rasterizer {
    /// Encode `surface` as `format`. The error string is shown to the user.
    fn rasterize(&mut self, surface: &RenderSurface, format: RasterFormat) -> Result<Vec<u8>, String>;
}

/// An encoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub format: RasterFormat,
    pub bytes: Vec<u8>,
}

/// Proof that an export was started. Consumed by `finish` or `abandon`.
#[derive(Debug)]
#[must_use = "an unfinished ticket keeps the export guard busy"]
pub struct ExportTicket {
    format: RasterFormat,
}

impl ExportTicket {
    pub fn format(&self) -> RasterFormat {
        self.format
    }
}

/// In-flight flag serializing exports.
#[derive(Debug, Default)]
pub struct ExportGuard {
    in_flight: bool,
}

impl ExportGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Start an export, or fail with `InFlight` if one is running.
    pub fn begin(&mut self, format: RasterFormat) -> Result<ExportTicket, ExportError> {
        if self.in_flight {
            log::warn!("{format:?} export rejected: another export is in flight");
            return Err(ExportError::InFlight);
        }
        self.in_flight = true;
        log::debug!("{format:?} export started");
        Ok(ExportTicket { format })
    }

    /// Complete an export with the rasterizer's outcome. Always clears the flag.
    pub fn finish(
        &mut self,
        ticket: ExportTicket,
        outcome: Result<Vec<u8>, String>,
    ) -> Result<RasterImage, ExportError> {
        self.in_flight = false;
        let format = ticket.format;
        match outcome {
            Ok(bytes) => {
                log::debug!("{format:?} export finished: {} bytes", bytes.len());
                Ok(RasterImage { format, bytes })
            }
            Err(reason) => {
                log::warn!("{format:?} export failed: {reason}");
                Err(ExportError::Rasterizer { format, reason })
            }
        }
    }

    /// Drop an export without a result (e.g. the host cancelled it).
    pub fn abandon(&mut self, ticket: ExportTicket) {
        log::debug!("{:?} export abandoned", ticket.format);
        self.in_flight = false;
    }

    /// Begin, rasterize synchronously, finish.
    pub fn run(
        &mut self,
        rasterizer: &mut dyn Rasterizer,
        surface: &RenderSurface,
        format: RasterFormat,
    ) -> Result<RasterImage, ExportError> {
        let ticket = self.begin(format)?;
        let outcome = rasterizer.rasterize(surface, format);
        self.finish(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_core::id::ElementId;
    use iso_core::model::{ElementKind, GridPos};

    struct CountingRasterizer {
        calls: usize,
        fail: bool,
    }

    impl Rasterizer for CountingRasterizer {
        fn rasterize(&mut self, surface: &RenderSurface, format: RasterFormat) -> Result<Vec<u8>, String> {
            self.calls += 1;
            if self.fail {
                return Err("surface lost".to_string());
            }
            Ok(format!("{}:{}", format.extension(), surface.items.len()).into_bytes())
        }
    }

    fn surface() -> RenderSurface {
        let elements = vec![Element::new(
            ElementId::intern("export_rock"),
            ElementKind::Rock {},
            GridPos::new(1, 1),
        )];
        RenderSurface::capture(&elements, &GridConfig::default(), true)
    }

    #[test]
    fn run_produces_image_and_clears_flag() {
        let mut guard = ExportGuard::new();
        let mut raster = CountingRasterizer { calls: 0, fail: false };
        let image = guard.run(&mut raster, &surface(), RasterFormat::Png).unwrap();
        assert_eq!(image.bytes, b"png:1".to_vec());
        assert!(!guard.is_busy());
    }

    #[test]
    fn overlapping_export_is_rejected() {
        let mut guard = ExportGuard::new();
        let ticket = guard.begin(RasterFormat::Jpeg).unwrap();
        assert!(guard.is_busy());

        let mut raster = CountingRasterizer { calls: 0, fail: false };
        assert_eq!(
            guard.run(&mut raster, &surface(), RasterFormat::Png),
            Err(ExportError::InFlight)
        );
        assert_eq!(raster.calls, 0, "rasterizer must not run while busy");

        guard.abandon(ticket);
        assert!(!guard.is_busy());
    }

    #[test]
    fn failure_clears_flag_and_reports_format() {
        let mut guard = ExportGuard::new();
        let mut raster = CountingRasterizer { calls: 0, fail: true };
        let err = guard.run(&mut raster, &surface(), RasterFormat::Jpeg).unwrap_err();
        assert_eq!(
            err,
            ExportError::Rasterizer {
                format: RasterFormat::Jpeg,
                reason: "surface lost".to_string()
            }
        );
        assert!(!guard.is_busy());
    }
}
