use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;

/// An axis-aligned rectangle in the fractal plane.
///
/// `(x1, y1)` is the top-left corner (minimum real part, maximum imaginary
/// part) and `(x2, y2)` the bottom-right. The imaginary axis grows upward,
/// so `y1 > y2` for any rectangle a [`PlaneMap`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a rectangle of the given extent around a center point.
    pub fn centered(center: Complex, width: f64, height: f64) -> Self {
        Self {
            x1: center.re - width / 2.0,
            y1: center.im + height / 2.0,
            x2: center.re + width / 2.0,
            y2: center.im - height / 2.0,
        }
    }

    /// Extent along the real axis.
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    /// Extent along the imaginary axis.
    pub fn height(&self) -> f64 {
        (self.y1 - self.y2).abs()
    }

    pub fn center(&self) -> Complex {
        Complex::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Aspect ratio width / height.
    pub fn ratio_wh(&self) -> f64 {
        self.width() / self.height()
    }

    /// Aspect ratio height / width.
    pub fn ratio_hw(&self) -> f64 {
        self.height() / self.width()
    }
}

/// Pixel dimensions of a target raster.
///
/// A zero dimension is representable (a zero-pixel field is a legal no-op
/// draw target) but is rejected by [`PlaneMap`], which has to divide by both
/// extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl RasterSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Aspect ratio width / height.
    pub fn ratio_wh(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Bidirectional mapping between a plane [`Rectangle`] and a pixel raster.
///
/// Each raster-producing view (main, preview, export) owns its own instance.
/// The per-pixel step sizes are cached and recomputed whenever either input
/// changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMap {
    rect: Rectangle,
    raster: RasterSize,
    pixel_size_x: f64,
    pixel_size_y: f64,
}

fn validate_rect(rect: &Rectangle) -> crate::Result<()> {
    let finite =
        rect.x1.is_finite() && rect.y1.is_finite() && rect.x2.is_finite() && rect.y2.is_finite();
    if !finite {
        return Err(CoreError::InvalidRectangle {
            reason: format!(
                "bounds must be finite, got ({}, {})..({}, {})",
                rect.x1, rect.y1, rect.x2, rect.y2
            ),
        });
    }
    // Strict ordering keeps the mapping a bijection; a flipped rectangle
    // would silently mirror the image, a zero-size one would divide by zero.
    if rect.x1 >= rect.x2 || rect.y2 >= rect.y1 {
        return Err(CoreError::InvalidRectangle {
            reason: format!(
                "expected x1 < x2 and y2 < y1, got ({}, {})..({}, {})",
                rect.x1, rect.y1, rect.x2, rect.y2
            ),
        });
    }
    Ok(())
}

impl PlaneMap {
    pub fn new(rect: Rectangle, raster: RasterSize) -> crate::Result<Self> {
        validate_rect(&rect)?;
        if raster.is_empty() {
            return Err(CoreError::InvalidRasterSize {
                width: raster.width,
                height: raster.height,
            });
        }
        Ok(Self {
            rect,
            raster,
            pixel_size_x: rect.width() / raster.width as f64,
            pixel_size_y: rect.height() / raster.height as f64,
        })
    }

    /// Derive a rectangle centered on `center` whose aspect ratio matches the
    /// raster, so the visible plane extent never distorts with the raster.
    ///
    /// `plane_height` is the desired extent along the imaginary axis; the
    /// width follows from the raster's width/height ratio.
    pub fn aspect_fit(
        center: Complex,
        plane_height: f64,
        raster: RasterSize,
    ) -> crate::Result<Rectangle> {
        if raster.is_empty() {
            return Err(CoreError::InvalidRasterSize {
                width: raster.width,
                height: raster.height,
            });
        }
        if plane_height <= 0.0 || !plane_height.is_finite() {
            return Err(CoreError::InvalidRectangle {
                reason: format!("plane height must be positive and finite, got {plane_height}"),
            });
        }
        let width = plane_height * raster.ratio_wh();
        Ok(Rectangle::centered(center, width, plane_height))
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    pub fn raster(&self) -> RasterSize {
        self.raster
    }

    /// Plane units covered by one pixel along the real axis.
    pub fn pixel_size_x(&self) -> f64 {
        self.pixel_size_x
    }

    /// Plane units covered by one pixel along the imaginary axis.
    pub fn pixel_size_y(&self) -> f64 {
        self.pixel_size_y
    }

    /// Replace the mapped rectangle, keeping the raster.
    pub fn update_rectangle(&mut self, rect: Rectangle) -> crate::Result<()> {
        validate_rect(&rect)?;
        self.rect = rect;
        self.pixel_size_x = rect.width() / self.raster.width as f64;
        self.pixel_size_y = rect.height() / self.raster.height as f64;
        debug!(
            pixel_size_x = self.pixel_size_x,
            pixel_size_y = self.pixel_size_y,
            "plane rectangle updated"
        );
        Ok(())
    }

    /// Replace the raster, keeping the logical rectangle.
    pub fn update_raster_size(&mut self, raster: RasterSize) -> crate::Result<()> {
        if raster.is_empty() {
            return Err(CoreError::InvalidRasterSize {
                width: raster.width,
                height: raster.height,
            });
        }
        self.raster = raster;
        self.pixel_size_x = self.rect.width() / raster.width as f64;
        self.pixel_size_y = self.rect.height() / raster.height as f64;
        Ok(())
    }

    /// Real part of the plane point under pixel column `px`.
    #[inline]
    pub fn to_plane_x(&self, px: u32) -> f64 {
        self.rect.x1 + px as f64 * self.pixel_size_x
    }

    /// Imaginary part of the plane point under pixel row `py`.
    ///
    /// Pixel y grows downward while the imaginary axis grows upward, so the
    /// row index is subtracted from the top edge.
    #[inline]
    pub fn to_plane_y(&self, py: u32) -> f64 {
        self.rect.y1 - py as f64 * self.pixel_size_y
    }

    /// Map a pixel coordinate to its plane point.
    #[inline]
    pub fn to_plane(&self, px: u32, py: u32) -> Complex {
        Complex::new(self.to_plane_x(px), self.to_plane_y(py))
    }

    /// Like [`to_plane`](Self::to_plane) but for fractional pixel positions
    /// (pointer coordinates).
    #[inline]
    pub fn subpixel_to_plane(&self, fx: f64, fy: f64) -> Complex {
        Complex::new(
            self.rect.x1 + fx * self.pixel_size_x,
            self.rect.y1 - fy * self.pixel_size_y,
        )
    }

    /// Fractional pixel column of a real coordinate. Inverse of
    /// [`to_plane_x`](Self::to_plane_x) up to floating-point rounding.
    #[inline]
    pub fn to_pixel_x(&self, re: f64) -> f64 {
        (re - self.rect.x1) / self.pixel_size_x
    }

    /// Fractional pixel row of an imaginary coordinate. Inverse of
    /// [`to_plane_y`](Self::to_plane_y) up to floating-point rounding.
    #[inline]
    pub fn to_pixel_y(&self, im: f64) -> f64 {
        (self.rect.y1 - im) / self.pixel_size_y
    }
}
