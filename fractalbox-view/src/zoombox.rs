use fractalbox_core::{PlaneMap, RasterSize, Rectangle};

use crate::error::ViewError;

/// The candidate next zoom target, sized as a percentage of the current view.
///
/// The box follows the pointer continuously and is tracked in both spaces at
/// once: a screen-pixel rectangle for drawing the overlay, and the matching
/// fractal-plane rectangle that a committed zoom adopts. It never modifies
/// the committed view.
#[derive(Debug, Clone, PartialEq)]
pub struct Zoombox {
    raster: RasterSize,
    /// Box width/height as percentages of the raster (and of the mapped
    /// plane rectangle — the two scale together).
    zoom_w: f64,
    zoom_h: f64,
    /// Derived box size in pixels.
    box_w: f64,
    box_h: f64,
    /// Top-left corner of the box on screen, in pixels.
    screen_x: f64,
    screen_y: f64,
    /// The box in fractal-plane coordinates.
    target: Rectangle,
}

impl Zoombox {
    /// Create a box of the given percentage size, aimed at the raster center.
    pub fn new(plane: &PlaneMap, width_pct: f64, height_pct: f64) -> crate::Result<Self> {
        if !(width_pct > 0.0 && width_pct.is_finite() && height_pct > 0.0 && height_pct.is_finite())
        {
            return Err(ViewError::InvalidZoomboxSize {
                width: width_pct,
                height: height_pct,
            });
        }
        let raster = plane.raster();
        let mut zoombox = Self {
            raster,
            zoom_w: width_pct,
            zoom_h: height_pct,
            box_w: 0.0,
            box_h: 0.0,
            screen_x: 0.0,
            screen_y: 0.0,
            target: plane.rect(),
        };
        zoombox.resize_box();
        zoombox.follow_pointer(
            plane,
            raster.width as f64 / 2.0,
            raster.height as f64 / 2.0,
        );
        Ok(zoombox)
    }

    /// Current percentage size as `(width, height)`.
    pub fn zoom_percent(&self) -> (f64, f64) {
        (self.zoom_w, self.zoom_h)
    }

    /// Change the percentage size. Non-positive or non-finite values are
    /// ignored, so repeated shrink steps bottom out instead of inverting
    /// the box.
    pub fn set_zoom_percent(&mut self, width_pct: f64, height_pct: f64) {
        if width_pct > 0.0 && width_pct.is_finite() && height_pct > 0.0 && height_pct.is_finite() {
            self.zoom_w = width_pct;
            self.zoom_h = height_pct;
            self.resize_box();
        }
    }

    /// Re-aim the box at a pointer position (fractional pixels).
    ///
    /// Recomputes the plane-space target centered on the point under the
    /// pointer and the screen-space box centered on the pointer itself.
    pub fn follow_pointer(&mut self, plane: &PlaneMap, px: f64, py: f64) {
        if self.raster != plane.raster() {
            self.raster = plane.raster();
            self.resize_box();
        }
        let center = plane.subpixel_to_plane(px, py);
        let rect = plane.rect();
        self.target = Rectangle::centered(
            center,
            rect.width() * self.zoom_w / 100.0,
            rect.height() * self.zoom_h / 100.0,
        );
        self.screen_x = px - self.box_w / 2.0;
        self.screen_y = py - self.box_h / 2.0;
    }

    /// The candidate zoom rectangle in fractal-plane coordinates.
    pub fn target(&self) -> Rectangle {
        self.target
    }

    /// The on-screen box as `(x, y, width, height)` in pixels.
    pub fn screen_rect(&self) -> (f64, f64, f64, f64) {
        (self.screen_x, self.screen_y, self.box_w, self.box_h)
    }

    fn resize_box(&mut self) {
        self.box_w = self.raster.width as f64 * self.zoom_w / 100.0;
        self.box_h = self.raster.height as f64 * self.zoom_h / 100.0;
    }
}
