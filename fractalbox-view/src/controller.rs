use tracing::{debug, info};

use fractalbox_core::{
    Complex, EvalParams, Family, IterationOutcome, PlaneMap, RasterSize, Rectangle,
};
use fractalbox_render::{
    colorize, compute, compute_with_progress, DrawStats, ExportMetadata, IterationField, Palette,
    PaletteCollection, PaletteSetSnapshot, RgbaBuffer, HSL_PALETTE,
};

use crate::error::ViewError;
use crate::history::{History, SaveHook};
use crate::snapshot::ViewSnapshot;
use crate::zoombox::Zoombox;

/// Default zoombox edge length as a percentage of the view.
pub const DEFAULT_ZOOM_PERCENT: f64 = 5.0;
/// Plane height of the home view: 4 units shows the full Mandelbrot set
/// (and any Julia set) with margin.
pub const HOME_PLANE_HEIGHT: f64 = 4.0;

/// One raster-producing view: a plane mapping plus the iteration data
/// computed under it. Main, preview, and export each own an independent
/// instance, so there is no cross-view contention.
#[derive(Debug)]
pub struct ViewContext {
    plane: PlaneMap,
    field: IterationField,
}

impl ViewContext {
    pub fn new(rect: Rectangle, raster: RasterSize) -> crate::Result<Self> {
        Ok(Self {
            plane: PlaneMap::new(rect, raster)?,
            field: IterationField::new(raster),
        })
    }

    pub fn plane(&self) -> &PlaneMap {
        &self.plane
    }

    pub fn field(&self) -> &IterationField {
        &self.field
    }

    pub fn rect(&self) -> Rectangle {
        self.plane.rect()
    }

    fn set_rect(&mut self, rect: Rectangle) -> crate::Result<()> {
        self.plane.update_rectangle(rect)?;
        Ok(())
    }

    fn resize(&mut self, raster: RasterSize) -> crate::Result<()> {
        self.plane.update_raster_size(raster)?;
        self.field.resize(raster);
        Ok(())
    }

    fn compute(&mut self, family: &Family, params: &EvalParams) -> crate::Result<DrawStats> {
        Ok(compute(family, params, &self.plane, &mut self.field)?)
    }

    fn colorize(&self, palette: &Palette) -> crate::Result<RgbaBuffer> {
        Ok(colorize(&self.field, palette)?)
    }
}

/// Result of probing a single point for cursor-follow display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointProbe {
    /// The plane point under the probed pixel.
    pub point: Complex,
    pub outcome: IterationOutcome,
}

/// The explicit context object tying the whole pipeline together: main and
/// preview views, palettes, evaluator configuration, zoombox, pointer, and
/// the lockstep pair of history stacks.
///
/// Everything the original UI driver kept in window-global state lives here,
/// so hosts can run several independent controllers side by side.
#[derive(Debug)]
pub struct ViewController {
    family: Family,
    params: EvalParams,
    main: ViewContext,
    preview: ViewContext,
    palettes: PaletteCollection,
    zoombox: Zoombox,
    zoom_history: History<Rectangle>,
    palette_history: History<PaletteSetSnapshot>,
    /// Last reported pointer position on the main view, in pixels.
    pointer: (f64, f64),
    home: Rectangle,
}

impl ViewController {
    /// Set up a controller showing the home view on both rasters, with the
    /// standard RGB/HSL palette pair and an empty history.
    pub fn new(
        family: Family,
        params: EvalParams,
        main_raster: RasterSize,
        preview_raster: RasterSize,
    ) -> crate::Result<Self> {
        let home = PlaneMap::aspect_fit(Complex::ZERO, HOME_PLANE_HEIGHT, main_raster)?;
        let main = ViewContext::new(home, main_raster)?;
        let preview = ViewContext::new(home, preview_raster)?;
        let zoombox = Zoombox::new(main.plane(), DEFAULT_ZOOM_PERCENT, DEFAULT_ZOOM_PERCENT)?;
        let pointer = (
            main_raster.width as f64 / 2.0,
            main_raster.height as f64 / 2.0,
        );
        Ok(Self {
            family,
            params,
            main,
            preview,
            palettes: PaletteCollection::standard(params.max_iterations),
            zoombox,
            zoom_history: History::new(),
            palette_history: History::new(),
            pointer,
            home,
        })
    }

    // -- accessors --

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn params(&self) -> EvalParams {
        self.params
    }

    pub fn main_rect(&self) -> Rectangle {
        self.main.rect()
    }

    pub fn preview_rect(&self) -> Rectangle {
        self.preview.rect()
    }

    pub fn home_rect(&self) -> Rectangle {
        self.home
    }

    pub fn zoombox(&self) -> &Zoombox {
        &self.zoombox
    }

    /// Read access to the main view's plane and iteration data.
    pub fn main_context(&self) -> &ViewContext {
        &self.main
    }

    /// Read access to the preview view's plane and iteration data.
    pub fn preview_context(&self) -> &ViewContext {
        &self.preview
    }

    pub fn palettes(&self) -> &PaletteCollection {
        &self.palettes
    }

    /// Depth of the zoom history (equal to the palette history by the
    /// lockstep invariant).
    pub fn history_len(&self) -> usize {
        self.zoom_history.len()
    }

    /// Install persistence hooks for both stacks (the host typically mirrors
    /// them to storage).
    pub fn set_history_save_hooks(
        &mut self,
        zoom: SaveHook<Rectangle>,
        palette: SaveHook<PaletteSetSnapshot>,
    ) {
        self.zoom_history.set_save_hook(zoom);
        self.palette_history.set_save_hook(palette);
    }

    // -- rendering --

    /// Full recompute + colorize of the main view.
    pub fn render_main(&mut self) -> crate::Result<RgbaBuffer> {
        self.main.compute(&self.family, &self.params)?;
        self.main.colorize(self.palettes.active())
    }

    /// Full recompute + colorize of the preview view.
    pub fn render_preview(&mut self) -> crate::Result<RgbaBuffer> {
        self.preview.compute(&self.family, &self.params)?;
        self.preview.colorize(self.palettes.active())
    }

    /// Colorize-only redraw of the main view (after palette changes).
    pub fn recolor_main(&self) -> crate::Result<RgbaBuffer> {
        self.main.colorize(self.palettes.active())
    }

    /// Colorize-only redraw of the preview view.
    pub fn recolor_preview(&self) -> crate::Result<RgbaBuffer> {
        self.preview.colorize(self.palettes.active())
    }

    // -- pointer & zoombox --

    /// Track the pointer and re-aim the zoombox under it.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
        self.refresh_zoombox();
    }

    /// Resize the zoombox (wheel/keyboard steps). Non-positive sizes are
    /// ignored, matching [`Zoombox::set_zoom_percent`].
    pub fn set_zoombox_percent(&mut self, width_pct: f64, height_pct: f64) {
        self.zoombox.set_zoom_percent(width_pct, height_pct);
        self.refresh_zoombox();
    }

    /// Aim the preview at the zoombox target (the live-preview flow).
    /// The caller follows up with [`render_preview`](Self::render_preview).
    pub fn focus_preview(&mut self) -> crate::Result<()> {
        self.preview.set_rect(self.zoombox.target())
    }

    // -- zoom & history --

    /// Commit the zoombox target as the new main rectangle.
    ///
    /// The outgoing rectangle and the current palette state are pushed onto
    /// their stacks together — the lockstep discipline the undo path relies
    /// on. The zoombox is then re-aimed inside the new rectangle so a
    /// further zoom is immediately possible.
    pub fn commit_zoom(&mut self) -> crate::Result<()> {
        let previous = self.main.rect();
        let target = self.zoombox.target();
        self.main.set_rect(target)?;

        self.zoom_history.push(previous);
        self.palette_history.push(self.palettes.snapshot());

        self.refresh_zoombox();
        self.preview.set_rect(self.zoombox.target())?;

        info!(
            depth = self.zoom_history.len(),
            width = target.width(),
            "zoom committed"
        );
        Ok(())
    }

    /// Undo the most recent committed zoom, restoring rectangle and palette
    /// state atomically.
    ///
    /// Returns `false` when there is nothing to undo. A desynchronized pair
    /// of stacks means the lockstep invariant was broken and is reported as
    /// an error rather than papered over.
    pub fn undo(&mut self) -> crate::Result<bool> {
        if self.zoom_history.len() != self.palette_history.len() {
            return Err(ViewError::HistoryOutOfSync {
                zoom: self.zoom_history.len(),
                palette: self.palette_history.len(),
            });
        }
        let rect = match self.zoom_history.pop() {
            Some(rect) => rect,
            None => return Ok(false),
        };
        let palettes = match self.palette_history.pop() {
            Some(snapshot) => snapshot,
            None => {
                return Err(ViewError::HistoryOutOfSync {
                    zoom: self.zoom_history.len(),
                    palette: 0,
                })
            }
        };

        self.main.set_rect(rect)?;
        self.preview.set_rect(rect)?;
        self.palettes.restore(&palettes)?;
        self.refresh_zoombox();

        debug!(depth = self.zoom_history.len(), "zoom undone");
        Ok(true)
    }

    /// Return to the home view and drop all history.
    pub fn reset(&mut self) -> crate::Result<()> {
        self.main.set_rect(self.home)?;
        self.preview.set_rect(self.home)?;
        self.zoom_history.clear();
        self.palette_history.clear();
        self.refresh_zoombox();
        Ok(())
    }

    /// Adopt a new main raster size.
    ///
    /// The visible region is re-derived around the current center with the
    /// current plane height, so the image never distorts; stacked history
    /// rectangles carry the old aspect ratio and are dropped.
    pub fn resize_main(&mut self, raster: RasterSize) -> crate::Result<()> {
        let current = self.main.rect();
        let rect = PlaneMap::aspect_fit(current.center(), current.height(), raster)?;
        self.main.resize(raster)?;
        self.main.set_rect(rect)?;
        self.preview.set_rect(rect)?;
        self.zoom_history.clear();
        self.palette_history.clear();
        self.pointer = (raster.width as f64 / 2.0, raster.height as f64 / 2.0);
        self.refresh_zoombox();
        Ok(())
    }

    /// Adopt a new preview raster size (keeps its rectangle and history).
    pub fn resize_preview(&mut self, raster: RasterSize) -> crate::Result<()> {
        self.preview.resize(raster)
    }

    // -- single-point probe --

    /// Evaluate the point under a pointer position for informational
    /// display. Reads no iteration field and writes nothing.
    pub fn probe(&self, x: f64, y: f64) -> PointProbe {
        let point = self.main.plane().subpixel_to_plane(x, y);
        PointProbe {
            point,
            outcome: self.family.evaluate(point, &self.params),
        }
    }

    // -- palette operations (all colorize-only) --

    /// Rotate the active palette. Follow up with
    /// [`recolor_main`](Self::recolor_main) — no recompute needed.
    pub fn set_palette_offset(&mut self, offset: f64) {
        self.palettes.active_mut().set_offset(offset);
    }

    pub fn set_active_palette(&mut self, name: &str) -> crate::Result<()> {
        self.palettes.set_active(name)?;
        Ok(())
    }

    pub fn set_hsl_saturation(&mut self, value: f64) -> crate::Result<()> {
        self.hsl_palette_mut()?.set_saturation(value)?;
        Ok(())
    }

    pub fn set_hsl_lightness(&mut self, value: f64) -> crate::Result<()> {
        self.hsl_palette_mut()?.set_lightness(value)?;
        Ok(())
    }

    fn hsl_palette_mut(&mut self) -> crate::Result<&mut Palette> {
        self.palettes.get_mut(HSL_PALETTE).ok_or_else(|| {
            fractalbox_render::RenderError::UnknownPalette(HSL_PALETTE.to_string()).into()
        })
    }

    /// Register a map palette parsed from Fractint-style `.map` text.
    pub fn add_map_palette(&mut self, name: &str, text: &str) -> crate::Result<()> {
        let palette = Palette::from_map_str(text, self.params.max_iterations)?;
        self.palettes.add(name, palette);
        Ok(())
    }

    // -- configuration --

    /// Change the iteration budget. Palettes are resized to match; the
    /// caller re-renders to refresh iteration data.
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.params = self.params.with_max_iterations(max_iterations);
        self.palettes.set_max_iterations(max_iterations);
    }

    /// Switch between Mandelbrot and Julia (or change the Julia constant).
    /// The caller re-renders to refresh iteration data.
    pub fn set_family(&mut self, family: Family) {
        self.family = family;
    }

    // -- export --

    /// Render the committed rectangle at an arbitrary width for export.
    ///
    /// The height follows from the rectangle's aspect ratio. This is the one
    /// long-running blocking call in the system; `progress` is invoked per
    /// row, purely observationally. The returned buffer is the caller's —
    /// write it with [`fractalbox_render::export_png`] or elsewhere.
    pub fn export(
        &self,
        width: u32,
        progress: &mut dyn FnMut(u32, u32),
    ) -> crate::Result<RgbaBuffer> {
        let rect = self.main.rect();
        let height = (width as f64 * rect.ratio_hw()).round().max(1.0) as u32;
        let raster = RasterSize::new(width, height);
        let plane = PlaneMap::new(rect, raster)?;
        let mut field = IterationField::new(raster);
        compute_with_progress(&self.family, &self.params, &plane, &mut field, progress)?;
        let buffer = colorize(&field, self.palettes.active())?;
        info!(width, height, "export render complete");
        Ok(buffer)
    }

    /// Metadata describing the current view, for embedding in exports.
    pub fn export_metadata(&self) -> ExportMetadata {
        ExportMetadata {
            family: self.family.name().to_string(),
            rect: self.main.rect(),
            max_iterations: self.params.max_iterations,
            palette_name: self.palettes.active_name().to_string(),
            julia_c: match self.family {
                Family::Julia { c } => Some(c),
                Family::Mandelbrot => None,
            },
        }
    }

    // -- persistence --

    /// Snapshot the committed rectangle and the full palette collection.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            rect: self.main.rect(),
            palettes: self.palettes.snapshot(),
        }
    }

    /// Restore a snapshot produced by [`snapshot`](Self::snapshot) (possibly
    /// in an earlier session). History is untouched; the caller re-renders.
    pub fn restore(&mut self, snapshot: &ViewSnapshot) -> crate::Result<()> {
        self.main.set_rect(snapshot.rect)?;
        self.preview.set_rect(snapshot.rect)?;
        self.palettes.restore(&snapshot.palettes)?;
        self.refresh_zoombox();
        Ok(())
    }

    fn refresh_zoombox(&mut self) {
        self.zoombox
            .follow_pointer(self.main.plane(), self.pointer.0, self.pointer.1);
    }
}
