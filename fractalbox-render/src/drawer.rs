use std::time::{Duration, Instant};

use tracing::{debug, info};

use fractalbox_core::{EvalParams, Family, IterationOutcome, PlaneMap};

use crate::buffer::RgbaBuffer;
use crate::error::RenderError;
use crate::field::{IterationField, STABLE};
use crate::palette::{Palette, Rgb};

/// The fixed color for stable (non-escaping) pixels.
pub const STABLE_COLOR: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Summary of one compute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    pub elapsed: Duration,
    pub escaped: usize,
    pub stable: usize,
}

impl DrawStats {
    const EMPTY: Self = Self {
        elapsed: Duration::ZERO,
        escaped: 0,
        stable: 0,
    };
}

/// Phase 1: fill `field` with iteration data for every pixel of `plane`.
///
/// Visits each pixel exactly once in row-major order, maps it to the plane,
/// runs the evaluator, and stores the escape count (or [`STABLE`]). Performs
/// no color work; this is the expensive pass that palette changes avoid.
///
/// A zero-sized field is a no-op; a field whose dimensions disagree with the
/// plane's raster is a caller error.
pub fn compute(
    family: &Family,
    params: &EvalParams,
    plane: &PlaneMap,
    field: &mut IterationField,
) -> crate::Result<DrawStats> {
    compute_with_progress(family, params, plane, field, &mut |_, _| {})
}

/// [`compute`] with an observational per-row progress callback.
///
/// `progress(rows_done, rows_total)` is invoked after each completed row —
/// useful for large exports. The callback cannot alter or cancel the pass.
pub fn compute_with_progress(
    family: &Family,
    params: &EvalParams,
    plane: &PlaneMap,
    field: &mut IterationField,
    progress: &mut dyn FnMut(u32, u32),
) -> crate::Result<DrawStats> {
    if field.is_empty() {
        return Ok(DrawStats::EMPTY);
    }
    let raster = plane.raster();
    if field.width != raster.width || field.height != raster.height {
        return Err(RenderError::FieldSizeMismatch {
            field_width: field.width,
            field_height: field.height,
            raster_width: raster.width,
            raster_height: raster.height,
        });
    }

    debug!(
        family = family.name(),
        width = raster.width,
        height = raster.height,
        max_iterations = params.max_iterations,
        "starting compute pass"
    );
    let start = Instant::now();

    field.max_iterations = params.max_iterations;
    let mut escaped = 0usize;
    let mut stable = 0usize;

    for py in 0..raster.height {
        let row = (py * raster.width) as usize;
        for px in 0..raster.width {
            let point = plane.to_plane(px, py);
            field.data[row + px as usize] = match family.evaluate(point, params) {
                IterationOutcome::Escaped { iterations } => {
                    escaped += 1;
                    iterations as i32
                }
                IterationOutcome::NonEscaping { .. } => {
                    stable += 1;
                    STABLE
                }
            };
        }
        progress(py + 1, raster.height);
    }

    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        escaped, stable, "compute pass complete"
    );

    Ok(DrawStats {
        elapsed,
        escaped,
        stable,
    })
}

/// Phase 2: map a computed field through a palette into an RGBA buffer.
///
/// Pure in `(field, palette)` — repeated calls produce bit-identical output
/// and the evaluator is never re-run, so palette experiments cost O(pixels).
/// Stable pixels take [`STABLE_COLOR`]; alpha is fixed opaque.
pub fn colorize(field: &IterationField, palette: &Palette) -> crate::Result<RgbaBuffer> {
    if field.is_empty() {
        return Ok(RgbaBuffer::new(field.width, field.height));
    }
    if palette.max_iterations() < field.max_iterations {
        return Err(RenderError::PaletteTooSmall {
            palette_max: palette.max_iterations(),
            field_max: field.max_iterations,
        });
    }

    let mut buffer = RgbaBuffer::new(field.width, field.height);
    for (chunk, &value) in buffer.pixels.chunks_exact_mut(4).zip(field.data.iter()) {
        let color = if value < 0 {
            STABLE_COLOR
        } else {
            palette.color(value as u32)
        };
        chunk[0] = color.r;
        chunk[1] = color.g;
        chunk[2] = color.b;
        chunk[3] = 255;
    }
    Ok(buffer)
}
