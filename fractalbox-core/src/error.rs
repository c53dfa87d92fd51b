use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid rectangle: {reason}")]
    InvalidRectangle { reason: String },

    #[error("invalid raster size: {width}\u{d7}{height} (both dimensions must be > 0)")]
    InvalidRasterSize { width: u32, height: u32 },

    #[error("invalid escape radius: {0} (must be > 0.0 and finite)")]
    InvalidEscapeRadius(f64),

    #[error("invalid convergence epsilon: {0} (must be > 0.0 and finite)")]
    InvalidEpsilon(f64),
}
