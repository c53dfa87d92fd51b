use thiserror::Error;

/// Errors originating from the view/controller layer.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("zoom and palette history stacks are out of sync ({zoom} vs {palette} entries)")]
    HistoryOutOfSync { zoom: usize, palette: usize },

    #[error("invalid zoombox size: {width}%\u{d7}{height}% (both must be > 0 and finite)")]
    InvalidZoomboxSize { width: f64, height: f64 },

    #[error(transparent)]
    Core(#[from] fractalbox_core::CoreError),

    #[error(transparent)]
    Render(#[from] fractalbox_render::RenderError),
}
