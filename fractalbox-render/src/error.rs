use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(
        "iteration field is {field_width}\u{d7}{field_height} but the plane maps \
         {raster_width}\u{d7}{raster_height}"
    )]
    FieldSizeMismatch {
        field_width: u32,
        field_height: u32,
        raster_width: u32,
        raster_height: u32,
    },

    #[error("palette covers {palette_max} iterations but the field was computed with {field_max}")]
    PaletteTooSmall { palette_max: u32, field_max: u32 },

    #[error("saturation/lightness only apply to HSL palettes")]
    NotAnHslPalette,

    #[error("no palette named {0:?} in the collection")]
    UnknownPalette(String),

    #[error("map palette text contains no colors")]
    EmptyMapPalette,

    #[error("map palette line {line} is not an R G B triple")]
    MalformedMapLine { line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    PngEncoding(#[from] png::EncodingError),

    #[error(transparent)]
    Core(#[from] fractalbox_core::CoreError),
}
