pub mod buffer;
pub mod drawer;
pub mod error;
pub mod export;
pub mod field;
pub mod palette;

pub use buffer::RgbaBuffer;
pub use drawer::{colorize, compute, compute_with_progress, DrawStats, STABLE_COLOR};
pub use error::RenderError;
pub use export::{export_png, ExportMetadata};
pub use field::{IterationField, STABLE};
pub use palette::{
    hsl_to_rgb, Palette, PaletteCollection, PaletteMemberSnapshot, PaletteSetSnapshot,
    PaletteSnapshot, Rgb, Strategy, HSL_PALETTE, RGB_PALETTE,
};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
