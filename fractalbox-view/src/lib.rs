pub mod controller;
pub mod error;
pub mod history;
pub mod snapshot;
pub mod zoombox;

pub use controller::{
    PointProbe, ViewContext, ViewController, DEFAULT_ZOOM_PERCENT, HOME_PLANE_HEIGHT,
};
pub use error::ViewError;
pub use history::{History, SaveHook};
pub use snapshot::ViewSnapshot;
pub use zoombox::Zoombox;

/// Convenience result type for the view crate.
pub type Result<T> = std::result::Result<T, ViewError>;
