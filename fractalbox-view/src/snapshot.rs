use serde::{Deserialize, Serialize};

use fractalbox_core::Rectangle;
use fractalbox_render::PaletteSetSnapshot;

/// A serializable snapshot of the whole view: committed rectangle plus the
/// full palette collection (every member and the active name).
///
/// Plain data only, so it round-trips through any text or binary
/// serialization a host persistence layer picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub rect: Rectangle,
    pub palettes: PaletteSetSnapshot,
}
