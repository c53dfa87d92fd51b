use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Name of the RGB-ramp member in a standard collection.
pub const RGB_PALETTE: &str = "RGB";
/// Name of the HSL member in a standard collection.
pub const HSL_PALETTE: &str = "HSL";

/// The RGB generation strategy walks this many distinct color codes:
/// 256³, one per packed 24-bit RGB value.
const RGB_RANGE: u32 = 1 << 24;

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Convert an HSL triple to RGB.
///
/// `hue` is in degrees, `saturation` and `lightness` in `[0, 1]`. Uses the
/// standard two-threshold piecewise formulation: `t2` is the upper chroma
/// bound, `t1` the lower, and each channel samples the hue wheel offset by
/// ±120° (±2 in sixth-of-circle units).
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let h = hue / 60.0;
    let t2 = if lightness <= 0.5 {
        lightness * (saturation + 1.0)
    } else {
        lightness + saturation - lightness * saturation
    };
    let t1 = lightness * 2.0 - t2;
    Rgb {
        r: (hue_channel(t1, t2, h + 2.0) * 255.0).round() as u8,
        g: (hue_channel(t1, t2, h) * 255.0).round() as u8,
        b: (hue_channel(t1, t2, h - 2.0) * 255.0).round() as u8,
    }
}

fn hue_channel(t1: f64, t2: f64, hue: f64) -> f64 {
    let mut h = hue;
    if h < 0.0 {
        h += 6.0;
    }
    if h >= 6.0 {
        h -= 6.0;
    }
    if h < 1.0 {
        (t2 - t1) * h + t1
    } else if h < 3.0 {
        t2
    } else if h < 4.0 {
        (t2 - t1) * (4.0 - h) + t1
    } else {
        t1
    }
}

/// How a palette generates its color table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Strategy {
    /// Cyclic ramp through the packed 24-bit color range.
    Rgb,
    /// Cyclic hue sweep at fixed saturation/lightness.
    Hsl { saturation: f64, lightness: f64 },
    /// A fixed base color list (e.g. a Fractint `.map` file) tiled over the
    /// iteration range.
    Map { base: Vec<Rgb> },
}

/// A serializable value-object snapshot of one palette.
///
/// Restoring reinstates every field verbatim, including the color table, so
/// a restored palette is bit-for-bit the one that was snapshotted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteSnapshot {
    pub colors: Vec<Rgb>,
    pub offset: f64,
    pub max_iterations: u32,
    pub strategy: Strategy,
}

/// A color for every possible iteration count `0..=max_iterations`, plus a
/// cyclic offset that rotates the ramp without touching iteration data.
///
/// The table is regenerated eagerly on every parameter change — that is
/// O(max_iterations), never O(pixels) — and the colorize pass only does
/// lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
    /// Fractional rotation of the color range, always in `[0, 1)`.
    offset: f64,
    max_iterations: u32,
    strategy: Strategy,
}

impl Palette {
    /// A palette using the cyclic RGB-ramp strategy.
    pub fn rgb(max_iterations: u32) -> Self {
        let mut p = Self {
            colors: Vec::new(),
            offset: 0.0,
            max_iterations,
            strategy: Strategy::Rgb,
        };
        p.regenerate();
        p
    }

    /// A palette using the HSL strategy with full saturation and mid
    /// lightness.
    pub fn hsl(max_iterations: u32) -> Self {
        Self::hsl_with(max_iterations, 1.0, 0.5)
    }

    /// An HSL palette with explicit saturation and lightness, both clamped
    /// to `[0, 1]`.
    pub fn hsl_with(max_iterations: u32, saturation: f64, lightness: f64) -> Self {
        let mut p = Self {
            colors: Vec::new(),
            offset: 0.0,
            max_iterations,
            strategy: Strategy::Hsl {
                saturation: saturation.clamp(0.0, 1.0),
                lightness: lightness.clamp(0.0, 1.0),
            },
        };
        p.regenerate();
        p
    }

    /// Parse a Fractint-style `.map` text (one `R G B` triple per line) into
    /// a map-strategy palette. The caller is responsible for any file I/O.
    pub fn from_map_str(text: &str, max_iterations: u32) -> crate::Result<Self> {
        let mut base = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let mut channel = || -> Option<u8> { fields.next()?.parse().ok() };
            match (channel(), channel(), channel()) {
                (Some(r), Some(g), Some(b)) => base.push(Rgb::new(r, g, b)),
                _ => return Err(RenderError::MalformedMapLine { line: i + 1 }),
            }
        }
        if base.is_empty() {
            return Err(RenderError::EmptyMapPalette);
        }
        let mut p = Self {
            colors: Vec::new(),
            offset: 0.0,
            max_iterations,
            strategy: Strategy::Map { base },
        };
        p.regenerate();
        Ok(p)
    }

    /// One color per iteration count, `max_iterations + 1` entries.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// The color for an iteration count. Counts beyond the table (a caller
    /// mixing palettes of different budgets) saturate at the last entry; an
    /// empty table (restorable from a degenerate snapshot) reads as black.
    #[inline]
    pub fn color(&self, iteration: u32) -> Rgb {
        let idx = (iteration as usize).min(self.colors.len().saturating_sub(1));
        self.colors.get(idx).copied().unwrap_or(Rgb::BLACK)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Set the cyclic offset as a fraction of the color range and regenerate.
    /// Any finite value is accepted and wrapped into `[0, 1)`, so `1.0` is
    /// a full cycle back to `0.0`.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset.rem_euclid(1.0);
        self.regenerate();
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Resize the table for a new iteration budget and regenerate.
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations;
        self.regenerate();
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Saturation of an HSL palette, `None` for other strategies.
    pub fn saturation(&self) -> Option<f64> {
        match self.strategy {
            Strategy::Hsl { saturation, .. } => Some(saturation),
            _ => None,
        }
    }

    /// Lightness of an HSL palette, `None` for other strategies.
    pub fn lightness(&self) -> Option<f64> {
        match self.strategy {
            Strategy::Hsl { lightness, .. } => Some(lightness),
            _ => None,
        }
    }

    /// Set the saturation of an HSL palette (clamped to `[0, 1]`).
    pub fn set_saturation(&mut self, value: f64) -> crate::Result<()> {
        match &mut self.strategy {
            Strategy::Hsl { saturation, .. } => {
                *saturation = value.clamp(0.0, 1.0);
                self.regenerate();
                Ok(())
            }
            _ => Err(RenderError::NotAnHslPalette),
        }
    }

    /// Set the lightness of an HSL palette (clamped to `[0, 1]`).
    pub fn set_lightness(&mut self, value: f64) -> crate::Result<()> {
        match &mut self.strategy {
            Strategy::Hsl { lightness, .. } => {
                *lightness = value.clamp(0.0, 1.0);
                self.regenerate();
                Ok(())
            }
            _ => Err(RenderError::NotAnHslPalette),
        }
    }

    pub fn snapshot(&self) -> PaletteSnapshot {
        PaletteSnapshot {
            colors: self.colors.clone(),
            offset: self.offset,
            max_iterations: self.max_iterations,
            strategy: self.strategy.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &PaletteSnapshot) {
        self.colors = snapshot.colors.clone();
        self.offset = snapshot.offset;
        self.max_iterations = snapshot.max_iterations;
        self.strategy = snapshot.strategy.clone();
    }

    /// Rebuild the color table from the strategy and current parameters.
    /// Never touches any iteration data.
    fn regenerate(&mut self) {
        let max = self.max_iterations;
        let count = max as usize + 1;
        self.colors.clear();
        self.colors.reserve(count);
        for j in 0..count as u32 {
            let ratio = if max == 0 { 0.0 } else { j as f64 / max as f64 };
            let color = match &self.strategy {
                Strategy::Rgb => rgb_ramp(ratio, self.offset),
                Strategy::Hsl {
                    saturation,
                    lightness,
                } => {
                    let hue = ((self.offset + ratio) * 360.0) % 360.0;
                    hsl_to_rgb(hue, *saturation, *lightness)
                }
                Strategy::Map { base } => {
                    if base.is_empty() {
                        Rgb::BLACK
                    } else {
                        let rotation = (self.offset * base.len() as f64).floor() as usize;
                        base[(j as usize + rotation) % base.len()]
                    }
                }
            };
            self.colors.push(color);
        }
    }
}

/// One step of the cyclic RGB ramp: scale the ratio into the packed 24-bit
/// range, rotate by the offset, and decompose into channels (top byte red).
fn rgb_ramp(ratio: f64, offset: f64) -> Rgb {
    let range = f64::from(RGB_RANGE);
    let scaled = (ratio * range).ceil() as u32 + (offset * range) as u32;
    let code = scaled % RGB_RANGE;
    Rgb {
        r: ((code >> 16) & 0xff) as u8,
        g: ((code >> 8) & 0xff) as u8,
        b: (code & 0xff) as u8,
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Snapshot of a whole [`PaletteCollection`], including which member is
/// active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteSetSnapshot {
    pub active: String,
    pub members: Vec<PaletteMemberSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteMemberSnapshot {
    pub name: String,
    pub palette: PaletteSnapshot,
}

/// Several named palettes held alive simultaneously, so switching the active
/// one is an index change rather than a regeneration.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteCollection {
    members: Vec<(String, Palette)>,
    active: usize,
}

impl PaletteCollection {
    /// The standard pair: an RGB-ramp palette and an HSL palette, with RGB
    /// active. Further members (e.g. map palettes) can be added on top.
    pub fn standard(max_iterations: u32) -> Self {
        Self {
            members: vec![
                (RGB_PALETTE.to_string(), Palette::rgb(max_iterations)),
                (HSL_PALETTE.to_string(), Palette::hsl(max_iterations)),
            ],
            active: 0,
        }
    }

    /// Add a palette under `name`, replacing any existing member with the
    /// same name (the active member stays active).
    pub fn add(&mut self, name: impl Into<String>, palette: Palette) {
        let name = name.into();
        if let Some(slot) = self.members.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = palette;
        } else {
            self.members.push((name, palette));
        }
    }

    pub fn set_active(&mut self, name: &str) -> crate::Result<()> {
        match self.members.iter().position(|(n, _)| n == name) {
            Some(idx) => {
                self.active = idx;
                Ok(())
            }
            None => Err(RenderError::UnknownPalette(name.to_string())),
        }
    }

    pub fn active(&self) -> &Palette {
        &self.members[self.active].1
    }

    pub fn active_mut(&mut self) -> &mut Palette {
        &mut self.members[self.active].1
    }

    pub fn active_name(&self) -> &str {
        &self.members[self.active].0
    }

    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Palette> {
        self.members
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(n, _)| n.as_str())
    }

    /// Resize every member for a new iteration budget.
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        for (_, palette) in &mut self.members {
            palette.set_max_iterations(max_iterations);
        }
    }

    /// Snapshot every member plus the active name.
    pub fn snapshot(&self) -> PaletteSetSnapshot {
        PaletteSetSnapshot {
            active: self.active_name().to_string(),
            members: self
                .members
                .iter()
                .map(|(name, palette)| PaletteMemberSnapshot {
                    name: name.clone(),
                    palette: palette.snapshot(),
                })
                .collect(),
        }
    }

    /// Restore every member named in the snapshot and reinstate the active
    /// member. A snapshot naming an unknown member is an error and leaves
    /// the active selection unchanged.
    pub fn restore(&mut self, snapshot: &PaletteSetSnapshot) -> crate::Result<()> {
        for member in &snapshot.members {
            match self.get_mut(&member.name) {
                Some(palette) => palette.restore(&member.palette),
                None => return Err(RenderError::UnknownPalette(member.name.clone())),
            }
        }
        self.set_active(&snapshot.active)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_reference_colors() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
    }

    #[test]
    fn hsl_grayscale_when_desaturated() {
        // Zero saturation collapses every hue to the lightness gray.
        for hue in [0.0, 90.0, 217.0, 359.0] {
            assert_eq!(hsl_to_rgb(hue, 0.0, 0.5), Rgb::new(128, 128, 128));
        }
    }

    #[test]
    fn hsl_lightness_extremes() {
        assert_eq!(hsl_to_rgb(57.0, 1.0, 0.0), Rgb::new(0, 0, 0));
        assert_eq!(hsl_to_rgb(57.0, 1.0, 1.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn palette_has_one_color_per_count() {
        assert_eq!(Palette::rgb(200).colors().len(), 201);
        assert_eq!(Palette::hsl(50).colors().len(), 51);
    }

    #[test]
    fn zero_iteration_palette_is_single_color() {
        let p = Palette::rgb(0);
        assert_eq!(p.colors().len(), 1);
        let h = Palette::hsl(0);
        assert_eq!(h.colors().len(), 1);
    }

    #[test]
    fn rgb_ramp_decomposes_top_byte_as_red() {
        // ratio that lands exactly on code 0x010000 → pure dark red.
        let c = rgb_ramp(f64::from(0x010000u32) / f64::from(RGB_RANGE), 0.0);
        assert_eq!(c, Rgb::new(1, 0, 0));
    }

    #[test]
    fn offset_rotates_rgb_ramp() {
        let mut p = Palette::rgb(100);
        let before = p.colors().to_vec();
        p.set_offset(0.25);
        assert_ne!(before, p.colors(), "offset must change the ramp");
        assert_eq!(before.len(), p.colors().len());
    }

    #[test]
    fn offset_full_cycle_is_identity() {
        let mut p = Palette::hsl(150);
        let original = p.colors().to_vec();
        p.set_offset(0.37);
        assert_ne!(original, p.colors());
        p.set_offset(1.0); // wraps to 0.0
        assert_eq!(original, p.colors(), "a full cycle must restore the ramp");
        assert_eq!(p.offset(), 0.0);
    }

    #[test]
    fn negative_offset_wraps() {
        let mut p = Palette::rgb(40);
        p.set_offset(-0.25);
        assert!((p.offset() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn hsl_setters_regenerate() {
        let mut p = Palette::hsl(60);
        let before = p.colors().to_vec();
        p.set_lightness(0.2).unwrap();
        assert_ne!(before, p.colors());
        assert_eq!(p.lightness(), Some(0.2));
        p.set_saturation(0.5).unwrap();
        assert_eq!(p.saturation(), Some(0.5));
    }

    #[test]
    fn hsl_setters_rejected_on_rgb_palette() {
        let mut p = Palette::rgb(60);
        assert!(p.set_saturation(0.5).is_err());
        assert!(p.set_lightness(0.5).is_err());
        assert_eq!(p.saturation(), None);
        assert_eq!(p.lightness(), None);
    }

    #[test]
    fn hsl_setters_clamp() {
        let mut p = Palette::hsl(10);
        p.set_saturation(2.0).unwrap();
        assert_eq!(p.saturation(), Some(1.0));
        p.set_lightness(-1.0).unwrap();
        assert_eq!(p.lightness(), Some(0.0));
    }

    #[test]
    fn set_max_iterations_resizes_table() {
        let mut p = Palette::rgb(10);
        p.set_max_iterations(500);
        assert_eq!(p.colors().len(), 501);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut p = Palette::hsl(80);
        p.set_offset(0.6);
        p.set_saturation(0.7).unwrap();
        let snap = p.snapshot();

        let mut other = Palette::hsl(80);
        other.restore(&snap);
        assert_eq!(p, other, "restore must be bit-for-bit");
    }

    #[test]
    fn snapshot_serde_round_trip() {
        let mut p = Palette::hsl(30);
        p.set_offset(0.125);
        let snap = p.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: PaletteSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }

    #[test]
    fn map_palette_parses_triples() {
        let p = Palette::from_map_str("0 0 0\n255 128 0\n\n  10 20 30 \n", 5).unwrap();
        assert_eq!(p.colors().len(), 6);
        assert_eq!(p.color(0), Rgb::new(0, 0, 0));
        assert_eq!(p.color(1), Rgb::new(255, 128, 0));
        assert_eq!(p.color(2), Rgb::new(10, 20, 30));
        // Tiled cyclically beyond the base list.
        assert_eq!(p.color(3), Rgb::new(0, 0, 0));
    }

    #[test]
    fn map_palette_rejects_garbage() {
        assert!(matches!(
            Palette::from_map_str("0 0\n", 5),
            Err(RenderError::MalformedMapLine { line: 1 })
        ));
        assert!(matches!(
            Palette::from_map_str("1 2 rainbows\n", 5),
            Err(RenderError::MalformedMapLine { line: 1 })
        ));
        assert!(matches!(
            Palette::from_map_str("\n \n", 5),
            Err(RenderError::EmptyMapPalette)
        ));
    }

    #[test]
    fn map_palette_offset_rotates_base() {
        let mut p = Palette::from_map_str("1 0 0\n2 0 0\n3 0 0\n4 0 0\n", 3).unwrap();
        assert_eq!(p.color(0), Rgb::new(1, 0, 0));
        p.set_offset(0.5); // rotation by 2 of 4
        assert_eq!(p.color(0), Rgb::new(3, 0, 0));
    }

    #[test]
    fn color_saturates_past_table_end() {
        let p = Palette::rgb(10);
        assert_eq!(p.color(10_000), *p.colors().last().unwrap());
    }

    #[test]
    fn standard_collection_starts_on_rgb() {
        let c = PaletteCollection::standard(100);
        assert_eq!(c.active_name(), RGB_PALETTE);
        assert_eq!(c.names().collect::<Vec<_>>(), vec![RGB_PALETTE, HSL_PALETTE]);
    }

    #[test]
    fn switching_active_is_lossless() {
        let mut c = PaletteCollection::standard(100);
        c.get_mut(HSL_PALETTE).unwrap().set_offset(0.4);
        let hsl_before = c.get(HSL_PALETTE).unwrap().clone();

        c.set_active(HSL_PALETTE).unwrap();
        assert_eq!(c.active(), &hsl_before, "switching must not regenerate");
        c.set_active(RGB_PALETTE).unwrap();
        assert_eq!(c.get(HSL_PALETTE).unwrap(), &hsl_before);
    }

    #[test]
    fn unknown_active_name_is_an_error() {
        let mut c = PaletteCollection::standard(10);
        assert!(c.set_active("Sepia").is_err());
        assert_eq!(c.active_name(), RGB_PALETTE, "selection unchanged on error");
    }

    #[test]
    fn collection_snapshot_restores_every_member_and_selection() {
        let mut c = PaletteCollection::standard(50);
        c.get_mut(HSL_PALETTE).unwrap().set_offset(0.3);
        c.set_active(HSL_PALETTE).unwrap();
        let snap = c.snapshot();

        // Mutate everything, then restore.
        c.get_mut(RGB_PALETTE).unwrap().set_offset(0.9);
        c.get_mut(HSL_PALETTE).unwrap().set_lightness(0.1).unwrap();
        c.set_active(RGB_PALETTE).unwrap();

        c.restore(&snap).unwrap();
        assert_eq!(c.active_name(), HSL_PALETTE);
        assert_eq!(c.get(HSL_PALETTE).unwrap().offset(), 0.3);
        assert_eq!(c.get(RGB_PALETTE).unwrap().offset(), 0.0);
    }

    #[test]
    fn collection_restore_rejects_unknown_member() {
        let mut c = PaletteCollection::standard(50);
        let mut snap = c.snapshot();
        snap.members[0].name = "Plasma".to_string();
        assert!(c.restore(&snap).is_err());
    }

    #[test]
    fn add_replaces_existing_member() {
        let mut c = PaletteCollection::standard(10);
        c.add(RGB_PALETTE, Palette::rgb(99));
        assert_eq!(c.get(RGB_PALETTE).unwrap().max_iterations(), 99);
        assert_eq!(c.names().count(), 2);
        c.add("Lava", Palette::from_map_str("255 0 0\n0 0 0\n", 10).unwrap());
        assert_eq!(c.names().count(), 3);
    }
}
