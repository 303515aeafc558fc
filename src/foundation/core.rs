pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// COLORREF flag: the low word is a palette index.
pub const COLOR_PALETTE_INDEX: u8 = 0x01;
/// COLORREF flag: RGB value matched against the selected palette.
pub const COLOR_PALETTE_RGB: u8 = 0x02;

/// A GDI color in its BGR-plus-flags packing (`0xFFBBGGRR`, flags in the top byte).
///
/// The same packing is used for COLORREF parameters and for PALETTEENTRY values, so
/// [`Color::from_colorref`] / [`Color::to_colorref`] round-trip both exactly.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub flags: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, flags: 0 }
    }

    pub fn from_colorref(v: u32) -> Self {
        let [r, g, b, flags] = v.to_le_bytes();
        Self { r, g, b, flags }
    }

    pub fn to_colorref(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.flags])
    }

    /// Palette slot when the color is an indexed reference (`PALETTEINDEX`).
    pub fn palette_index(self) -> Option<u16> {
        (self.flags == COLOR_PALETTE_INDEX).then(|| u16::from_le_bytes([self.r, self.g]))
    }

    /// The plain RGB value with flags cleared.
    pub fn without_flags(self) -> Self {
        Self { flags: 0, ..self }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
