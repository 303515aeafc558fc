use std::sync::Arc;

use crate::{
    bitmap::decode::DecodedBitmap,
    foundation::core::Color,
    foundation::math::RawRect,
};

pub const PS_STYLE_MASK: u16 = 0x000F;
pub const PS_ENDCAP_MASK: u16 = 0x0F00;
pub const PS_JOIN_MASK: u16 = 0xF000;
pub const PS_NULL: u16 = 5;

/// Dash pattern selected by the low nibble of a pen style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PenDash {
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    Null,
    InsideFrame,
    UserStyle,
    Alternate,
}

impl PenDash {
    pub fn from_style(style: u16) -> Option<Self> {
        Some(match style & PS_STYLE_MASK {
            0 => Self::Solid,
            1 => Self::Dash,
            2 => Self::Dot,
            3 => Self::DashDot,
            4 => Self::DashDotDot,
            5 => Self::Null,
            6 => Self::InsideFrame,
            7 => Self::UserStyle,
            8 => Self::Alternate,
            _ => return None,
        })
    }

    /// Dash lengths in multiples of the pen width; empty for continuous lines.
    pub fn pattern(self) -> &'static [f64] {
        match self {
            Self::Dash => &[3.0, 1.0],
            Self::Dot | Self::Alternate => &[1.0, 1.0],
            Self::DashDot => &[3.0, 1.0, 1.0, 1.0],
            Self::DashDotDot => &[3.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            Self::Solid | Self::Null | Self::InsideFrame | Self::UserStyle => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub enum LineCap {
    #[default]
    Round,
    Square,
    Flat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub enum LineJoin {
    #[default]
    Round,
    Bevel,
    Miter,
}

/// A logical pen. `width` is the raw logical width; zero means one device pixel.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Pen {
    pub style: u16,
    pub width: i16,
    pub color: Color,
}

impl Default for Pen {
    /// Stock `BLACK_PEN`.
    fn default() -> Self {
        Self {
            style: 0,
            width: 1,
            color: Color::BLACK,
        }
    }
}

impl Pen {
    pub fn dash(&self) -> PenDash {
        PenDash::from_style(self.style).unwrap_or(PenDash::Solid)
    }

    pub fn is_visible(&self) -> bool {
        self.dash() != PenDash::Null
    }

    pub fn cap(&self) -> LineCap {
        match self.style & PS_ENDCAP_MASK {
            0x0100 => LineCap::Square,
            0x0200 => LineCap::Flat,
            _ => LineCap::Round,
        }
    }

    pub fn join(&self) -> LineJoin {
        match self.style & PS_JOIN_MASK {
            0x1000 => LineJoin::Bevel,
            0x2000 => LineJoin::Miter,
            _ => LineJoin::Round,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum BrushStyle {
    Solid,
    Null,
    Hatched,
    Pattern,
    Indexed,
    DibPattern,
    DibPatternPt,
    Pattern8x8,
    DibPattern8x8,
    MonoPattern,
}

impl BrushStyle {
    pub fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            0 => Self::Solid,
            1 => Self::Null,
            2 => Self::Hatched,
            3 => Self::Pattern,
            4 => Self::Indexed,
            5 => Self::DibPattern,
            6 => Self::DibPatternPt,
            7 => Self::Pattern8x8,
            8 => Self::DibPattern8x8,
            9 => Self::MonoPattern,
            _ => return None,
        })
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Self::Solid => 0,
            Self::Null => 1,
            Self::Hatched => 2,
            Self::Pattern => 3,
            Self::Indexed => 4,
            Self::DibPattern => 5,
            Self::DibPatternPt => 6,
            Self::Pattern8x8 => 7,
            Self::DibPattern8x8 => 8,
            Self::MonoPattern => 9,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum HatchStyle {
    Horizontal,
    Vertical,
    ForwardDiagonal,
    BackwardDiagonal,
    Cross,
    DiagonalCross,
}

impl HatchStyle {
    pub fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            0 => Self::Horizontal,
            1 => Self::Vertical,
            2 => Self::ForwardDiagonal,
            3 => Self::BackwardDiagonal,
            4 => Self::Cross,
            5 => Self::DiagonalCross,
            _ => return None,
        })
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
            Self::ForwardDiagonal => 2,
            Self::BackwardDiagonal => 3,
            Self::Cross => 4,
            Self::DiagonalCross => 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Brush {
    Solid(Color),
    Null,
    Hatched { hatch: HatchStyle, color: Color },
    /// Bitmap pattern; `None` when the embedded bitmap could not be decoded.
    Pattern(Option<Arc<DecodedBitmap>>),
}

impl Default for Brush {
    /// Stock `WHITE_BRUSH`.
    fn default() -> Self {
        Self::Solid(Color::WHITE)
    }
}

impl Brush {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Null)
    }
}

/// A logical font as carried by CreateFontIndirect.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Font {
    pub face_name: String,
    pub height: i16,
    pub width: i16,
    pub escapement: i16,
    pub orientation: i16,
    pub weight: i16,
    pub italic: bool,
    pub underline: bool,
    pub strike_out: bool,
    pub charset: u8,
    pub out_precision: u8,
    pub clip_precision: u8,
    pub quality: u8,
    pub pitch_and_family: u8,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            face_name: "System".to_string(),
            height: 12,
            width: 0,
            escapement: 0,
            orientation: 0,
            weight: 400,
            italic: false,
            underline: false,
            strike_out: false,
            charset: 0,
            out_precision: 0,
            clip_precision: 0,
            quality: 0,
            pitch_and_family: 0,
        }
    }
}

impl Font {
    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Palette {
    pub entries: Vec<Color>,
}

impl Palette {
    pub fn get(&self, index: u16) -> Option<Color> {
        self.entries.get(usize::from(index)).copied()
    }
}

/// A clipping/fill region reduced to its bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Region {
    pub bounds: RawRect,
}

/// An entry of the replay object table.
#[derive(Clone, Debug, PartialEq)]
pub enum GdiObject {
    Pen(Arc<Pen>),
    Brush(Arc<Brush>),
    Font(Arc<Font>),
    Palette(Arc<Palette>),
    Region(Arc<Region>),
}

impl GdiObject {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pen(_) => "pen",
            Self::Brush(_) => "brush",
            Self::Font(_) => "font",
            Self::Palette(_) => "palette",
            Self::Region(_) => "region",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gdi/objects.rs"]
mod tests;
