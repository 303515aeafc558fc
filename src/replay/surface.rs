use std::sync::Arc;

use crate::{
    bitmap::decode::DecodedBitmap,
    foundation::core::{Affine, BezPath, Color, Point, Rect},
    gdi::objects::{Font, HatchStyle, LineCap, LineJoin},
};

/// Polygon fill rule (`SetPolyFillMode`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum FillRule {
    /// `ALTERNATE` (1), the GDI default.
    #[default]
    EvenOdd,
    /// `WINDING` (2).
    NonZero,
}

impl FillRule {
    pub fn from_mode(mode: u16) -> Self {
        if mode == 2 {
            Self::NonZero
        } else {
            Self::EvenOdd
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    Hatched {
        hatch: HatchStyle,
        color: Color,
        /// Background fill between hatch lines when the DC is in opaque mode.
        background: Option<Color>,
    },
    Pattern(Arc<DecodedBitmap>),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StrokeStyle {
    pub width: f64,
    pub color: Color,
    /// Absolute dash lengths; empty for a continuous line.
    pub dash: Vec<f64>,
    pub cap: LineCap,
    pub join: LineJoin,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub origin: Point,
    pub text: String,
    pub font: Arc<Font>,
    /// Em height in logical units after scaling.
    pub size: f64,
    pub color: Color,
    pub background: Option<Color>,
    /// Raw `SetTextAlign` flags.
    pub align: u16,
    /// Per-character advances, when the record carried them.
    pub advances: Vec<f64>,
}

/// Drawing target for replay.
///
/// Geometry is given in logical (scaled) coordinates; the surface applies the transform most
/// recently passed to [`DrawSurface::set_transform`]. The clip rectangle is also logical.
pub trait DrawSurface {
    fn set_transform(&mut self, transform: Affine);

    fn set_clip(&mut self, clip: Option<Rect>);

    fn fill_path(&mut self, path: &BezPath, paint: &Paint, rule: FillRule);

    fn stroke_path(&mut self, path: &BezPath, stroke: &StrokeStyle);

    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.stroke_path(&path, stroke);
    }

    fn draw_text(&mut self, run: &TextRun);

    fn draw_image(&mut self, image: &DecodedBitmap, dest: Rect);
}
