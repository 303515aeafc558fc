use std::f64::consts::TAU;

use kurbo::Shape;

use crate::{
    command::MetaCommand,
    foundation::core::{BezPath, Color, Vec2},
    foundation::error::{WmfError, WmfResult},
    foundation::math::{RawPoint, RawRect, Scale, ScaledPoint, ScaledRect, scale_coord},
    record::{
        opcode,
        store::{ParamReader, ParamWriter, RecordStore},
    },
    replay::{
        context::ReplayContext,
        surface::{DrawSurface, Paint},
    },
};

const CURVE_TOLERANCE: f64 = 0.1;

pub(crate) fn read_point_yx(r: &mut ParamReader<'_>) -> WmfResult<RawPoint> {
    let y = r.i16()?;
    let x = r.i16()?;
    Ok(RawPoint::new(x, y))
}

/// Reads the `[bottom, right, top, left]` order used by rectangle records.
pub(crate) fn read_rect_brtl(r: &mut ParamReader<'_>) -> WmfResult<RawRect> {
    let bottom = r.i16()?;
    let right = r.i16()?;
    let top = r.i16()?;
    let left = r.i16()?;
    Ok(RawRect::new(left, top, right, bottom))
}

pub(crate) fn write_rect_brtl(w: &mut ParamWriter, rect: RawRect) {
    w.i16(rect.bottom).i16(rect.right).i16(rect.top).i16(rect.left);
}

pub(crate) fn read_color(r: &mut ParamReader<'_>) -> WmfResult<Color> {
    Ok(Color::from_colorref(r.long()?))
}

fn rect_path(rect: ScaledRect) -> BezPath {
    rect.to_kurbo().to_path(CURVE_TOLERANCE)
}

fn poly_path(points: &[ScaledPoint], close: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(first.to_kurbo());
        for p in iter {
            path.line_to(p.to_kurbo());
        }
        if close {
            path.close_path();
        }
    }
    path
}

// ---- position ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct MoveTo {
    pub to: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledPoint,
}

impl MetaCommand for MoveTo {
    const OPCODE: u16 = opcode::MOVE_TO;
    const NAME: &'static str = "MoveTo";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "point")?;
        Ok(Self {
            to: read_point_yx(&mut record.reader())?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .i16(self.to.y)
            .i16(self.to.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.point(self.to);
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.dc_mut().position = self.scaled;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct LineTo {
    pub to: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledPoint,
}

impl MetaCommand for LineTo {
    const OPCODE: u16 = opcode::LINE_TO;
    const NAME: &'static str = "LineTo";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "point")?;
        Ok(Self {
            to: read_point_yx(&mut record.reader())?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .i16(self.to.y)
            .i16(self.to.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.point(self.to);
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        if let Some(stroke) = ctx.stroke_style(scale) {
            ctx.sync(surface);
            surface.draw_line(
                ctx.dc().position.to_kurbo(),
                self.scaled.to_kurbo(),
                &stroke,
            );
        }
        ctx.dc_mut().position = self.scaled;
        Ok(())
    }
}

// ---- closed shapes ----

macro_rules! rect_shape {
    ($name:ident, $opcode:expr, $path:expr) => {
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
        pub struct $name {
            pub rect: RawRect,
            #[serde(skip)]
            pub scaled: ScaledRect,
        }

        impl MetaCommand for $name {
            const OPCODE: u16 = $opcode;
            const NAME: &'static str = stringify!($name);

            fn decode(record: &RecordStore) -> WmfResult<Self> {
                record.require(4, "rectangle")?;
                Ok(Self {
                    rect: read_rect_brtl(&mut record.reader())?,
                    ..Self::default()
                })
            }

            fn encode(&self) -> WmfResult<RecordStore> {
                let mut w = ParamWriter::new(Self::OPCODE);
                write_rect_brtl(&mut w, self.rect);
                Ok(w.finish())
            }

            fn rescale(&mut self, scale: Scale) {
                self.scaled = scale.rect(self.rect);
            }

            fn replay(
                &self,
                scale: Scale,
                ctx: &mut ReplayContext,
                surface: &mut dyn DrawSurface,
            ) -> WmfResult<()> {
                let path: BezPath = ($path)(self.scaled);
                ctx.draw_shape(surface, &path, scale, true);
                Ok(())
            }
        }
    };
}

rect_shape!(Rectangle, opcode::RECTANGLE, rect_path);
rect_shape!(Ellipse, opcode::ELLIPSE, |r: ScaledRect| {
    kurbo::Ellipse::from_rect(r.to_kurbo()).to_path(CURVE_TOLERANCE)
});

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RoundRect {
    pub rect: RawRect,
    pub corner_width: i16,
    pub corner_height: i16,
    #[serde(skip)]
    pub scaled: ScaledRect,
    #[serde(skip)]
    pub scaled_corner: (i32, i32),
}

impl MetaCommand for RoundRect {
    const OPCODE: u16 = opcode::ROUND_RECT;
    const NAME: &'static str = "RoundRect";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(6, "corner size and rectangle")?;
        let mut r = record.reader();
        let corner_height = r.i16()?;
        let corner_width = r.i16()?;
        Ok(Self {
            rect: read_rect_brtl(&mut r)?,
            corner_width,
            corner_height,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        let mut w = ParamWriter::new(Self::OPCODE);
        w.i16(self.corner_height).i16(self.corner_width);
        write_rect_brtl(&mut w, self.rect);
        Ok(w.finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.rect(self.rect);
        self.scaled_corner = (
            scale.width(i32::from(self.corner_width)),
            scale.height(i32::from(self.corner_height)),
        );
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        // kurbo rounds with circular corners; use the smaller of the two ellipse radii.
        let radius = f64::from(self.scaled_corner.0.min(self.scaled_corner.1)) / 2.0;
        let path = kurbo::RoundedRect::from_rect(self.scaled.to_kurbo(), radius)
            .to_path(CURVE_TOLERANCE);
        ctx.draw_shape(surface, &path, scale, true);
        Ok(())
    }
}

// ---- arcs ----

/// Shared geometry of Arc, Chord and Pie: bounding box plus start/end radial points.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ArcGeometry {
    pub rect: RawRect,
    pub start: RawPoint,
    pub end: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledRect,
    #[serde(skip)]
    pub scaled_start: ScaledPoint,
    #[serde(skip)]
    pub scaled_end: ScaledPoint,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ArcClose {
    Open,
    Chord,
    Pie,
}

impl ArcGeometry {
    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(8, "arc end points and rectangle")?;
        let mut r = record.reader();
        let end = read_point_yx(&mut r)?;
        let start = read_point_yx(&mut r)?;
        Ok(Self {
            rect: read_rect_brtl(&mut r)?,
            start,
            end,
            ..Self::default()
        })
    }

    fn encode(&self, opcode: u16) -> RecordStore {
        let mut w = ParamWriter::new(opcode);
        w.i16(self.end.y)
            .i16(self.end.x)
            .i16(self.start.y)
            .i16(self.start.x);
        write_rect_brtl(&mut w, self.rect);
        w.finish()
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.rect(self.rect);
        self.scaled_start = scale.point(self.start);
        self.scaled_end = scale.point(self.end);
    }

    /// Counter-clockwise (on screen) from the start radial to the end radial.
    fn path(&self, close: ArcClose) -> BezPath {
        let bounds = self.scaled.to_kurbo();
        let center = bounds.center();
        let radii = Vec2::new(bounds.width() / 2.0, bounds.height() / 2.0);
        let angle = |p: ScaledPoint| {
            let v = p.to_kurbo() - center;
            // Angle on the unit circle that maps onto the ellipse point along this radial.
            (v.y / radii.y.max(f64::EPSILON)).atan2(v.x / radii.x.max(f64::EPSILON))
        };
        let start = angle(self.scaled_start);
        let end = angle(self.scaled_end);
        let mut sweep = end - start;
        if sweep >= 0.0 {
            sweep -= TAU;
        }
        let arc = kurbo::Arc::new(center, radii, start, sweep, 0.0);
        let first = center + Vec2::new(radii.x * start.cos(), radii.y * start.sin());

        let mut path = BezPath::new();
        if close == ArcClose::Pie {
            path.move_to(center);
            path.line_to(first);
        } else {
            path.move_to(first);
        }
        path.extend(arc.append_iter(CURVE_TOLERANCE));
        if close != ArcClose::Open {
            path.close_path();
        }
        path
    }
}

macro_rules! arc_shape {
    ($name:ident, $opcode:expr, $wire:literal, $close:expr) => {
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
        pub struct $name {
            #[serde(flatten)]
            pub geometry: ArcGeometry,
        }

        impl MetaCommand for $name {
            const OPCODE: u16 = $opcode;
            const NAME: &'static str = $wire;

            fn decode(record: &RecordStore) -> WmfResult<Self> {
                Ok(Self {
                    geometry: ArcGeometry::decode(record)?,
                })
            }

            fn encode(&self) -> WmfResult<RecordStore> {
                Ok(self.geometry.encode(Self::OPCODE))
            }

            fn rescale(&mut self, scale: Scale) {
                self.geometry.rescale(scale);
            }

            fn replay(
                &self,
                scale: Scale,
                ctx: &mut ReplayContext,
                surface: &mut dyn DrawSurface,
            ) -> WmfResult<()> {
                let close = $close;
                let path = self.geometry.path(close);
                ctx.draw_shape(surface, &path, scale, close != ArcClose::Open);
                Ok(())
            }
        }
    };
}

arc_shape!(EllipticArc, opcode::ARC, "Arc", ArcClose::Open);
arc_shape!(Chord, opcode::CHORD, "Chord", ArcClose::Chord);
arc_shape!(Pie, opcode::PIE, "Pie", ArcClose::Pie);

// ---- polygons ----

fn read_points(r: &mut ParamReader<'_>, count: usize) -> WmfResult<Vec<RawPoint>> {
    (0..count)
        .map(|_| {
            let x = r.i16()?;
            let y = r.i16()?;
            Ok(RawPoint::new(x, y))
        })
        .collect()
}

fn write_points(w: &mut ParamWriter, points: &[RawPoint]) {
    for p in points {
        w.i16(p.x).i16(p.y);
    }
}

fn point_count(opcode: u16, len: usize) -> WmfResult<u16> {
    u16::try_from(len)
        .map_err(|_| WmfError::malformed(opcode, format!("{len} points do not fit a record")))
}

macro_rules! point_list {
    ($name:ident, $opcode:expr, $close:literal) => {
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
        pub struct $name {
            pub points: Vec<RawPoint>,
            #[serde(skip)]
            pub scaled: Vec<ScaledPoint>,
        }

        impl MetaCommand for $name {
            const OPCODE: u16 = $opcode;
            const NAME: &'static str = stringify!($name);

            fn decode(record: &RecordStore) -> WmfResult<Self> {
                record.require(1, "point count")?;
                let mut r = record.reader();
                let count = usize::from(r.word()?);
                record.require(1 + count * 2, "points")?;
                Ok(Self {
                    points: read_points(&mut r, count)?,
                    ..Self::default()
                })
            }

            fn encode(&self) -> WmfResult<RecordStore> {
                let mut w = ParamWriter::new(Self::OPCODE);
                w.word(point_count(Self::OPCODE, self.points.len())?);
                write_points(&mut w, &self.points);
                Ok(w.finish())
            }

            fn rescale(&mut self, scale: Scale) {
                self.scaled = self.points.iter().map(|p| scale.point(*p)).collect();
            }

            fn replay(
                &self,
                scale: Scale,
                ctx: &mut ReplayContext,
                surface: &mut dyn DrawSurface,
            ) -> WmfResult<()> {
                if self.scaled.len() < 2 {
                    return Ok(());
                }
                let path = poly_path(&self.scaled, $close);
                ctx.draw_shape(surface, &path, scale, $close);
                Ok(())
            }
        }
    };
}

point_list!(Polygon, opcode::POLYGON, true);
point_list!(Polyline, opcode::POLYLINE, false);

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct PolyPolygon {
    pub polygons: Vec<Vec<RawPoint>>,
    #[serde(skip)]
    pub scaled: Vec<Vec<ScaledPoint>>,
}

impl MetaCommand for PolyPolygon {
    const OPCODE: u16 = opcode::POLY_POLYGON;
    const NAME: &'static str = "PolyPolygon";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "polygon count")?;
        let mut r = record.reader();
        let polygon_count = usize::from(r.word()?);
        record.require(1 + polygon_count, "polygon point counts")?;
        let counts = (0..polygon_count)
            .map(|_| r.word().map(usize::from))
            .collect::<WmfResult<Vec<_>>>()?;
        let total: usize = counts.iter().sum();
        record.require(1 + polygon_count + total * 2, "polygon points")?;
        let polygons = counts
            .into_iter()
            .map(|n| read_points(&mut r, n))
            .collect::<WmfResult<Vec<_>>>()?;
        Ok(Self {
            polygons,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        let mut w = ParamWriter::new(Self::OPCODE);
        w.word(point_count(Self::OPCODE, self.polygons.len())?);
        for poly in &self.polygons {
            w.word(point_count(Self::OPCODE, poly.len())?);
        }
        for poly in &self.polygons {
            write_points(&mut w, poly);
        }
        Ok(w.finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = self
            .polygons
            .iter()
            .map(|poly| poly.iter().map(|p| scale.point(*p)).collect())
            .collect();
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        let mut path = BezPath::new();
        for poly in self.scaled.iter().filter(|p| p.len() >= 2) {
            path.extend(poly_path(poly, true).elements().iter().copied());
        }
        ctx.draw_shape(surface, &path, scale, true);
        Ok(())
    }
}

// ---- pixels and fills ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetPixel {
    pub color: Color,
    pub at: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledPoint,
}

impl MetaCommand for SetPixel {
    const OPCODE: u16 = opcode::SET_PIXEL;
    const NAME: &'static str = "SetPixel";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(4, "color and point")?;
        let mut r = record.reader();
        let color = read_color(&mut r)?;
        Ok(Self {
            color,
            at: read_point_yx(&mut r)?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .long(self.color.to_colorref())
            .i16(self.at.y)
            .i16(self.at.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.point(self.at);
    }

    /// Paints one pixel-sized square in the record's own color.
    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        let size = ScaledRect {
            x: self.scaled.x,
            y: self.scaled.y,
            width: scale.width(1),
            height: scale.height(1),
        };
        ctx.sync(surface);
        surface.fill_path(
            &rect_path(size),
            &Paint::Solid(ctx.resolve_color(self.color)),
            ctx.dc().fill_rule(),
        );
        Ok(())
    }
}

/// FloodFill needs to read back device pixels; replay keeps the record but draws nothing.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FloodFill {
    pub color: Color,
    pub at: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledPoint,
}

impl MetaCommand for FloodFill {
    const OPCODE: u16 = opcode::FLOOD_FILL;
    const NAME: &'static str = "FloodFill";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(4, "color and point")?;
        let mut r = record.reader();
        let color = read_color(&mut r)?;
        Ok(Self {
            color,
            at: read_point_yx(&mut r)?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .long(self.color.to_colorref())
            .i16(self.at.y)
            .i16(self.at.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.point(self.at);
    }

    fn replay(&self, _: Scale, _: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        tracing::debug!(x = self.scaled.x, y = self.scaled.y, "flood fill skipped");
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ExtFloodFill {
    pub mode: u16,
    pub color: Color,
    pub at: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledPoint,
}

impl MetaCommand for ExtFloodFill {
    const OPCODE: u16 = opcode::EXT_FLOOD_FILL;
    const NAME: &'static str = "ExtFloodFill";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(5, "mode, color and point")?;
        let mut r = record.reader();
        let mode = r.word()?;
        let color = read_color(&mut r)?;
        Ok(Self {
            mode,
            color,
            at: read_point_yx(&mut r)?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .word(self.mode)
            .long(self.color.to_colorref())
            .i16(self.at.y)
            .i16(self.at.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.point(self.at);
    }

    fn replay(&self, _: Scale, _: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        tracing::debug!(x = self.scaled.x, y = self.scaled.y, "flood fill skipped");
        Ok(())
    }
}

pub const PATCOPY: u32 = 0x00F0_0021;
pub const BLACKNESS: u32 = 0x0000_0042;
pub const WHITENESS: u32 = 0x00FF_0062;
pub const DSTINVERT: u32 = 0x0055_0009;

/// Fill `dest` the way a pattern blit with `rop` would, using the current brush.
pub(crate) fn pattern_blit(
    rop: u32,
    dest: ScaledRect,
    ctx: &ReplayContext,
    surface: &mut dyn DrawSurface,
) {
    let paint = match rop {
        BLACKNESS => Some(Paint::Solid(Color::BLACK)),
        WHITENESS => Some(Paint::Solid(Color::WHITE)),
        DSTINVERT => None,
        _ => ctx.paint_for(&ctx.dc().brush),
    };
    if let Some(paint) = paint {
        ctx.sync(surface);
        surface.fill_path(&rect_path(dest), &paint, ctx.dc().fill_rule());
    }
}

/// Destination given as origin plus signed extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RawExtentRect {
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
}

impl RawExtentRect {
    pub fn scaled(self, scale: Scale) -> ScaledRect {
        let (x0, x1) = (i32::from(self.x), i32::from(self.x) + i32::from(self.width));
        let (y0, y1) = (i32::from(self.y), i32::from(self.y) + i32::from(self.height));
        ScaledRect {
            x: scale_coord(x0.min(x1), scale.x),
            y: scale_coord(y0.min(y1), scale.y),
            width: scale.width(i32::from(self.width)),
            height: scale.height(i32::from(self.height)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct PatBlt {
    pub rop: u32,
    pub dest: RawExtentRect,
    #[serde(skip)]
    pub scaled: ScaledRect,
}

impl MetaCommand for PatBlt {
    const OPCODE: u16 = opcode::PAT_BLT;
    const NAME: &'static str = "PatBlt";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(6, "raster operation and destination")?;
        let mut r = record.reader();
        let rop = r.long()?;
        let height = r.i16()?;
        let width = r.i16()?;
        let y = r.i16()?;
        let x = r.i16()?;
        Ok(Self {
            rop,
            dest: RawExtentRect {
                x,
                y,
                width,
                height,
            },
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .long(self.rop)
            .i16(self.dest.height)
            .i16(self.dest.width)
            .i16(self.dest.y)
            .i16(self.dest.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = self.dest.scaled(scale);
    }

    fn replay(
        &self,
        _: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        pattern_blit(self.rop, self.scaled, ctx, surface);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/drawing.rs"]
mod tests;
