use std::sync::Arc;

use kurbo::Shape;

use crate::{
    command::{
        MetaCommand,
        drawing::{read_point_yx, read_rect_brtl, write_rect_brtl},
    },
    foundation::core::BezPath,
    foundation::error::WmfResult,
    foundation::math::{RawPoint, RawRect, Scale, ScaledPoint, ScaledRect},
    gdi::objects::{GdiObject, Region},
    record::{
        opcode,
        store::{ParamWriter, RecordStore},
    },
    replay::{
        context::ReplayContext,
        surface::{DrawSurface, FillRule},
    },
};

/// Region object type tag written by CreateRegion.
pub const REGION_OBJECT_TYPE: i16 = 0x0006;

fn region_path(bounds: ScaledRect) -> BezPath {
    bounds.to_kurbo().to_path(0.1)
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CreateRegion {
    pub next_in_chain: i16,
    pub object_type: i16,
    pub object_count: u32,
    pub region_size: i16,
    pub scan_count: i16,
    pub max_scan: i16,
    pub bounds: RawRect,
    /// Scan-line data, kept verbatim; only the bounding box is interpreted.
    pub scans: Vec<u16>,
}

impl Default for CreateRegion {
    fn default() -> Self {
        Self {
            next_in_chain: 0,
            object_type: REGION_OBJECT_TYPE,
            object_count: 0,
            region_size: 0,
            scan_count: 0,
            max_scan: 0,
            bounds: RawRect::default(),
            scans: Vec::new(),
        }
    }
}

impl MetaCommand for CreateRegion {
    const OPCODE: u16 = opcode::CREATE_REGION;
    const NAME: &'static str = "CreateRegion";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(11, "region header")?;
        let mut r = record.reader();
        let next_in_chain = r.i16()?;
        let object_type = r.i16()?;
        let object_count = r.long()?;
        let region_size = r.i16()?;
        let scan_count = r.i16()?;
        let max_scan = r.i16()?;
        let left = r.i16()?;
        let top = r.i16()?;
        let right = r.i16()?;
        let bottom = r.i16()?;
        let scans = record.params()[r.position()..].to_vec();
        Ok(Self {
            next_in_chain,
            object_type,
            object_count,
            region_size,
            scan_count,
            max_scan,
            bounds: RawRect::new(left, top, right, bottom),
            scans,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        let mut w = ParamWriter::new(Self::OPCODE);
        w.i16(self.next_in_chain)
            .i16(self.object_type)
            .long(self.object_count)
            .i16(self.region_size)
            .i16(self.scan_count)
            .i16(self.max_scan)
            .i16(self.bounds.left)
            .i16(self.bounds.top)
            .i16(self.bounds.right)
            .i16(self.bounds.bottom);
        for s in &self.scans {
            w.word(*s);
        }
        Ok(w.finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.create_object(GdiObject::Region(Arc::new(Region {
            bounds: self.bounds,
        })))?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FillRegion {
    pub region: u16,
    pub brush: u16,
}

impl MetaCommand for FillRegion {
    const OPCODE: u16 = opcode::FILL_REGION;
    const NAME: &'static str = "FillRegion";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "region and brush handles")?;
        Ok(Self {
            region: record.word(0)?,
            brush: record.word(1)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .word(self.region)
            .word(self.brush)
            .finish())
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        let region = ctx.region(self.region)?;
        let brush = ctx.brush(self.brush)?;
        if let Some(paint) = ctx.paint_for(&brush) {
            ctx.sync(surface);
            surface.fill_path(
                &region_path(scale.rect(region.bounds)),
                &paint,
                FillRule::NonZero,
            );
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameRegion {
    pub region: u16,
    pub brush: u16,
    pub height: i16,
    pub width: i16,
    #[serde(skip)]
    pub scaled_width: i32,
    #[serde(skip)]
    pub scaled_height: i32,
}

impl MetaCommand for FrameRegion {
    const OPCODE: u16 = opcode::FRAME_REGION;
    const NAME: &'static str = "FrameRegion";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(4, "handles and frame size")?;
        Ok(Self {
            region: record.word(0)?,
            brush: record.word(1)?,
            height: record.i16_at(2)?,
            width: record.i16_at(3)?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .word(self.region)
            .word(self.brush)
            .i16(self.height)
            .i16(self.width)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled_width = scale.width(i32::from(self.width));
        self.scaled_height = scale.height(i32::from(self.height));
    }

    /// Fills a border of the frame size just inside the region's bounding box.
    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        let region = ctx.region(self.region)?;
        let brush = ctx.brush(self.brush)?;
        let Some(paint) = ctx.paint_for(&brush) else {
            return Ok(());
        };
        let outer = scale.rect(region.bounds);
        let inner = ScaledRect {
            x: outer.x + self.scaled_width,
            y: outer.y + self.scaled_height,
            width: (outer.width - 2 * self.scaled_width).max(0),
            height: (outer.height - 2 * self.scaled_height).max(0),
        };
        let mut path = region_path(outer);
        if inner.width > 0 && inner.height > 0 {
            path.extend(region_path(inner).elements().iter().copied());
        }
        ctx.sync(surface);
        surface.fill_path(&path, &paint, FillRule::EvenOdd);
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct PaintRegion {
    pub region: u16,
}

impl MetaCommand for PaintRegion {
    const OPCODE: u16 = opcode::PAINT_REGION;
    const NAME: &'static str = "PaintRegion";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "region handle")?;
        Ok(Self {
            region: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.region).finish())
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        let region = ctx.region(self.region)?;
        if let Some(paint) = ctx.paint_for(&ctx.dc().brush) {
            ctx.sync(surface);
            surface.fill_path(
                &region_path(scale.rect(region.bounds)),
                &paint,
                FillRule::NonZero,
            );
        }
        Ok(())
    }
}

/// Inverts destination pixels; checked for a valid handle but not drawn.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct InvertRegion {
    pub region: u16,
}

impl MetaCommand for InvertRegion {
    const OPCODE: u16 = opcode::INVERT_REGION;
    const NAME: &'static str = "InvertRegion";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "region handle")?;
        Ok(Self {
            region: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.region).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.region(self.region)?;
        tracing::debug!(handle = self.region, "region inversion not drawn");
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SelectClipRegion {
    pub region: u16,
}

impl MetaCommand for SelectClipRegion {
    const OPCODE: u16 = opcode::SELECT_CLIP_REGION;
    const NAME: &'static str = "SelectClipRegion";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "region handle")?;
        Ok(Self {
            region: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.region).finish())
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        _: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        let region = ctx.region(self.region)?;
        ctx.dc_mut().clip = Some(scale.rect(region.bounds));
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct OffsetClipRgn {
    pub offset: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledPoint,
}

impl MetaCommand for OffsetClipRgn {
    const OPCODE: u16 = opcode::OFFSET_CLIP_RGN;
    const NAME: &'static str = "OffsetClipRgn";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "offset")?;
        Ok(Self {
            offset: read_point_yx(&mut record.reader())?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .i16(self.offset.y)
            .i16(self.offset.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.point(self.offset);
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.offset_clip(self.scaled.x, self.scaled.y);
        Ok(())
    }
}

macro_rules! clip_rect {
    ($name:ident, $opcode:expr, $apply:ident) => {
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
                _: Scale,
                ctx: &mut ReplayContext,
                _: &mut dyn DrawSurface,
            ) -> WmfResult<()> {
                ctx.$apply(self.scaled);
                Ok(())
            }
        }
    };
}

clip_rect!(ExcludeClipRect, opcode::EXCLUDE_CLIP_RECT, exclude_clip);
clip_rect!(IntersectClipRect, opcode::INTERSECT_CLIP_RECT, intersect_clip);

#[cfg(test)]
#[path = "../../tests/unit/command/region.rs"]
mod tests;
