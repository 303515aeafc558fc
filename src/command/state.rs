use crate::{
    command::{
        MetaCommand,
        drawing::{read_color, read_point_yx},
    },
    foundation::core::Color,
    foundation::error::{WmfError, WmfResult},
    foundation::math::{RawPoint, Scale, ScaledPoint},
    record::{
        opcode,
        store::{ParamWriter, RecordStore},
    },
    replay::{
        context::{DcState, Extent, ReplayContext},
        surface::DrawSurface,
    },
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Eof {}

impl MetaCommand for Eof {
    const OPCODE: u16 = opcode::EOF;
    const NAME: &'static str = "Eof";

    fn decode(_: &RecordStore) -> WmfResult<Self> {
        Ok(Self {})
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(RecordStore::new(Self::OPCODE, 0))
    }

    fn replay(&self, _: Scale, _: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        Ok(())
    }
}

// ---- DC stack ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SaveDc {}

impl MetaCommand for SaveDc {
    const OPCODE: u16 = opcode::SAVE_DC;
    const NAME: &'static str = "SaveDC";

    fn decode(_: &RecordStore) -> WmfResult<Self> {
        Ok(Self {})
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(RecordStore::new(Self::OPCODE, 0))
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.save();
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RestoreDc {
    pub saved_dc: i16,
}

impl MetaCommand for RestoreDc {
    const OPCODE: u16 = opcode::RESTORE_DC;
    const NAME: &'static str = "RestoreDC";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "saved DC id")?;
        Ok(Self {
            saved_dc: record.i16_at(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).i16(self.saved_dc).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.restore(self.saved_dc)
    }
}

// ---- single-value modes ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetBkColor {
    pub color: Color,
}

impl MetaCommand for SetBkColor {
    const OPCODE: u16 = opcode::SET_BK_COLOR;
    const NAME: &'static str = "SetBkColor";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "color")?;
        Ok(Self {
            color: read_color(&mut record.reader())?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .long(self.color.to_colorref())
            .finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.dc_mut().bk_color = self.color;
        Ok(())
    }
}

/// Records carrying one mode word (and sometimes an ignored reserved word).
macro_rules! mode_setter {
    ($name:ident, $opcode:expr, $wire:literal, $field:ident) => {
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
        pub struct $name {
            pub mode: u16,
        }

        impl MetaCommand for $name {
            const OPCODE: u16 = $opcode;
            const NAME: &'static str = $wire;

            fn decode(record: &RecordStore) -> WmfResult<Self> {
                record.require(1, "mode")?;
                Ok(Self {
                    mode: record.word(0)?,
                })
            }

            fn encode(&self) -> WmfResult<RecordStore> {
                Ok(ParamWriter::new(Self::OPCODE).word(self.mode).finish())
            }

            fn replay(
                &self,
                _: Scale,
                ctx: &mut ReplayContext,
                _: &mut dyn DrawSurface,
            ) -> WmfResult<()> {
                ctx.dc_mut().$field = self.mode;
                Ok(())
            }
        }
    };
}

mode_setter!(SetBkMode, opcode::SET_BK_MODE, "SetBkMode", bk_mode);
mode_setter!(SetMapMode, opcode::SET_MAP_MODE, "SetMapMode", map_mode);
mode_setter!(SetRop2, opcode::SET_ROP2, "SetROP2", rop2);
mode_setter!(SetRelAbs, opcode::SET_REL_ABS, "SetRelAbs", rel_abs);
mode_setter!(
    SetPolyFillMode,
    opcode::SET_POLY_FILL_MODE,
    "SetPolyFillMode",
    poly_fill_mode
);
mode_setter!(
    SetStretchBltMode,
    opcode::SET_STRETCH_BLT_MODE,
    "SetStretchBltMode",
    stretch_blt_mode
);

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetLayout {
    pub layout: u32,
}

impl MetaCommand for SetLayout {
    const OPCODE: u16 = opcode::SET_LAYOUT;
    const NAME: &'static str = "SetLayout";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "layout")?;
        Ok(Self {
            layout: record.long(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).long(self.layout).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.dc_mut().layout = self.layout;
        Ok(())
    }
}

// ---- window / viewport mapping ----

macro_rules! mapping_point {
    ($name:ident, $opcode:expr, $apply:expr) => {
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
        pub struct $name {
            pub point: RawPoint,
            #[serde(skip)]
            pub scaled: ScaledPoint,
        }

        impl MetaCommand for $name {
            const OPCODE: u16 = $opcode;
            const NAME: &'static str = stringify!($name);

            fn decode(record: &RecordStore) -> WmfResult<Self> {
                record.require(2, "point")?;
                Ok(Self {
                    point: read_point_yx(&mut record.reader())?,
                    ..Self::default()
                })
            }

            fn encode(&self) -> WmfResult<RecordStore> {
                Ok(ParamWriter::new(Self::OPCODE)
                    .i16(self.point.y)
                    .i16(self.point.x)
                    .finish())
            }

            fn rescale(&mut self, scale: Scale) {
                self.scaled = scale.point(self.point);
            }

            fn replay(
                &self,
                _: Scale,
                ctx: &mut ReplayContext,
                _: &mut dyn DrawSurface,
            ) -> WmfResult<()> {
                let apply: fn(&mut DcState, RawPoint, ScaledPoint) = $apply;
                apply(ctx.dc_mut(), self.point, self.scaled);
                Ok(())
            }
        }
    };
}

// Origins live in scaled space. Extents stay raw: only their ratio reaches the transform.
mapping_point!(SetWindowOrg, opcode::SET_WINDOW_ORG, |dc, _, p| dc.window_org = p);
mapping_point!(SetViewportOrg, opcode::SET_VIEWPORT_ORG, |dc, _, p| dc.viewport_org = p);
mapping_point!(SetWindowExt, opcode::SET_WINDOW_EXT, |dc, raw, _| {
    dc.window_ext = Some(Extent::from(raw));
});
mapping_point!(SetViewportExt, opcode::SET_VIEWPORT_EXT, |dc, raw, _| {
    dc.viewport_ext = Some(Extent::from(raw));
});
mapping_point!(OffsetWindowOrg, opcode::OFFSET_WINDOW_ORG, |dc, _, p| {
    dc.window_org.x += p.x;
    dc.window_org.y += p.y;
});
mapping_point!(OffsetViewportOrg, opcode::OFFSET_VIEWPORT_ORG, |dc, _, p| {
    dc.viewport_org.x += p.x;
    dc.viewport_org.y += p.y;
});

/// Multiply an extent by `num / denom` per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExtentScale {
    pub x_num: i16,
    pub x_denom: i16,
    pub y_num: i16,
    pub y_denom: i16,
}

impl Default for ExtentScale {
    fn default() -> Self {
        Self {
            x_num: 1,
            x_denom: 1,
            y_num: 1,
            y_denom: 1,
        }
    }
}

impl ExtentScale {
    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(4, "scale factors")?;
        let mut r = record.reader();
        let y_denom = r.i16()?;
        let y_num = r.i16()?;
        let x_denom = r.i16()?;
        let x_num = r.i16()?;
        if x_denom == 0 || y_denom == 0 {
            return Err(WmfError::malformed(record.opcode(), "zero scale denominator"));
        }
        Ok(Self {
            x_num,
            x_denom,
            y_num,
            y_denom,
        })
    }

    fn encode(&self, opcode: u16) -> RecordStore {
        ParamWriter::new(opcode)
            .i16(self.y_denom)
            .i16(self.y_num)
            .i16(self.x_denom)
            .i16(self.x_num)
            .finish()
    }

    /// Scaled extent, saturating at the `i32` range.
    fn apply(&self, ext: Extent) -> Extent {
        let axis = |v: i32, num: i16, denom: i16| {
            let scaled = i64::from(v) * i64::from(num) / i64::from(denom);
            scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        };
        Extent::new(
            axis(ext.width, self.x_num, self.x_denom),
            axis(ext.height, self.y_num, self.y_denom),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ScaleWindowExt {
    #[serde(flatten)]
    pub factors: ExtentScale,
}

impl MetaCommand for ScaleWindowExt {
    const OPCODE: u16 = opcode::SCALE_WINDOW_EXT;
    const NAME: &'static str = "ScaleWindowExt";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        Ok(Self {
            factors: ExtentScale::decode(record)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(self.factors.encode(Self::OPCODE))
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        let dc = ctx.dc_mut();
        dc.window_ext = dc.window_ext.map(|e| self.factors.apply(e));
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ScaleViewportExt {
    #[serde(flatten)]
    pub factors: ExtentScale,
}

impl MetaCommand for ScaleViewportExt {
    const OPCODE: u16 = opcode::SCALE_VIEWPORT_EXT;
    const NAME: &'static str = "ScaleViewportExt";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        Ok(Self {
            factors: ExtentScale::decode(record)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(self.factors.encode(Self::OPCODE))
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        let dc = ctx.dc_mut();
        dc.viewport_ext = dc.viewport_ext.map(|e| self.factors.apply(e));
        Ok(())
    }
}

// ---- escapes ----

/// Printer escape. Kept for re-encoding; replay ignores it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Escape {
    pub function: u16,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl MetaCommand for Escape {
    const OPCODE: u16 = opcode::ESCAPE;
    const NAME: &'static str = "Escape";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "escape function and byte count")?;
        let mut r = record.reader();
        let function = r.word()?;
        let len = usize::from(r.word()?);
        Ok(Self {
            function,
            data: r.bytes(len)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        let len = u16::try_from(self.data.len())
            .map_err(|_| WmfError::malformed(Self::OPCODE, "escape payload too large"))?;
        Ok(ParamWriter::new(Self::OPCODE)
            .word(self.function)
            .word(len)
            .bytes(&self.data)
            .finish())
    }

    fn replay(&self, _: Scale, _: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        tracing::trace!(function = self.function, "escape ignored");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/state.rs"]
mod tests;
