use std::sync::Arc;

use kurbo::Shape;

use crate::{
    command::{
        MetaCommand,
        drawing::{read_color, read_point_yx},
    },
    foundation::core::Color,
    foundation::error::{WmfError, WmfResult},
    foundation::math::{RawPoint, RawRect, Scale, ScaledPoint, ScaledRect},
    record::{
        opcode,
        store::{ParamWriter, RecordStore, latin1_to_string, string_to_latin1, string_words},
    },
    replay::{
        context::{OPAQUE, ReplayContext},
        surface::{DrawSurface, FillRule, Paint, TextRun},
    },
};

pub const TA_UPDATECP: u16 = 0x0001;
pub const ETO_OPAQUE: u16 = 0x0002;
pub const ETO_CLIPPED: u16 = 0x0004;

// ---- text state ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetTextColor {
    pub color: Color,
}

impl MetaCommand for SetTextColor {
    const OPCODE: u16 = opcode::SET_TEXT_COLOR;
    const NAME: &'static str = "SetTextColor";

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
        ctx.dc_mut().text_color = self.color;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetTextAlign {
    pub align: u16,
}

impl MetaCommand for SetTextAlign {
    const OPCODE: u16 = opcode::SET_TEXT_ALIGN;
    const NAME: &'static str = "SetTextAlign";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "alignment")?;
        Ok(Self {
            align: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.align).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.dc_mut().text_align = self.align;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetTextCharExtra {
    pub extra: i16,
}

impl MetaCommand for SetTextCharExtra {
    const OPCODE: u16 = opcode::SET_TEXT_CHAR_EXTRA;
    const NAME: &'static str = "SetTextCharExtra";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "extra spacing")?;
        Ok(Self {
            extra: record.i16_at(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).i16(self.extra).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.dc_mut().text_char_extra = self.extra;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetTextJustification {
    pub break_count: u16,
    pub break_extra: i16,
}

impl MetaCommand for SetTextJustification {
    const OPCODE: u16 = opcode::SET_TEXT_JUSTIFICATION;
    const NAME: &'static str = "SetTextJustification";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "break count and extra")?;
        Ok(Self {
            break_count: record.word(0)?,
            break_extra: record.i16_at(1)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .word(self.break_count)
            .i16(self.break_extra)
            .finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        let dc = ctx.dc_mut();
        dc.break_count = self.break_count;
        dc.break_extra = self.break_extra;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetMapperFlags {
    pub flags: u32,
}

impl MetaCommand for SetMapperFlags {
    const OPCODE: u16 = opcode::SET_MAPPER_FLAGS;
    const NAME: &'static str = "SetMapperFlags";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "mapper flags")?;
        Ok(Self {
            flags: record.long(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).long(self.flags).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.dc_mut().mapper_flags = self.flags;
        Ok(())
    }
}

// ---- text output ----

fn text_run(
    ctx: &ReplayContext,
    scale: Scale,
    at: ScaledPoint,
    text: &str,
    advances: Vec<f64>,
) -> TextRun {
    let dc = ctx.dc();
    let origin = if dc.text_align & TA_UPDATECP != 0 {
        dc.position
    } else {
        at
    };
    TextRun {
        origin: origin.to_kurbo(),
        text: text.to_string(),
        font: Arc::clone(&dc.font),
        size: f64::from(scale.height(i32::from(dc.font.height))),
        color: ctx.resolve_color(dc.text_color),
        background: (dc.bk_mode == OPAQUE).then(|| ctx.resolve_color(dc.bk_color)),
        align: dc.text_align,
        advances,
    }
}

fn text_len(opcode: u16, text: &str) -> WmfResult<u16> {
    u16::try_from(text.chars().count())
        .map_err(|_| WmfError::malformed(opcode, "text is longer than a record can carry"))
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct TextOut {
    pub text: String,
    pub at: RawPoint,
    #[serde(skip)]
    pub scaled: ScaledPoint,
}

impl MetaCommand for TextOut {
    const OPCODE: u16 = opcode::TEXT_OUT;
    const NAME: &'static str = "TextOut";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "string length")?;
        let mut r = record.reader();
        let len = usize::from(r.word()?);
        record.require(1 + string_words(len) + 2, "text and position")?;
        let text = latin1_to_string(&r.bytes(len)?);
        Ok(Self {
            text,
            at: read_point_yx(&mut r)?,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .word(text_len(Self::OPCODE, &self.text)?)
            .bytes(&string_to_latin1(&self.text))
            .i16(self.at.y)
            .i16(self.at.x)
            .finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled = scale.point(self.at);
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        ctx.sync(surface);
        surface.draw_text(&text_run(ctx, scale, self.scaled, &self.text, Vec::new()));
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ExtTextOut {
    pub at: RawPoint,
    pub options: u16,
    pub rect: Option<RawRect>,
    pub text: String,
    /// Per-character advance widths; empty when the record has none.
    pub dx: Vec<i16>,
    #[serde(skip)]
    pub scaled_at: ScaledPoint,
    #[serde(skip)]
    pub scaled_rect: Option<ScaledRect>,
    #[serde(skip)]
    pub scaled_dx: Vec<i32>,
}

impl ExtTextOut {
    /// Whether a record with `params` words carries the rectangle block.
    ///
    /// Clipped output always has one. Opaque-only output has one when the record is long
    /// enough to hold it in front of the string.
    fn has_rect(options: u16, len: usize, params: usize) -> bool {
        options & ETO_CLIPPED != 0
            || (options & ETO_OPAQUE != 0 && params >= 4 + 4 + string_words(len))
    }
}

impl MetaCommand for ExtTextOut {
    const OPCODE: u16 = opcode::EXT_TEXT_OUT;
    const NAME: &'static str = "ExtTextOut";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(4, "position, length and options")?;
        let mut r = record.reader();
        let at = read_point_yx(&mut r)?;
        let len = usize::from(r.word()?);
        let options = r.word()?;
        let rect = if Self::has_rect(options, len, record.param_count()) {
            let left = r.i16()?;
            let top = r.i16()?;
            let right = r.i16()?;
            let bottom = r.i16()?;
            Some(RawRect::new(left, top, right, bottom))
        } else {
            None
        };
        let text = latin1_to_string(&r.bytes(len)?);
        let dx = if len > 0 && r.remaining() >= len {
            (0..len).map(|_| r.i16()).collect::<WmfResult<Vec<_>>>()?
        } else {
            Vec::new()
        };
        Ok(Self {
            at,
            options,
            rect,
            text,
            dx,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        let mut w = ParamWriter::new(Self::OPCODE);
        w.i16(self.at.y)
            .i16(self.at.x)
            .word(text_len(Self::OPCODE, &self.text)?)
            .word(self.options);
        let clipped = self.options & ETO_CLIPPED != 0;
        let opaque = self.options & ETO_OPAQUE != 0;
        match self.rect {
            Some(r) if clipped || opaque => {
                w.i16(r.left).i16(r.top).i16(r.right).i16(r.bottom);
            }
            None if !clipped => {
                // Four or more advances after an opaque string read back as a rectangle.
                if opaque && self.dx.len() >= 4 {
                    return Err(WmfError::malformed(
                        Self::OPCODE,
                        "opaque text without a rectangle cannot carry four or more advances",
                    ));
                }
            }
            _ => {
                return Err(WmfError::malformed(
                    Self::OPCODE,
                    "rectangle presence does not match the options",
                ));
            }
        }
        w.bytes(&string_to_latin1(&self.text));
        for d in &self.dx {
            w.i16(*d);
        }
        Ok(w.finish())
    }

    fn rescale(&mut self, scale: Scale) {
        self.scaled_at = scale.point(self.at);
        self.scaled_rect = self.rect.map(|r| scale.rect(r));
        self.scaled_dx = self
            .dx
            .iter()
            .map(|d| scale.width(i32::from(*d)))
            .collect();
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        ctx.sync(surface);
        if let Some(rect) = self.scaled_rect {
            if self.options & ETO_OPAQUE != 0 {
                let bk = ctx.resolve_color(ctx.dc().bk_color);
                surface.fill_path(
                    &rect.to_kurbo().to_path(0.1),
                    &Paint::Solid(bk),
                    FillRule::NonZero,
                );
            }
            if self.options & ETO_CLIPPED != 0 {
                let clip = match ctx.dc().clip {
                    Some(c) => c.to_kurbo().intersect(rect.to_kurbo()),
                    None => rect.to_kurbo(),
                };
                surface.set_clip(Some(clip));
            }
        }
        if !self.text.is_empty() {
            let advances = self.scaled_dx.iter().map(|d| f64::from(*d)).collect();
            surface.draw_text(&text_run(ctx, scale, self.scaled_at, &self.text, advances));
        }
        if self.options & ETO_CLIPPED != 0 && self.scaled_rect.is_some() {
            ctx.sync(surface);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/text.rs"]
mod tests;
