use std::sync::Arc;

use crate::{
    bitmap::decode::DecodedBitmap,
    command::{MetaCommand, bitmap::Bitmap16, drawing::read_color},
    foundation::core::Color,
    foundation::error::{WmfError, WmfResult},
    foundation::math::Scale,
    gdi::objects::{Brush, BrushStyle, Font, GdiObject, HatchStyle, Palette, Pen},
    record::{
        opcode,
        store::{ParamWriter, RecordStore, latin1_to_string, string_to_latin1},
    },
    replay::{context::ReplayContext, surface::DrawSurface},
};

/// Bytes reserved for the face name in a LOGFONT, terminator included.
pub const FACE_NAME_BYTES: usize = 32;
/// Version word that opens every LOGPALETTE.
pub const PALETTE_VERSION: u16 = 0x0300;

// ---- pens, brushes, fonts ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CreatePenIndirect {
    pub pen: Pen,
    /// The unused y component of the LOGPEN width point.
    pub width_y: i16,
}

impl MetaCommand for CreatePenIndirect {
    const OPCODE: u16 = opcode::CREATE_PEN_INDIRECT;
    const NAME: &'static str = "CreatePenIndirect";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(5, "LOGPEN")?;
        let mut r = record.reader();
        let style = r.word()?;
        let width = r.i16()?;
        let width_y = r.i16()?;
        let color = read_color(&mut r)?;
        Ok(Self {
            pen: Pen {
                style,
                width,
                color,
            },
            width_y,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .word(self.pen.style)
            .i16(self.pen.width)
            .i16(self.width_y)
            .long(self.pen.color.to_colorref())
            .finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.create_object(GdiObject::Pen(Arc::new(self.pen.clone())))?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CreateBrushIndirect {
    pub style: u16,
    pub color: Color,
    pub hatch: u16,
}

impl MetaCommand for CreateBrushIndirect {
    const OPCODE: u16 = opcode::CREATE_BRUSH_INDIRECT;
    const NAME: &'static str = "CreateBrushIndirect";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(4, "LOGBRUSH")?;
        let mut r = record.reader();
        let style = r.word()?;
        let color = read_color(&mut r)?;
        let hatch = r.word()?;
        let kind = BrushStyle::from_u16(style).ok_or_else(|| {
            WmfError::malformed(Self::OPCODE, format!("unknown brush style {style}"))
        })?;
        if kind == BrushStyle::Hatched && HatchStyle::from_u16(hatch).is_none() {
            return Err(WmfError::malformed(
                Self::OPCODE,
                format!("unknown hatch style {hatch}"),
            ));
        }
        Ok(Self {
            style,
            color,
            hatch,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE)
            .word(self.style)
            .long(self.color.to_colorref())
            .word(self.hatch)
            .finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        let brush = match BrushStyle::from_u16(self.style) {
            Some(BrushStyle::Null) => Brush::Null,
            Some(BrushStyle::Hatched) => match HatchStyle::from_u16(self.hatch) {
                Some(hatch) => Brush::Hatched {
                    hatch,
                    color: self.color,
                },
                None => Brush::Solid(self.color),
            },
            // A LOGBRUSH cannot carry pattern bits; pattern styles fall back to the color.
            _ => Brush::Solid(self.color),
        };
        ctx.create_object(GdiObject::Brush(Arc::new(brush)))?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CreateFontIndirect {
    pub font: Font,
}

impl MetaCommand for CreateFontIndirect {
    const OPCODE: u16 = opcode::CREATE_FONT_INDIRECT;
    const NAME: &'static str = "CreateFontIndirect";

    /// Height 0 becomes 10 and negative (character) heights use their magnitude.
    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(9, "LOGFONT")?;
        let mut r = record.reader();
        let height = match r.i16()? {
            0 => 10,
            h => h.saturating_abs(),
        };
        let width = r.i16()?;
        let escapement = r.i16()?;
        let orientation = r.i16()?;
        let weight = r.i16()?;
        let [italic, underline] = r.word()?.to_le_bytes();
        let [strike_out, charset] = r.word()?.to_le_bytes();
        let [out_precision, clip_precision] = r.word()?.to_le_bytes();
        let [quality, pitch_and_family] = r.word()?.to_le_bytes();
        let face = r.rest_bytes()?;
        // The last LOGFONT byte is the terminator even when the writer left it out.
        let face_name = latin1_to_string(&face[..face.len().min(FACE_NAME_BYTES - 1)]);
        Ok(Self {
            font: Font {
                face_name,
                height,
                width,
                escapement,
                orientation,
                weight,
                italic: italic != 0,
                underline: underline != 0,
                strike_out: strike_out != 0,
                charset,
                out_precision,
                clip_precision,
                quality,
                pitch_and_family,
            },
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        let f = &self.font;
        let mut face = string_to_latin1(&f.face_name);
        face.truncate(FACE_NAME_BYTES - 1);
        face.resize(FACE_NAME_BYTES, 0);
        Ok(ParamWriter::new(Self::OPCODE)
            .i16(f.height)
            .i16(f.width)
            .i16(f.escapement)
            .i16(f.orientation)
            .i16(f.weight)
            .word(u16::from_le_bytes([u8::from(f.italic), u8::from(f.underline)]))
            .word(u16::from_le_bytes([u8::from(f.strike_out), f.charset]))
            .word(u16::from_le_bytes([f.out_precision, f.clip_precision]))
            .word(u16::from_le_bytes([f.quality, f.pitch_and_family]))
            .bytes(&face)
            .finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.create_object(GdiObject::Font(Arc::new(self.font.clone())))?;
        Ok(())
    }
}

// ---- pattern brushes ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CreatePatternBrush {
    pub bitmap: Bitmap16,
}

impl MetaCommand for CreatePatternBrush {
    const OPCODE: u16 = opcode::CREATE_PATTERN_BRUSH;
    const NAME: &'static str = "CreatePatternBrush";

    /// Layout: Bitmap16 header (5 words), its 2-word bits pointer, 9 reserved words, bits.
    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(16, "Bitmap16 header")?;
        let mut r = record.reader();
        let mut bitmap = Bitmap16::read_header(&mut r)?;
        r.skip(2 + 9)?;
        bitmap.bits = r.rest_bytes()?;
        Ok(Self { bitmap })
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        let pattern = match self.bitmap.decode() {
            Ok(bmp) => Some(Arc::new(bmp)),
            Err(err) => {
                tracing::warn!(%err, "pattern brush bitmap could not be decoded");
                None
            }
        };
        ctx.create_object(GdiObject::Brush(Arc::new(Brush::Pattern(pattern))))?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct DibCreatePatternBrush {
    pub style: u16,
    pub color_use: u16,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl MetaCommand for DibCreatePatternBrush {
    const OPCODE: u16 = opcode::DIB_CREATE_PATTERN_BRUSH;
    const NAME: &'static str = "DibCreatePatternBrush";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(2, "style and color usage")?;
        let mut r = record.reader();
        let style = r.word()?;
        let color_use = r.word()?;
        Ok(Self {
            style,
            color_use,
            data: r.rest_bytes()?,
        })
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        let decoded: WmfResult<DecodedBitmap> =
            if BrushStyle::from_u16(self.style) == Some(BrushStyle::Pattern) {
                Bitmap16::parse(&self.data).and_then(|b| b.decode())
            } else {
                ctx.decoder().decode_dib(&self.data)
            };
        let pattern = match decoded {
            Ok(bmp) => Some(Arc::new(bmp)),
            Err(err) => {
                tracing::warn!(%err, "DIB pattern brush could not be decoded");
                None
            }
        };
        ctx.create_object(GdiObject::Brush(Arc::new(Brush::Pattern(pattern))))?;
        Ok(())
    }
}

// ---- selection and lifetime ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SelectObject {
    pub handle: u16,
}

impl MetaCommand for SelectObject {
    const OPCODE: u16 = opcode::SELECT_OBJECT;
    const NAME: &'static str = "SelectObject";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "object handle")?;
        Ok(Self {
            handle: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.handle).finish())
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        _: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        ctx.select_object(self.handle, scale);
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct DeleteObject {
    pub handle: u16,
}

impl MetaCommand for DeleteObject {
    const OPCODE: u16 = opcode::DELETE_OBJECT;
    const NAME: &'static str = "DeleteObject";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "object handle")?;
        Ok(Self {
            handle: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.handle).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.delete_object(self.handle);
        Ok(())
    }
}

// ---- palettes ----

fn read_entries(record: &RecordStore) -> WmfResult<(u16, Vec<Color>)> {
    record.require(2, "palette start and count")?;
    let mut r = record.reader();
    let start = r.word()?;
    let count = usize::from(r.word()?);
    record.require(2 + count * 2, "palette entries")?;
    let entries = (0..count)
        .map(|_| r.long().map(Color::from_colorref))
        .collect::<WmfResult<Vec<_>>>()?;
    Ok((start, entries))
}

fn write_entries(opcode: u16, start: u16, entries: &[Color]) -> WmfResult<RecordStore> {
    let count = u16::try_from(entries.len())
        .map_err(|_| WmfError::malformed(opcode, "too many palette entries"))?;
    let mut w = ParamWriter::new(opcode);
    w.word(start).word(count);
    for e in entries {
        w.long(e.to_colorref());
    }
    Ok(w.finish())
}

/// Overwrite `entries` starting at `start`; entries past the end of the palette are dropped.
fn write_into(palette: &mut Palette, start: u16, entries: &[Color]) {
    let tail = palette.entries.iter_mut().skip(usize::from(start));
    for (slot, entry) in tail.zip(entries) {
        *slot = *entry;
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CreatePalette {
    pub version: u16,
    pub entries: Vec<Color>,
}

impl Default for CreatePalette {
    fn default() -> Self {
        Self {
            version: PALETTE_VERSION,
            entries: Vec::new(),
        }
    }
}

impl MetaCommand for CreatePalette {
    const OPCODE: u16 = opcode::CREATE_PALETTE;
    const NAME: &'static str = "CreatePalette";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        let (version, entries) = read_entries(record)?;
        Ok(Self { version, entries })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        write_entries(Self::OPCODE, self.version, &self.entries)
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.create_object(GdiObject::Palette(Arc::new(Palette {
            entries: self.entries.clone(),
        })))?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetPalEntries {
    pub start: u16,
    pub entries: Vec<Color>,
}

impl MetaCommand for SetPalEntries {
    const OPCODE: u16 = opcode::SET_PAL_ENTRIES;
    const NAME: &'static str = "SetPalEntries";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        let (start, entries) = read_entries(record)?;
        Ok(Self { start, entries })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        write_entries(Self::OPCODE, self.start, &self.entries)
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.edit_palette(|p| write_into(p, self.start, &self.entries));
        Ok(())
    }
}

/// Replaces palette entries in place; there is no animation to drive on a static surface.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct AnimatePalette {
    pub start: u16,
    pub entries: Vec<Color>,
}

impl MetaCommand for AnimatePalette {
    const OPCODE: u16 = opcode::ANIMATE_PALETTE;
    const NAME: &'static str = "AnimatePalette";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        let (start, entries) = read_entries(record)?;
        Ok(Self { start, entries })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        write_entries(Self::OPCODE, self.start, &self.entries)
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.edit_palette(|p| write_into(p, self.start, &self.entries));
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ResizePalette {
    pub count: u16,
}

impl MetaCommand for ResizePalette {
    const OPCODE: u16 = opcode::RESIZE_PALETTE;
    const NAME: &'static str = "ResizePalette";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "entry count")?;
        Ok(Self {
            count: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.count).finish())
    }

    fn replay(&self, _: Scale, ctx: &mut ReplayContext, _: &mut dyn DrawSurface) -> WmfResult<()> {
        ctx.edit_palette(|p| p.entries.resize(usize::from(self.count), Color::BLACK));
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SelectPalette {
    pub handle: u16,
}

impl MetaCommand for SelectPalette {
    const OPCODE: u16 = opcode::SELECT_PALETTE;
    const NAME: &'static str = "SelectPalette";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(1, "palette handle")?;
        Ok(Self {
            handle: record.word(0)?,
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        Ok(ParamWriter::new(Self::OPCODE).word(self.handle).finish())
    }

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        _: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        match ctx.object(self.handle) {
            Some(GdiObject::Palette(_)) => {
                ctx.select_object(self.handle, scale);
            }
            _ => tracing::warn!(handle = self.handle, "SelectPalette on a non-palette handle"),
        }
        Ok(())
    }
}

/// Maps the selected palette onto the device; nothing to do for a true-color surface.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RealizePalette {}

impl MetaCommand for RealizePalette {
    const OPCODE: u16 = opcode::REALIZE_PALETTE;
    const NAME: &'static str = "RealizePalette";

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

#[cfg(test)]
#[path = "../../tests/unit/command/objects.rs"]
mod tests;
