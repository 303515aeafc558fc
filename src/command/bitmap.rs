use crate::{
    bitmap::decode::{DecodedBitmap, bitmap16_to_rgba},
    command::{
        MetaCommand,
        drawing::{RawExtentRect, pattern_blit},
    },
    foundation::error::{WmfError, WmfResult},
    foundation::math::{Scale, ScaledRect},
    record::{
        opcode,
        store::{ParamReader, ParamWriter, RecordStore},
    },
    replay::{context::ReplayContext, surface::DrawSurface},
};

/// Device-dependent bitmap embedded in legacy blit and pattern-brush records.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Bitmap16 {
    pub bitmap_type: i16,
    pub width: u16,
    pub height: u16,
    pub width_bytes: u16,
    pub planes: u8,
    pub bits_pixel: u8,
    #[serde(skip)]
    pub bits: Vec<u8>,
}

impl Bitmap16 {
    /// Read the five header words; `bits` is left empty.
    pub fn read_header(r: &mut ParamReader<'_>) -> WmfResult<Self> {
        let bitmap_type = r.i16()?;
        let width = r.word()?;
        let height = r.word()?;
        let width_bytes = r.word()?;
        let [planes, bits_pixel] = r.word()?.to_le_bytes();
        Ok(Self {
            bitmap_type,
            width,
            height,
            width_bytes,
            planes,
            bits_pixel,
            bits: Vec::new(),
        })
    }

    /// Parse header plus bits from a raw byte run.
    pub fn parse(data: &[u8]) -> WmfResult<Self> {
        if data.len() < 10 {
            return Err(WmfError::Other(anyhow::anyhow!(
                "Bitmap16 needs 10 header bytes, has {}",
                data.len()
            )));
        }
        let word = |i: usize| u16::from_le_bytes([data[i], data[i + 1]]);
        Ok(Self {
            bitmap_type: word(0) as i16,
            width: word(2),
            height: word(4),
            width_bytes: word(6),
            planes: data[8],
            bits_pixel: data[9],
            bits: data[10..].to_vec(),
        })
    }

    fn read(r: &mut ParamReader<'_>) -> WmfResult<Self> {
        let mut bitmap = Self::read_header(r)?;
        bitmap.bits = r.rest_bytes()?;
        Ok(bitmap)
    }

    pub fn decode(&self) -> WmfResult<DecodedBitmap> {
        bitmap16_to_rgba(
            self.width,
            self.height,
            self.width_bytes,
            self.bits_pixel,
            &self.bits,
        )
    }
}

fn read_extent_rect(r: &mut ParamReader<'_>) -> WmfResult<RawExtentRect> {
    let height = r.i16()?;
    let width = r.i16()?;
    let y = r.i16()?;
    let x = r.i16()?;
    Ok(RawExtentRect {
        x,
        y,
        width,
        height,
    })
}

fn write_extent_rect(w: &mut ParamWriter, rect: RawExtentRect) {
    w.i16(rect.height).i16(rect.width).i16(rect.y).i16(rect.x);
}

/// Draw a DIB into `dest`, logging instead of failing when the bitmap cannot be decoded.
fn draw_dib(dib: &[u8], dest: ScaledRect, ctx: &ReplayContext, surface: &mut dyn DrawSurface) {
    match ctx.decoder().decode_dib(dib) {
        Ok(image) => {
            ctx.sync(surface);
            surface.draw_image(&image, dest.to_kurbo());
        }
        Err(err) => tracing::warn!(%err, "DIB could not be decoded, transfer skipped"),
    }
}

// ---- device-dependent blits (decode only) ----

/// Legacy BitBlt. The bitmap-less form (9 parameter words, with a reserved word) acts as a
/// pattern blit; the Bitmap16 form is decoded but not drawn.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct BitBlt {
    pub rop: u32,
    pub src_x: i16,
    pub src_y: i16,
    pub dest: RawExtentRect,
    pub bitmap: Option<Bitmap16>,
    #[serde(skip)]
    pub scaled: ScaledRect,
}

const BLIT_NO_BITMAP_WORDS: usize = 9;

impl MetaCommand for BitBlt {
    const OPCODE: u16 = opcode::BIT_BLT;
    const NAME: &'static str = "BitBlt";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(8, "raster operation, source and destination")?;
        let without_bitmap = record.param_count() == BLIT_NO_BITMAP_WORDS;
        let mut r = record.reader();
        let rop = r.long()?;
        let src_y = r.i16()?;
        let src_x = r.i16()?;
        if without_bitmap {
            r.skip(1)?;
        }
        let dest = read_extent_rect(&mut r)?;
        let bitmap = if without_bitmap {
            None
        } else {
            Some(Bitmap16::read(&mut r)?)
        };
        Ok(Self {
            rop,
            src_x,
            src_y,
            dest,
            bitmap,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        if self.bitmap.is_some() {
            return Err(WmfError::unsupported_encoding(Self::OPCODE, Self::NAME));
        }
        let mut w = ParamWriter::new(Self::OPCODE);
        w.long(self.rop).i16(self.src_y).i16(self.src_x).word(0);
        write_extent_rect(&mut w, self.dest);
        Ok(w.finish())
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
        match &self.bitmap {
            None => pattern_blit(self.rop, self.scaled, ctx, surface),
            Some(_) => tracing::debug!("device-dependent BitBlt not drawn"),
        }
        Ok(())
    }
}

/// Source rectangle of a stretching transfer, in source pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SourceRect {
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
}

fn read_source_rect(r: &mut ParamReader<'_>) -> WmfResult<SourceRect> {
    let height = r.i16()?;
    let width = r.i16()?;
    let y = r.i16()?;
    let x = r.i16()?;
    Ok(SourceRect {
        x,
        y,
        width,
        height,
    })
}

fn write_source_rect(w: &mut ParamWriter, src: SourceRect) {
    w.i16(src.height).i16(src.width).i16(src.y).i16(src.x);
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct StretchBlt {
    pub rop: u32,
    pub src: SourceRect,
    pub dest: RawExtentRect,
    pub bitmap: Option<Bitmap16>,
    #[serde(skip)]
    pub scaled: ScaledRect,
}

const STRETCH_NO_BITMAP_WORDS: usize = 11;

impl MetaCommand for StretchBlt {
    const OPCODE: u16 = opcode::STRETCH_BLT;
    const NAME: &'static str = "StretchBlt";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(10, "raster operation, source and destination")?;
        let without_bitmap = record.param_count() == STRETCH_NO_BITMAP_WORDS;
        let mut r = record.reader();
        let rop = r.long()?;
        let src = read_source_rect(&mut r)?;
        if without_bitmap {
            r.skip(1)?;
        }
        let dest = read_extent_rect(&mut r)?;
        let bitmap = if without_bitmap {
            None
        } else {
            Some(Bitmap16::read(&mut r)?)
        };
        Ok(Self {
            rop,
            src,
            dest,
            bitmap,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        if self.bitmap.is_some() {
            return Err(WmfError::unsupported_encoding(Self::OPCODE, Self::NAME));
        }
        let mut w = ParamWriter::new(Self::OPCODE);
        w.long(self.rop);
        write_source_rect(&mut w, self.src);
        w.word(0);
        write_extent_rect(&mut w, self.dest);
        Ok(w.finish())
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
        match &self.bitmap {
            None => pattern_blit(self.rop, self.scaled, ctx, surface),
            Some(_) => tracing::debug!("device-dependent StretchBlt not drawn"),
        }
        Ok(())
    }
}

// ---- DIB transfers ----

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct DibBitBlt {
    pub rop: u32,
    pub src_x: i16,
    pub src_y: i16,
    pub dest: RawExtentRect,
    #[serde(skip)]
    pub dib: Option<Vec<u8>>,
    #[serde(skip)]
    pub scaled: ScaledRect,
}

impl MetaCommand for DibBitBlt {
    const OPCODE: u16 = opcode::DIB_BIT_BLT;
    const NAME: &'static str = "DibBitBlt";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(8, "raster operation, source and destination")?;
        let without_bitmap = record.param_count() == BLIT_NO_BITMAP_WORDS;
        let mut r = record.reader();
        let rop = r.long()?;
        let src_y = r.i16()?;
        let src_x = r.i16()?;
        if without_bitmap {
            r.skip(1)?;
        }
        let dest = read_extent_rect(&mut r)?;
        let dib = if without_bitmap {
            None
        } else {
            Some(r.rest_bytes()?)
        };
        Ok(Self {
            rop,
            src_x,
            src_y,
            dest,
            dib,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        if self.dib.is_some() {
            return Err(WmfError::unsupported_encoding(Self::OPCODE, Self::NAME));
        }
        let mut w = ParamWriter::new(Self::OPCODE);
        w.long(self.rop).i16(self.src_y).i16(self.src_x).word(0);
        write_extent_rect(&mut w, self.dest);
        Ok(w.finish())
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
        match &self.dib {
            None => pattern_blit(self.rop, self.scaled, ctx, surface),
            Some(dib) => draw_dib(dib, self.scaled, ctx, surface),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct DibStretchBlt {
    pub rop: u32,
    pub src: SourceRect,
    pub dest: RawExtentRect,
    #[serde(skip)]
    pub dib: Option<Vec<u8>>,
    #[serde(skip)]
    pub scaled: ScaledRect,
}

impl MetaCommand for DibStretchBlt {
    const OPCODE: u16 = opcode::DIB_STRETCH_BLT;
    const NAME: &'static str = "DibStretchBlt";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(10, "raster operation, source and destination")?;
        let without_bitmap = record.param_count() == STRETCH_NO_BITMAP_WORDS;
        let mut r = record.reader();
        let rop = r.long()?;
        let src = read_source_rect(&mut r)?;
        if without_bitmap {
            r.skip(1)?;
        }
        let dest = read_extent_rect(&mut r)?;
        let dib = if without_bitmap {
            None
        } else {
            Some(r.rest_bytes()?)
        };
        Ok(Self {
            rop,
            src,
            dest,
            dib,
            ..Self::default()
        })
    }

    fn encode(&self) -> WmfResult<RecordStore> {
        if self.dib.is_some() {
            return Err(WmfError::unsupported_encoding(Self::OPCODE, Self::NAME));
        }
        let mut w = ParamWriter::new(Self::OPCODE);
        w.long(self.rop);
        write_source_rect(&mut w, self.src);
        w.word(0);
        write_extent_rect(&mut w, self.dest);
        Ok(w.finish())
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
        match &self.dib {
            None => pattern_blit(self.rop, self.scaled, ctx, surface),
            Some(dib) => draw_dib(dib, self.scaled, ctx, surface),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SetDibToDev {
    pub color_use: u16,
    pub scan_count: u16,
    pub start_scan: u16,
    pub src_x: i16,
    pub src_y: i16,
    pub dest: RawExtentRect,
    #[serde(skip)]
    pub dib: Vec<u8>,
    #[serde(skip)]
    pub scaled: ScaledRect,
}

impl MetaCommand for SetDibToDev {
    const OPCODE: u16 = opcode::SET_DIB_TO_DEV;
    const NAME: &'static str = "SetDibToDev";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(9, "scan lines, source and destination")?;
        let mut r = record.reader();
        let color_use = r.word()?;
        let scan_count = r.word()?;
        let start_scan = r.word()?;
        let src_y = r.i16()?;
        let src_x = r.i16()?;
        let dest = read_extent_rect(&mut r)?;
        Ok(Self {
            color_use,
            scan_count,
            start_scan,
            src_x,
            src_y,
            dest,
            dib: r.rest_bytes()?,
            ..Self::default()
        })
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
        draw_dib(&self.dib, self.scaled, ctx, surface);
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct StretchDib {
    pub rop: u32,
    pub color_use: u16,
    pub src: SourceRect,
    pub dest: RawExtentRect,
    #[serde(skip)]
    pub dib: Vec<u8>,
    #[serde(skip)]
    pub scaled: ScaledRect,
}

impl MetaCommand for StretchDib {
    const OPCODE: u16 = opcode::STRETCH_DIB;
    const NAME: &'static str = "StretchDib";

    fn decode(record: &RecordStore) -> WmfResult<Self> {
        record.require(11, "raster operation, source and destination")?;
        let mut r = record.reader();
        let rop = r.long()?;
        let color_use = r.word()?;
        let src = read_source_rect(&mut r)?;
        let dest = read_extent_rect(&mut r)?;
        Ok(Self {
            rop,
            color_use,
            src,
            dest,
            dib: r.rest_bytes()?,
            ..Self::default()
        })
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
        draw_dib(&self.dib, self.scaled, ctx, surface);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/bitmap.rs"]
mod tests;
