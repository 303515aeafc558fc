use std::io::Cursor;

use anyhow::Context;
use byteorder::{LittleEndian, ReadBytesExt};

use crate::{
    foundation::error::{WmfError, WmfResult},
    foundation::math::RawRect,
    record::opcode,
    record::store::{HEADER_WORDS, RecordStore},
};

/// Key at the start of an Aldus placeable metafile.
pub const PLACEABLE_KEY: u32 = 0x9AC6_CDD7;
pub const PLACEABLE_HEADER_BYTES: usize = 22;
pub const STANDARD_HEADER_BYTES: usize = 18;

/// Aldus placeable header preceding the standard header in `.wmf` files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PlaceableHeader {
    pub handle: u16,
    pub bounds: RawRect,
    pub units_per_inch: u16,
    pub reserved: u32,
    pub checksum: u16,
}

impl PlaceableHeader {
    pub fn new(bounds: RawRect, units_per_inch: u16) -> Self {
        let mut h = Self {
            handle: 0,
            bounds,
            units_per_inch,
            reserved: 0,
            checksum: 0,
        };
        h.checksum = h.compute_checksum();
        h
    }

    /// XOR of the ten words preceding the checksum field.
    pub fn compute_checksum(&self) -> u16 {
        let words = [
            (PLACEABLE_KEY & 0xFFFF) as u16,
            (PLACEABLE_KEY >> 16) as u16,
            self.handle,
            self.bounds.left as u16,
            self.bounds.top as u16,
            self.bounds.right as u16,
            self.bounds.bottom as u16,
            self.units_per_inch,
            (self.reserved & 0xFFFF) as u16,
            (self.reserved >> 16) as u16,
        ];
        words.iter().fold(0, |acc, w| acc ^ w)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PLACEABLE_HEADER_BYTES);
        out.extend_from_slice(&PLACEABLE_KEY.to_le_bytes());
        out.extend_from_slice(&self.handle.to_le_bytes());
        for v in [
            self.bounds.left,
            self.bounds.top,
            self.bounds.right,
            self.bounds.bottom,
        ] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&self.units_per_inch.to_le_bytes());
        out.extend_from_slice(&self.reserved.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
        out
    }

    fn parse(data: &[u8]) -> WmfResult<Self> {
        let mut c = Cursor::new(data);
        let key = c.read_u32::<LittleEndian>().context("read placeable key")?;
        if key != PLACEABLE_KEY {
            return Err(WmfError::header(format!(
                "placeable key 0x{key:08x} != 0x{PLACEABLE_KEY:08x}"
            )));
        }
        let handle = c.read_u16::<LittleEndian>().context("read placeable handle")?;
        let left = c.read_i16::<LittleEndian>().context("read placeable bounds")?;
        let top = c.read_i16::<LittleEndian>().context("read placeable bounds")?;
        let right = c.read_i16::<LittleEndian>().context("read placeable bounds")?;
        let bottom = c.read_i16::<LittleEndian>().context("read placeable bounds")?;
        let units_per_inch = c.read_u16::<LittleEndian>().context("read units per inch")?;
        let reserved = c.read_u32::<LittleEndian>().context("read placeable reserved")?;
        let checksum = c.read_u16::<LittleEndian>().context("read placeable checksum")?;
        let header = Self {
            handle,
            bounds: RawRect::new(left, top, right, bottom),
            units_per_inch,
            reserved,
            checksum,
        };
        let expected = header.compute_checksum();
        if expected != checksum {
            return Err(WmfError::header(format!(
                "placeable checksum 0x{checksum:04x}, expected 0x{expected:04x}"
            )));
        }
        Ok(header)
    }
}

/// The 18-byte META_HEADER record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MetafileHeader {
    pub file_type: u16,
    pub header_words: u16,
    pub version: u16,
    pub size_words: u32,
    pub object_count: u16,
    pub max_record_words: u32,
    pub member_count: u16,
}

impl MetafileHeader {
    pub const MEMORY: u16 = 1;
    pub const DISK: u16 = 2;
    pub const VERSION_3: u16 = 0x0300;

    fn parse(data: &[u8]) -> WmfResult<Self> {
        let mut c = Cursor::new(data);
        let read = |c: &mut Cursor<&[u8]>| -> std::io::Result<Self> {
            Ok(Self {
                file_type: c.read_u16::<LittleEndian>()?,
                header_words: c.read_u16::<LittleEndian>()?,
                version: c.read_u16::<LittleEndian>()?,
                size_words: c.read_u32::<LittleEndian>()?,
                object_count: c.read_u16::<LittleEndian>()?,
                max_record_words: c.read_u32::<LittleEndian>()?,
                member_count: c.read_u16::<LittleEndian>()?,
            })
        };
        let header = read(&mut c).context("read metafile header")?;
        if header.file_type != Self::MEMORY && header.file_type != Self::DISK {
            return Err(WmfError::header(format!(
                "unknown metafile type {}",
                header.file_type
            )));
        }
        if usize::from(header.header_words) * 2 < STANDARD_HEADER_BYTES {
            return Err(WmfError::header(format!(
                "header size {} words is too small",
                header.header_words
            )));
        }
        Ok(header)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STANDARD_HEADER_BYTES);
        out.extend_from_slice(&self.file_type.to_le_bytes());
        out.extend_from_slice(&self.header_words.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.size_words.to_le_bytes());
        out.extend_from_slice(&self.object_count.to_le_bytes());
        out.extend_from_slice(&self.max_record_words.to_le_bytes());
        out.extend_from_slice(&self.member_count.to_le_bytes());
        out
    }
}

/// Returns `true` when `data` starts with a placeable key or a standard header.
pub fn is_wmf(data: &[u8]) -> bool {
    if data.len() >= 4 && u32::from_le_bytes([data[0], data[1], data[2], data[3]]) == PLACEABLE_KEY
    {
        return true;
    }
    data.len() >= STANDARD_HEADER_BYTES
        && matches!(
            u16::from_le_bytes([data[0], data[1]]),
            MetafileHeader::MEMORY | MetafileHeader::DISK
        )
        && u16::from_le_bytes([data[2], data[3]]) == 9
}

/// Iterates the records of a metafile body.
///
/// Each step advances by the record's declared size, so a record that later fails to decode
/// does not disturb the position of the next one. Iteration ends after the EOF record, at the
/// end of the data, or after the first structurally broken record.
#[derive(Debug)]
pub struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> RecordReader<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            data: body,
            pos: 0,
            done: false,
        }
    }

    /// Byte offset of the next record within the body.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for RecordReader<'_> {
    type Item = WmfResult<RecordStore>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.data.len() {
            return None;
        }
        match RecordStore::from_bytes(&self.data[self.pos..]) {
            Ok(record) => {
                self.pos += record.size_words() as usize * 2;
                if record.opcode() == opcode::EOF {
                    self.done = true;
                }
                Some(Ok(record))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// A parsed metafile: optional placeable header, standard header and raw records.
#[derive(Clone, Debug, PartialEq)]
pub struct Metafile {
    pub placeable: Option<PlaceableHeader>,
    pub header: MetafileHeader,
    pub records: Vec<RecordStore>,
}

impl Metafile {
    #[tracing::instrument(skip(data), fields(len = data.len()))]
    pub fn parse(data: &[u8]) -> WmfResult<Self> {
        let (placeable, rest) = if data.len() >= 4
            && u32::from_le_bytes([data[0], data[1], data[2], data[3]]) == PLACEABLE_KEY
        {
            if data.len() < PLACEABLE_HEADER_BYTES {
                return Err(WmfError::header("placeable header is truncated"));
            }
            (
                Some(PlaceableHeader::parse(&data[..PLACEABLE_HEADER_BYTES])?),
                &data[PLACEABLE_HEADER_BYTES..],
            )
        } else {
            (None, data)
        };

        if rest.len() < STANDARD_HEADER_BYTES {
            return Err(WmfError::header("standard header is truncated"));
        }
        let header = MetafileHeader::parse(&rest[..STANDARD_HEADER_BYTES])?;
        let body_start = usize::from(header.header_words) * 2;
        if rest.len() < body_start {
            return Err(WmfError::header("record area starts past the end of data"));
        }

        let records = RecordReader::new(&rest[body_start..]).collect::<WmfResult<Vec<_>>>()?;
        if records.last().map(RecordStore::opcode) != Some(opcode::EOF) {
            tracing::warn!(records = records.len(), "metafile has no EOF record");
        }
        tracing::debug!(
            records = records.len(),
            placeable = placeable.is_some(),
            "parsed metafile"
        );

        Ok(Self {
            placeable,
            header,
            records,
        })
    }

    /// Logical bounds from the placeable header.
    pub fn bounds(&self) -> Option<RawRect> {
        self.placeable.map(|p| p.bounds)
    }

    /// Picture size in pixels at 96 DPI, derived from the placeable header.
    pub fn frame_size(&self) -> Option<(f64, f64)> {
        let p = self.placeable?;
        let w = f64::from(p.bounds.width());
        let h = f64::from(p.bounds.height());
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        if p.units_per_inch == 0 {
            return Some((w, h));
        }
        let px_per_unit = 96.0 / f64::from(p.units_per_inch);
        Some((w * px_per_unit, h * px_per_unit))
    }

    /// Largest record in words, computed from the records themselves.
    pub fn max_record_words(&self) -> u32 {
        self.records
            .iter()
            .map(RecordStore::size_words)
            .max()
            .unwrap_or(HEADER_WORDS as u32)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/record/reader.rs"]
mod tests;
