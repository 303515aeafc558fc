use byteorder::{LittleEndian, WriteBytesExt};

use crate::foundation::error::{WmfError, WmfResult};

/// Words taken by the record header: size (u32) + function code (u16).
pub const HEADER_WORDS: usize = 3;

/// Number of parameter words needed to hold `byte_count` bytes (even padded).
pub fn string_words(byte_count: usize) -> usize {
    byte_count.div_ceil(2)
}

/// A single metafile record: function code plus a fixed-size run of 16-bit parameter words.
///
/// The parameter buffer is allocated once at construction and never grows; every accessor is
/// bounds checked and reports [`WmfError::Malformed`] for the record's opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordStore {
    opcode: u16,
    params: Box<[u16]>,
}

impl RecordStore {
    /// Zero-filled record with room for `param_count` words.
    pub fn new(opcode: u16, param_count: usize) -> Self {
        Self {
            opcode,
            params: vec![0u16; param_count].into_boxed_slice(),
        }
    }

    pub fn from_params(opcode: u16, params: Vec<u16>) -> Self {
        Self {
            opcode,
            params: params.into_boxed_slice(),
        }
    }

    /// Parse one complete record (header included) from the start of `bytes`.
    ///
    /// Trailing bytes past the declared size are ignored.
    pub fn from_bytes(bytes: &[u8]) -> WmfResult<Self> {
        if bytes.len() < HEADER_WORDS * 2 {
            return Err(WmfError::malformed(0, "record header is truncated"));
        }
        let size_words = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let opcode = u16::from_le_bytes([bytes[4], bytes[5]]);
        if size_words < HEADER_WORDS {
            return Err(WmfError::malformed(
                opcode,
                format!("declared size {size_words} is smaller than the header"),
            ));
        }
        let byte_len = size_words
            .checked_mul(2)
            .ok_or_else(|| WmfError::malformed(opcode, "declared size overflows"))?;
        if bytes.len() < byte_len {
            return Err(WmfError::malformed(
                opcode,
                format!(
                    "declared size {byte_len} bytes exceeds the {} available",
                    bytes.len()
                ),
            ));
        }
        let params = bytes[HEADER_WORDS * 2..byte_len]
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .collect::<Vec<_>>();
        Ok(Self::from_params(opcode, params))
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Total record size in words, header included (the on-disk size field).
    pub fn size_words(&self) -> u32 {
        (self.params.len() + HEADER_WORDS) as u32
    }

    pub fn params(&self) -> &[u16] {
        &self.params
    }

    pub fn require(&self, min_params: usize, what: &str) -> WmfResult<()> {
        if self.params.len() < min_params {
            return Err(WmfError::malformed(
                self.opcode,
                format!(
                    "{what} needs {min_params} parameter words, record has {}",
                    self.params.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn word(&self, i: usize) -> WmfResult<u16> {
        self.params.get(i).copied().ok_or_else(|| {
            WmfError::malformed(
                self.opcode,
                format!("word {i} out of range ({} params)", self.params.len()),
            )
        })
    }

    pub fn i16_at(&self, i: usize) -> WmfResult<i16> {
        Ok(self.word(i)? as i16)
    }

    /// Words `i` (low) and `i + 1` (high) as one 32-bit value.
    pub fn long(&self, i: usize) -> WmfResult<u32> {
        let lo = self.word(i)?;
        let hi = self.word(i + 1)?;
        Ok(u32::from(lo) | (u32::from(hi) << 16))
    }

    /// `byte_count` raw bytes starting at parameter word `offset`.
    pub fn bytes(&self, offset: usize, byte_count: usize) -> WmfResult<Vec<u8>> {
        let words = string_words(byte_count);
        let end = offset
            .checked_add(words)
            .filter(|&end| end <= self.params.len())
            .ok_or_else(|| {
                WmfError::malformed(
                    self.opcode,
                    format!(
                        "{byte_count} bytes at word {offset} overrun {} params",
                        self.params.len()
                    ),
                )
            })?;
        let mut out = Vec::with_capacity(words * 2);
        for w in &self.params[offset..end] {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out.truncate(byte_count);
        Ok(out)
    }

    /// ANSI string of `byte_count` bytes at word `offset`, cut at the first NUL.
    pub fn string(&self, offset: usize, byte_count: usize) -> WmfResult<String> {
        let bytes = self.bytes(offset, byte_count)?;
        Ok(latin1_to_string(&bytes))
    }

    pub fn set_word(&mut self, i: usize, v: u16) -> WmfResult<()> {
        let len = self.params.len();
        let slot = self.params.get_mut(i).ok_or_else(|| {
            WmfError::malformed(self.opcode, format!("write to word {i} of {len}"))
        })?;
        *slot = v;
        Ok(())
    }

    pub fn set_i16(&mut self, i: usize, v: i16) -> WmfResult<()> {
        self.set_word(i, v as u16)
    }

    pub fn set_long(&mut self, i: usize, v: u32) -> WmfResult<()> {
        self.set_word(i, (v & 0xFFFF) as u16)?;
        self.set_word(i + 1, (v >> 16) as u16)
    }

    /// Store raw bytes from word `offset`, padding an odd tail with a zero byte.
    pub fn set_bytes(&mut self, offset: usize, bytes: &[u8]) -> WmfResult<()> {
        if offset + string_words(bytes.len()) > self.params.len() {
            return Err(WmfError::malformed(
                self.opcode,
                format!(
                    "{} bytes at word {offset} do not fit {} params",
                    bytes.len(),
                    self.params.len()
                ),
            ));
        }
        for (k, pair) in bytes.chunks(2).enumerate() {
            let lo = pair[0];
            let hi = pair.get(1).copied().unwrap_or(0);
            self.params[offset + k] = u16::from_le_bytes([lo, hi]);
        }
        Ok(())
    }

    pub fn set_string(&mut self, offset: usize, s: &str) -> WmfResult<()> {
        self.set_bytes(offset, &string_to_latin1(s))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size_words() as usize * 2);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    pub fn write_to<W: std::io::Write>(&self, mut w: W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(self.size_words())?;
        w.write_u16::<LittleEndian>(self.opcode)?;
        for &p in self.params.iter() {
            w.write_u16::<LittleEndian>(p)?;
        }
        Ok(())
    }

    pub fn reader(&self) -> ParamReader<'_> {
        ParamReader {
            record: self,
            pos: 0,
        }
    }
}

/// Sequential cursor over a record's parameter words.
#[derive(Debug)]
pub struct ParamReader<'a> {
    record: &'a RecordStore,
    pos: usize,
}

impl ParamReader<'_> {
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.record.param_count().saturating_sub(self.pos)
    }

    pub fn word(&mut self) -> WmfResult<u16> {
        let v = self.record.word(self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn i16(&mut self) -> WmfResult<i16> {
        Ok(self.word()? as i16)
    }

    pub fn long(&mut self) -> WmfResult<u32> {
        let v = self.record.long(self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn bytes(&mut self, byte_count: usize) -> WmfResult<Vec<u8>> {
        let v = self.record.bytes(self.pos, byte_count)?;
        self.pos += string_words(byte_count);
        Ok(v)
    }

    pub fn rest_bytes(&mut self) -> WmfResult<Vec<u8>> {
        let n = self.remaining() * 2;
        self.bytes(n)
    }

    pub fn skip(&mut self, words: usize) -> WmfResult<()> {
        if words > self.remaining() {
            return Err(WmfError::malformed(
                self.record.opcode(),
                format!("cannot skip {words} words, {} left", self.remaining()),
            ));
        }
        self.pos += words;
        Ok(())
    }
}

/// Builds a record word by word; the final [`RecordStore`] is allocated once at its exact size.
#[derive(Debug)]
pub struct ParamWriter {
    opcode: u16,
    words: Vec<u16>,
}

impl ParamWriter {
    pub fn new(opcode: u16) -> Self {
        Self {
            opcode,
            words: Vec::new(),
        }
    }

    pub fn word(&mut self, v: u16) -> &mut Self {
        self.words.push(v);
        self
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.word(v as u16)
    }

    pub fn long(&mut self, v: u32) -> &mut Self {
        self.word((v & 0xFFFF) as u16).word((v >> 16) as u16)
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for pair in bytes.chunks(2) {
            let hi = pair.get(1).copied().unwrap_or(0);
            self.words.push(u16::from_le_bytes([pair[0], hi]));
        }
        self
    }

    pub fn finish(&mut self) -> RecordStore {
        let mut store = RecordStore::new(self.opcode, self.words.len());
        store.params.copy_from_slice(&self.words);
        store
    }
}

/// Decode single-byte ANSI text, stopping at the first NUL.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

/// Encode text as single-byte ANSI; characters outside Latin-1 become `?`.
pub fn string_to_latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/record/store.rs"]
mod tests;
