use crate::{
    command::Command,
    foundation::error::{WmfError, WmfResult},
    record::opcode,
    record::reader::{MetafileHeader, PlaceableHeader, STANDARD_HEADER_BYTES},
    record::store::{HEADER_WORDS, RecordStore},
};

/// Serialises records into a standard metafile stream.
#[derive(Clone, Debug, Default)]
pub struct MetafileWriter {
    placeable: Option<PlaceableHeader>,
}

impl MetafileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix the output with a placeable header (checksum is recomputed on write).
    pub fn with_placeable(mut self, placeable: PlaceableHeader) -> Self {
        self.placeable = Some(placeable);
        self
    }

    /// Write header and records; an EOF record is appended unless the input ends with one.
    pub fn to_bytes(&self, records: &[RecordStore]) -> WmfResult<Vec<u8>> {
        let needs_eof = records.last().map(RecordStore::opcode) != Some(opcode::EOF);
        let eof = RecordStore::new(opcode::EOF, 0);
        let all: Vec<&RecordStore> = records
            .iter()
            .chain(needs_eof.then_some(&eof))
            .collect();

        let header_words = (STANDARD_HEADER_BYTES / 2) as u32;
        let body_words: u64 = all.iter().map(|r| u64::from(r.size_words())).sum();
        let size_words = u32::try_from(u64::from(header_words) + body_words)
            .map_err(|_| WmfError::header("metafile exceeds 2^32 words"))?;
        let max_record_words = all
            .iter()
            .map(|r| r.size_words())
            .max()
            .unwrap_or(HEADER_WORDS as u32);

        let header = MetafileHeader {
            file_type: MetafileHeader::DISK,
            header_words: header_words as u16,
            version: MetafileHeader::VERSION_3,
            size_words,
            object_count: peak_object_count(records),
            max_record_words,
            member_count: 0,
        };

        let mut out = Vec::with_capacity(size_words as usize * 2 + 22);
        if let Some(mut p) = self.placeable {
            p.checksum = p.compute_checksum();
            out.extend_from_slice(&p.to_bytes());
        }
        out.extend_from_slice(&header.to_bytes());
        for r in all {
            r.write_to(&mut out).map_err(anyhow::Error::from)?;
        }
        Ok(out)
    }
}

impl MetafileWriter {
    /// Encode `commands` and write them; the first decode-only command aborts the write.
    pub fn commands_to_bytes(&self, commands: &[Command]) -> WmfResult<Vec<u8>> {
        let records = commands
            .iter()
            .map(Command::encode)
            .collect::<WmfResult<Vec<_>>>()?;
        self.to_bytes(&records)
    }
}

/// Peak number of simultaneously live GDI objects in a record sequence.
pub fn peak_object_count(records: &[RecordStore]) -> u16 {
    let mut live: i32 = 0;
    let mut peak: i32 = 0;
    for r in records {
        match r.opcode() {
            opcode::CREATE_PEN_INDIRECT
            | opcode::CREATE_BRUSH_INDIRECT
            | opcode::CREATE_FONT_INDIRECT
            | opcode::CREATE_PALETTE
            | opcode::CREATE_REGION
            | opcode::CREATE_PATTERN_BRUSH
            | opcode::DIB_CREATE_PATTERN_BRUSH => {
                live += 1;
                peak = peak.max(live);
            }
            opcode::DELETE_OBJECT => live = (live - 1).max(0),
            _ => {}
        }
    }
    peak.clamp(0, i32::from(u16::MAX)) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/record/writer.rs"]
mod tests;
