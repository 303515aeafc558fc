use super::*;
use crate::record::writer::MetafileWriter;

fn sample_bytes() -> Vec<u8> {
    let records = vec![
        RecordStore::from_params(opcode::MOVE_TO, vec![5, 5]),
        RecordStore::from_params(opcode::LINE_TO, vec![10, 10]),
    ];
    MetafileWriter::new()
        .with_placeable(PlaceableHeader::new(RawRect::new(0, 0, 100, 50), 0))
        .to_bytes(&records)
        .unwrap()
}

#[test]
fn detects_placeable_and_standard_headers() {
    let bytes = sample_bytes();
    assert!(is_wmf(&bytes));
    assert!(is_wmf(&bytes[PLACEABLE_HEADER_BYTES..]));
    assert!(!is_wmf(b"GIF89a............."));
}

#[test]
fn parse_reads_all_records_until_eof() {
    let mut bytes = sample_bytes();
    // Junk after EOF is ignored.
    bytes.extend_from_slice(&[0xAA; 8]);
    let mf = Metafile::parse(&bytes).unwrap();
    assert_eq!(mf.records.len(), 3);
    assert_eq!(mf.records[1].opcode(), opcode::LINE_TO);
    assert_eq!(mf.records[1].params(), &[10, 10]);
    assert_eq!(mf.bounds(), Some(RawRect::new(0, 0, 100, 50)));
    // Zero units-per-inch falls back to logical units.
    assert_eq!(mf.frame_size(), Some((100.0, 50.0)));
    assert_eq!(mf.max_record_words(), 5);
}

#[test]
fn bad_checksum_is_a_header_error() {
    let mut bytes = sample_bytes();
    bytes[20] ^= 0xFF;
    assert!(matches!(Metafile::parse(&bytes), Err(WmfError::Header(_))));
}

#[test]
fn truncated_record_is_reported() {
    let bytes = sample_bytes();
    let cut = &bytes[..bytes.len() - 8];
    assert!(matches!(
        Metafile::parse(cut),
        Err(WmfError::Malformed { .. })
    ));
}

#[test]
fn reader_advances_by_declared_size() {
    let a = RecordStore::from_params(0x9999, vec![1, 2, 3]);
    let b = RecordStore::from_params(opcode::SAVE_DC, vec![]);
    let mut body = a.to_bytes();
    body.extend(b.to_bytes());

    let mut reader = RecordReader::new(&body);
    assert_eq!(reader.next().unwrap().unwrap(), a);
    assert_eq!(reader.position(), 12);
    assert_eq!(reader.next().unwrap().unwrap(), b);
    assert!(reader.next().is_none());
}
