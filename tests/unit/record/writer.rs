use super::*;
use crate::foundation::math::RawRect;
use crate::record::reader::Metafile;

fn pen() -> RecordStore {
    RecordStore::from_params(opcode::CREATE_PEN_INDIRECT, vec![0, 1, 0, 0, 0])
}

fn delete(handle: u16) -> RecordStore {
    RecordStore::from_params(opcode::DELETE_OBJECT, vec![handle])
}

#[test]
fn peak_object_count_tracks_deletes() {
    assert_eq!(peak_object_count(&[]), 0);
    assert_eq!(peak_object_count(&[pen(), pen(), delete(0), pen()]), 2);
    assert_eq!(peak_object_count(&[delete(0), pen()]), 1);
}

#[test]
fn header_sizes_match_records() {
    let records = vec![
        pen(),
        RecordStore::from_params(opcode::LINE_TO, vec![10, 10]),
    ];
    let bytes = MetafileWriter::new().to_bytes(&records).unwrap();
    let mf = Metafile::parse(&bytes).unwrap();

    assert_eq!(mf.records.len(), 3);
    assert_eq!(mf.records[2].opcode(), opcode::EOF);
    assert_eq!(mf.header.size_words as usize * 2, bytes.len());
    assert_eq!(mf.header.max_record_words, 8);
    assert_eq!(mf.header.object_count, 1);
}

#[test]
fn explicit_eof_is_not_duplicated() {
    let records = vec![RecordStore::new(opcode::SAVE_DC, 0), RecordStore::new(opcode::EOF, 0)];
    let bytes = MetafileWriter::new().to_bytes(&records).unwrap();
    let mf = Metafile::parse(&bytes).unwrap();
    assert_eq!(mf.records, records);
}

#[test]
fn placeable_checksum_is_recomputed() {
    let mut placeable = PlaceableHeader::new(RawRect::new(0, 0, 1440, 720), 1440);
    placeable.checksum = 0;
    let bytes = MetafileWriter::new()
        .with_placeable(placeable)
        .to_bytes(&[])
        .unwrap();
    let mf = Metafile::parse(&bytes).unwrap();
    let p = mf.placeable.unwrap();
    assert_eq!(p.checksum, p.compute_checksum());
    assert_eq!(mf.frame_size(), Some((96.0, 48.0)));
}

#[test]
fn commands_are_encoded_before_writing() {
    use crate::registry::CommandRegistry;

    let save = CommandRegistry::get(opcode::SAVE_DC);
    let bytes = MetafileWriter::new().commands_to_bytes(&[save]).unwrap();
    let mf = Metafile::parse(&bytes).unwrap();
    assert_eq!(mf.records[0].opcode(), opcode::SAVE_DC);

    let unknown = CommandRegistry::get(0x9999);
    let err = MetafileWriter::new()
        .commands_to_bytes(&[unknown])
        .unwrap_err();
    assert!(matches!(err, WmfError::UnsupportedEncoding { opcode: 0x9999, .. }));
}
