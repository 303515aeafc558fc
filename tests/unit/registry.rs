use super::*;
use crate::record::opcode;

#[test]
fn known_opcodes_are_sorted_and_unique() {
    let ops = CommandRegistry::known_opcodes();
    assert_eq!(ops.len(), CommandRegistry::len());
    assert!(ops.windows(2).all(|w| w[0] < w[1]));
    assert!(ops.contains(&opcode::EOF));
    assert!(ops.contains(&opcode::POLY_POLYGON));
}

#[test]
fn initialisation_is_idempotent() {
    let a = CommandRegistry::register_all_known_types();
    let b = CommandRegistry::register_all_known_types();
    assert!(std::ptr::eq(a, b));
}

#[test]
fn names_follow_the_record_types() {
    assert_eq!(CommandRegistry::name(opcode::SAVE_DC), Some("SaveDC"));
    assert_eq!(CommandRegistry::name(opcode::SET_ROP2), Some("SetROP2"));
    assert_eq!(CommandRegistry::name(0x9999), None);
}

#[test]
fn get_returns_fresh_or_placeholder_commands() {
    let cmd = CommandRegistry::get(opcode::RECTANGLE);
    assert_eq!(cmd.opcode(), opcode::RECTANGLE);
    assert!(!cmd.is_unknown());

    let unknown = CommandRegistry::get(0x9999);
    assert!(unknown.is_unknown());
    assert_eq!(unknown.opcode(), 0x9999);
}

#[test]
fn decode_dispatches_on_the_record_opcode() {
    let record = RecordStore::from_params(opcode::MOVE_TO, vec![5, 4]);
    let cmd = CommandRegistry::decode(&record).unwrap();
    assert_eq!(cmd.name(), "MoveTo");
    assert_eq!(cmd.encode().unwrap().params(), &[5, 4]);

    let short = RecordStore::from_params(opcode::MOVE_TO, vec![5]);
    assert!(CommandRegistry::decode(&short).is_err());
}

#[test]
#[should_panic(expected = "registered twice")]
fn duplicate_opcodes_are_rejected() {
    let mut entries = constructors();
    let first = entries[0];
    entries.push(first);
    let _ = CommandRegistry::from_entries(entries);
}
