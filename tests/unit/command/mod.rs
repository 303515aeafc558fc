use super::*;
use crate::foundation::math::ScaledRect;
use crate::record::opcode;
use crate::render::recording::{RecordingSurface, SurfaceOp};

fn rectangle() -> Command {
    Command::from(CommandKind::from(drawing::Rectangle::default()))
}

#[test]
fn unknown_commands_replay_as_no_ops() {
    let cmd = Command::unknown(0x9999);
    assert!(cmd.is_unknown());
    assert_eq!(cmd.opcode(), 0x9999);
    assert_eq!(cmd.name(), "Unknown");
    assert!(matches!(
        cmd.encode().unwrap_err(),
        WmfError::UnsupportedEncoding { opcode: 0x9999, .. }
    ));

    let mut ctx = ReplayContext::new();
    let mut surface = RecordingSurface::new();
    cmd.replay(&mut ctx, &mut surface).unwrap();
    assert!(surface.ops().is_empty());
}

#[test]
fn decode_rejects_records_of_another_type() {
    let record = RecordStore::from_params(opcode::ELLIPSE, vec![10, 10, 0, 0]);
    let err = rectangle().decode(&record).unwrap_err();
    assert!(matches!(
        err,
        WmfError::Malformed {
            opcode: opcode::ELLIPSE,
            ..
        }
    ));
}

#[test]
fn set_scale_recomputes_geometry_without_redecoding() {
    let record = RecordStore::from_params(opcode::RECTANGLE, vec![20, 20, 10, 10]);
    let mut cmd = rectangle().decode(&record).unwrap();
    assert_eq!(cmd.scale(), Scale::IDENTITY);

    cmd.set_scale(3.0, 0.5);
    let CommandKind::Rectangle(rect) = cmd.kind() else {
        panic!("expected a rectangle, got {}", cmd.name());
    };
    assert_eq!(
        rect.scaled,
        ScaledRect {
            x: 30,
            y: 5,
            width: 30,
            height: 5
        }
    );

    let mut ctx = ReplayContext::new();
    let mut surface = RecordingSurface::new();
    cmd.replay(&mut ctx, &mut surface).unwrap();
    let SurfaceOp::Stroke { stroke, .. } = &surface.ops()[1] else {
        panic!("expected the outline");
    };
    // The stock one-unit pen follows the horizontal scale.
    assert_eq!(stroke.width, 3.0);
}

#[test]
fn decoded_instances_are_independent() {
    let prototype = rectangle();
    let a = prototype
        .decode(&RecordStore::from_params(opcode::RECTANGLE, vec![1, 1, 0, 0]))
        .unwrap();
    let mut b = prototype
        .decode(&RecordStore::from_params(opcode::RECTANGLE, vec![2, 2, 0, 0]))
        .unwrap();
    b.set_scale(2.0, 2.0);
    assert_ne!(a, b);
    assert_eq!(a.scale(), Scale::IDENTITY);
    assert_eq!(prototype, rectangle());
}

#[test]
fn constructors_cover_every_variant_once() {
    let table = constructors();
    let mut opcodes: Vec<u16> = table.iter().map(|(op, _, _)| *op).collect();
    opcodes.sort_unstable();
    opcodes.dedup();
    assert_eq!(opcodes.len(), table.len());

    for (op, name, make) in table {
        let kind = make();
        assert_eq!(kind.opcode(), op);
        assert_eq!(kind.name(), name);
    }
}

#[test]
fn commands_serialize_with_a_record_tag() {
    let record = RecordStore::from_params(opcode::SET_BK_MODE, vec![1]);
    let cmd = Command::from(CommandKind::from(state::SetBkMode::default()))
        .decode(&record)
        .unwrap();
    let json = serde_json::to_value(&cmd).unwrap();
    assert_eq!(json["record"], "SetBkMode");
    assert_eq!(json["mode"], 1);
}

fn with(head: &[u16], tail: &[u16]) -> Vec<u16> {
    [head, tail].concat()
}

fn encodable(params: Vec<u16>) -> Vec<(Vec<u16>, bool)> {
    vec![(params, true)]
}

fn decode_only(params: Vec<u16>) -> Vec<(Vec<u16>, bool)> {
    vec![(params, false)]
}

/// Sample parameter words per record type, each tagged with whether it re-encodes.
fn samples(op: u16) -> Vec<(Vec<u16>, bool)> {
    let rop = [drawing::PATCOPY as u16, (drawing::PATCOPY >> 16) as u16];
    let bitmap16 = [0, 8, 1, 2, 0x0101, 0xFFFF, 0];
    let dib = [0x0028, 0, 0x0102, 0x0304];

    match op {
        opcode::EOF | opcode::SAVE_DC | opcode::REALIZE_PALETTE => encodable(vec![]),
        opcode::RESTORE_DC => encodable(vec![(-2i16) as u16]),
        opcode::SET_BK_COLOR | opcode::SET_TEXT_COLOR => encodable(vec![0x2233, 0x0111]),
        opcode::SET_BK_MODE
        | opcode::SET_MAP_MODE
        | opcode::SET_ROP2
        | opcode::SET_REL_ABS
        | opcode::SET_POLY_FILL_MODE
        | opcode::SET_STRETCH_BLT_MODE => encodable(vec![7, 0]),
        opcode::SET_LAYOUT | opcode::SET_MAPPER_FLAGS => encodable(vec![0x0001, 0x8000]),
        opcode::SET_WINDOW_ORG
        | opcode::SET_WINDOW_EXT
        | opcode::SET_VIEWPORT_ORG
        | opcode::SET_VIEWPORT_EXT
        | opcode::OFFSET_WINDOW_ORG
        | opcode::OFFSET_VIEWPORT_ORG
        | opcode::OFFSET_CLIP_RGN
        | opcode::MOVE_TO
        | opcode::LINE_TO => encodable(vec![(-20i16) as u16, 10]),
        opcode::SCALE_WINDOW_EXT | opcode::SCALE_VIEWPORT_EXT => encodable(vec![3, 1, 1, 2]),
        opcode::ESCAPE => encodable(vec![0x000F, 3, 0x0201, 0x0003]),

        opcode::SET_TEXT_ALIGN => encodable(vec![0x0018]),
        opcode::SET_TEXT_CHAR_EXTRA => encodable(vec![(-2i16) as u16]),
        opcode::SET_TEXT_JUSTIFICATION => encodable(vec![3, (-5i16) as u16]),
        opcode::TEXT_OUT => encodable(vec![
            3,
            u16::from_le_bytes(*b"ab"),
            u16::from_le_bytes([b'c', 0]),
            20,
            10,
        ]),
        opcode::EXT_TEXT_OUT => encodable(vec![
            5,
            7,
            2,
            text::ETO_CLIPPED,
            0,
            0,
            20,
            10,
            u16::from_le_bytes(*b"Hi"),
            3,
            4,
        ]),

        opcode::RECTANGLE
        | opcode::ELLIPSE
        | opcode::EXCLUDE_CLIP_RECT
        | opcode::INTERSECT_CLIP_RECT => encodable(vec![20, 30, 10, 5]),
        opcode::ROUND_RECT => encodable(vec![4, 6, 20, 30, 10, 5]),
        opcode::ARC | opcode::PIE | opcode::CHORD => {
            encodable(vec![0, 30, 20, 15, 40, 30, 0, 0])
        }
        opcode::POLYGON | opcode::POLYLINE => encodable(vec![3, 0, 0, 10, 0, 10, 10]),
        opcode::POLY_POLYGON => {
            encodable(vec![2, 3, 3, 0, 0, 5, 0, 5, 5, 10, 10, 15, 10, 15, 15])
        }
        opcode::SET_PIXEL | opcode::FLOOD_FILL => encodable(vec![0x00FF, 0, 3, 2]),
        opcode::EXT_FLOOD_FILL => encodable(vec![1, 0x00FF, 0, 3, 2]),
        opcode::PAT_BLT => encodable(with(&rop, &[5, 4, 3, 2])),

        opcode::CREATE_PEN_INDIRECT => encodable(vec![2, 3, 0, 0x00FF, 0x0000]),
        opcode::CREATE_BRUSH_INDIRECT => encodable(vec![2, 0x00FF, 0x0000, 3]),
        opcode::CREATE_FONT_INDIRECT => encodable(vec![
            12,
            0,
            0,
            0,
            700,
            0x0001,
            0x0000,
            0,
            0,
            u16::from_le_bytes(*b"Ar"),
            u16::from_le_bytes(*b"ia"),
            u16::from_le_bytes([b'l', 0]),
        ]),
        opcode::CREATE_PALETTE => encodable(vec![0x0300, 2, 0x2211, 0x0033, 0x5544, 0x0166]),
        opcode::SET_PAL_ENTRIES | opcode::ANIMATE_PALETTE => {
            encodable(vec![1, 1, 0x2211, 0x0033])
        }
        opcode::RESIZE_PALETTE => encodable(vec![16]),
        opcode::SELECT_OBJECT
        | opcode::DELETE_OBJECT
        | opcode::SELECT_PALETTE
        | opcode::PAINT_REGION
        | opcode::INVERT_REGION
        | opcode::SELECT_CLIP_REGION => encodable(vec![4]),
        opcode::CREATE_PATTERN_BRUSH => {
            decode_only(with(&bitmap16[..5], &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFFFF, 0]))
        }
        opcode::DIB_CREATE_PATTERN_BRUSH => decode_only(with(&[5, 0], &dib)),

        opcode::CREATE_REGION => {
            encodable(vec![0, 6, 1, 0, 34, 1, 12, 10, 10, 20, 20, 2, 10, 20, 10, 20, 2])
        }
        opcode::FILL_REGION => encodable(vec![1, 2]),
        opcode::FRAME_REGION => encodable(vec![1, 2, 3, 4]),

        opcode::BIT_BLT => vec![
            (with(&rop, &[0, 0, 0, 5, 4, 3, 2]), true),
            (with(&with(&rop, &[0, 0, 5, 4, 3, 2]), &bitmap16), false),
        ],
        opcode::DIB_BIT_BLT => vec![
            (with(&rop, &[0, 0, 0, 5, 4, 3, 2]), true),
            (with(&with(&rop, &[0, 0, 5, 4, 3, 2]), &dib), false),
        ],
        opcode::STRETCH_BLT => vec![
            (with(&rop, &[10, 20, 30, 40, 0, 5, 4, 3, 2]), true),
            (with(&with(&rop, &[10, 20, 30, 40, 5, 4, 3, 2]), &bitmap16), false),
        ],
        opcode::DIB_STRETCH_BLT => vec![
            (with(&rop, &[10, 20, 30, 40, 0, 5, 4, 3, 2]), true),
            (with(&with(&rop, &[10, 20, 30, 40, 5, 4, 3, 2]), &dib), false),
        ],
        opcode::SET_DIB_TO_DEV => decode_only(with(&[0, 2, 0, 0, 0, 5, 4, 3, 2], &dib)),
        opcode::STRETCH_DIB => {
            decode_only(with(&with(&rop, &[0, 2, 2, 0, 0, 5, 4, 3, 2]), &dib))
        }
        _ => panic!("no sample record for 0x{op:04x}"),
    }
}

#[test]
fn every_record_type_reencodes_or_reports_unsupported() {
    for (op, name, make) in constructors() {
        let prototype = Command::from(make());
        for (params, encodable) in samples(op) {
            let cmd = prototype
                .decode(&RecordStore::from_params(op, params.clone()))
                .unwrap_or_else(|err| panic!("{name} {params:?}: {err}"));
            if encodable {
                let encoded = cmd
                    .encode()
                    .unwrap_or_else(|err| panic!("{name} {params:?}: {err}"));
                assert_eq!(encoded.opcode(), op, "{name}");
                assert_eq!(prototype.decode(&encoded).unwrap(), cmd, "{name} {params:?}");
            } else {
                assert!(
                    matches!(
                        cmd.encode(),
                        Err(WmfError::UnsupportedEncoding { opcode, .. }) if opcode == op
                    ),
                    "{name} {params:?} should be decode-only"
                );
            }
        }
    }
}
