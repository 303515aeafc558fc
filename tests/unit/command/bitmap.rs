use super::*;
use crate::command::drawing::PATCOPY;
use crate::foundation::core::Color;
use crate::render::recording::{PaintSummary, RecordingSurface, SurfaceOp};

fn dib_2x2() -> Vec<u8> {
    let mut dib = Vec::new();
    dib.extend_from_slice(&40u32.to_le_bytes());
    dib.extend_from_slice(&2i32.to_le_bytes());
    dib.extend_from_slice(&2i32.to_le_bytes());
    dib.extend_from_slice(&1u16.to_le_bytes());
    dib.extend_from_slice(&24u16.to_le_bytes());
    dib.extend_from_slice(&[0u8; 24]);
    dib.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0]);
    dib.extend_from_slice(&[0, 0, 255, 255, 255, 255, 0, 0]);
    dib
}

fn words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|c| u16::from_le_bytes([c[0], c.get(1).copied().unwrap_or(0)]))
        .collect()
}

fn blit_head(rop: u32) -> Vec<u16> {
    // rop, srcY, srcX, then height, width, y, x of the destination.
    vec![rop as u16, (rop >> 16) as u16, 0, 0, 5, 4, 3, 2]
}

fn run<T: MetaCommand>(params: Vec<u16>) -> (T, RecordingSurface) {
    let mut cmd = T::decode(&RecordStore::from_params(T::OPCODE, params)).unwrap();
    cmd.rescale(Scale::IDENTITY);
    let mut ctx = ReplayContext::new();
    let mut surface = RecordingSurface::new();
    cmd.replay(Scale::IDENTITY, &mut ctx, &mut surface).unwrap();
    (cmd, surface)
}

#[test]
fn bit_blt_without_bitmap_is_a_pattern_blit() {
    let mut params = blit_head(PATCOPY);
    params.insert(4, 0);
    assert_eq!(params.len(), 9);

    let (cmd, surface) = run::<BitBlt>(params.clone());
    assert!(cmd.bitmap.is_none());
    assert_eq!(
        cmd.dest,
        RawExtentRect {
            x: 2,
            y: 3,
            width: 4,
            height: 5
        }
    );
    assert_eq!(cmd.encode().unwrap().params(), params.as_slice());

    let SurfaceOp::Fill { path, paint, .. } = &surface.ops()[0] else {
        panic!("expected a fill");
    };
    assert_eq!(*paint, PaintSummary::Solid { color: Color::WHITE });
    assert_eq!(
        kurbo::Shape::bounding_box(path),
        kurbo::Rect::new(2.0, 3.0, 6.0, 8.0)
    );
}

#[test]
fn device_dependent_bitmaps_are_decoded_but_not_drawn() {
    let mut params = blit_head(PATCOPY);
    params.extend([0, 8, 1, 2, 0x0101]);
    params.extend([0xFFFF, 0]);
    let (cmd, surface) = run::<BitBlt>(params);

    let bitmap = cmd.bitmap.as_ref().unwrap();
    assert_eq!((bitmap.width, bitmap.height, bitmap.bits_pixel), (8, 1, 1));
    assert_eq!(bitmap.bits, vec![0xFF, 0xFF, 0, 0]);
    assert!(surface.ops().is_empty());
    assert!(matches!(
        cmd.encode().unwrap_err(),
        WmfError::UnsupportedEncoding {
            opcode: opcode::BIT_BLT,
            ..
        }
    ));
}

#[test]
fn dib_bit_blt_draws_the_image_into_the_destination() {
    let mut params = blit_head(PATCOPY);
    params.extend(words(&dib_2x2()));
    let (cmd, surface) = run::<DibBitBlt>(params);

    assert_eq!(cmd.dib.as_deref(), Some(dib_2x2().as_slice()));
    assert_eq!(
        surface.ops(),
        &[SurfaceOp::Image {
            transform: kurbo::Affine::IDENTITY,
            clip: None,
            width: 2,
            height: 2,
            dest: kurbo::Rect::new(2.0, 3.0, 6.0, 8.0),
        }]
    );
    assert!(cmd.encode().is_err());
}

#[test]
fn undecodable_dib_is_skipped() {
    let mut params = blit_head(PATCOPY);
    params.extend([0x0102, 0x0304]);
    let (_, surface) = run::<DibBitBlt>(params);
    assert!(surface.ops().is_empty());
}

#[test]
fn stretch_blt_reads_source_rect_before_destination() {
    // rop, then source height, width, y, x, reserved, destination.
    let params = vec![
        PATCOPY as u16,
        (PATCOPY >> 16) as u16,
        10,
        20,
        30,
        40,
        0,
        5,
        4,
        3,
        2,
    ];
    let (cmd, surface) = run::<StretchBlt>(params.clone());
    assert_eq!(
        cmd.src,
        SourceRect {
            x: 40,
            y: 30,
            width: 20,
            height: 10
        }
    );
    assert_eq!(cmd.encode().unwrap().params(), params.as_slice());
    assert_eq!(surface.ops().len(), 1);
}

#[test]
fn dib_transfers_are_decode_only() {
    let mut params = vec![0, 2, 0, 0, 0, 5, 4, 3, 2];
    params.extend(words(&dib_2x2()));
    let (set, surface) = run::<SetDibToDev>(params);
    assert_eq!(set.scan_count, 2);
    assert!(matches!(surface.ops(), [SurfaceOp::Image { .. }]));
    assert!(matches!(
        set.encode().unwrap_err(),
        WmfError::UnsupportedEncoding {
            opcode: opcode::SET_DIB_TO_DEV,
            ..
        }
    ));

    let mut params = vec![PATCOPY as u16, (PATCOPY >> 16) as u16, 0, 2, 2, 0, 0, 5, 4, 3, 2];
    params.extend(words(&dib_2x2()));
    let (stretch, surface) = run::<StretchDib>(params);
    assert_eq!(stretch.src.width, 2);
    assert_eq!(surface.ops().len(), 1);
    assert!(stretch.encode().is_err());
}
