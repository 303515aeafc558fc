use super::*;

/// 2x2 bottom-up 24bpp DIB: top row red, white; bottom row blue, green.
pub(crate) fn dib_2x2() -> Vec<u8> {
    let mut dib = Vec::new();
    dib.extend_from_slice(&40u32.to_le_bytes());
    dib.extend_from_slice(&2i32.to_le_bytes());
    dib.extend_from_slice(&2i32.to_le_bytes());
    dib.extend_from_slice(&1u16.to_le_bytes());
    dib.extend_from_slice(&24u16.to_le_bytes());
    dib.extend_from_slice(&[0u8; 24]);
    // bottom row (BGR)
    dib.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0]);
    // top row
    dib.extend_from_slice(&[0, 0, 255, 255, 255, 255, 0, 0]);
    dib
}

#[test]
fn file_header_points_past_color_table() {
    let bmp = dib_to_bmp_file(&dib_2x2()).unwrap();
    assert_eq!(&bmp[..2], b"BM");
    assert_eq!(u32::from_le_bytes(bmp[10..14].try_into().unwrap()), 54);
    assert_eq!(bmp.len(), 14 + dib_2x2().len());
}

#[test]
fn decodes_bottom_up_24bpp() {
    let img = DibDecoder.decode_dib(&dib_2x2()).unwrap();
    assert_eq!((img.width, img.height), (2, 2));
    let px = img.rgba8_premul.as_slice();
    assert_eq!(&px[0..4], &[255, 0, 0, 255]);
    assert_eq!(&px[4..8], &[255, 255, 255, 255]);
    assert_eq!(&px[8..12], &[0, 0, 255, 255]);
    assert_eq!(&px[12..16], &[0, 255, 0, 255]);
}

#[test]
fn rejects_unknown_header_and_short_data() {
    assert!(DibDecoder.decode_dib(&[1, 2, 3]).is_err());
    assert!(dib_to_bmp_file(&20u32.to_le_bytes()).is_err());

    let mut paletted = dib_2x2();
    paletted[14] = 8; // 8bpp claims a 256-entry color table that is not there
    assert!(dib_to_bmp_file(&paletted).is_err());
}

#[test]
fn bitmap16_monochrome_expands_bits() {
    let img = bitmap16_to_rgba(3, 1, 2, 1, &[0b1010_0000, 0]).unwrap();
    let px = img.rgba8_premul.as_slice();
    assert_eq!(&px[0..4], &[255, 255, 255, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 255]);
    assert_eq!(&px[8..12], &[255, 255, 255, 255]);
    assert!(bitmap16_to_rgba(8, 8, 2, 1, &[0; 4]).is_err());
    assert!(bitmap16_to_rgba(1, 1, 2, 4, &[0; 2]).is_err());
}
