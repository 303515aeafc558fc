use super::*;

#[test]
fn scale_coord_rounds_half_up() {
    for (raw, s, want) in [
        (10, 1.0, 10),
        (3, 0.5, 2),
        (-3, 0.5, -1),
        (5, 0.4, 2),
        (1, 0.49, 0),
        (-1, 0.5, 0),
        (100, 2.25, 225),
    ] {
        assert_eq!(scale_coord(raw, s), want, "raw={raw} s={s}");
        assert_eq!(
            scale_coord(raw, s),
            (f64::from(raw) * s + 0.5).floor() as i32
        );
    }
}

#[test]
fn scale_length_never_collapses_non_zero() {
    assert_eq!(scale_length(0, 0.01), 0);
    for raw in [-7, -1, 1, 2, 40] {
        for s in [0.0, 0.001, 0.2, 1.0, 3.5] {
            assert!(scale_length(raw, s) >= 1, "raw={raw} s={s}");
        }
    }
    assert_eq!(scale_length(2, 1.0), 2);
    assert_eq!(scale_length(-10, 0.5), 5);
}

#[test]
fn rect_uses_coord_for_origin_and_length_for_extent() {
    let s = Scale::new(0.1, 0.1);
    let r = s.rect(RawRect::new(10, 10, 13, 11));
    assert_eq!(r.x, 1);
    assert_eq!(r.y, 1);
    assert_eq!(r.width, 1);
    assert_eq!(r.height, 1);

    let flipped = Scale::IDENTITY.rect(RawRect::new(20, 30, 10, 5));
    assert_eq!((flipped.x, flipped.y), (10, 5));
    assert_eq!((flipped.width, flipped.height), (10, 25));
}
