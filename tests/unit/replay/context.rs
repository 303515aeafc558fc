use super::*;
use crate::foundation::math::RawRect;

fn pen(width: i16) -> GdiObject {
    GdiObject::Pen(Arc::new(Pen {
        style: 0,
        width,
        color: Color::rgb(1, 2, 3),
    }))
}

#[test]
fn restore_zero_is_a_no_op() {
    let mut ctx = ReplayContext::new();
    ctx.save();
    ctx.dc_mut().text_align = 6;
    ctx.restore(0).unwrap();
    assert_eq!(ctx.depth(), 1);
    assert_eq!(ctx.dc().text_align, 6);
}

#[test]
fn restore_minus_one_pops_the_latest_save() {
    let mut ctx = ReplayContext::new();
    for i in 0..5 {
        ctx.dc_mut().text_align = i;
        ctx.save();
    }
    ctx.dc_mut().text_align = 99;
    ctx.restore(-1).unwrap();
    assert_eq!(ctx.depth(), 4);
    assert_eq!(ctx.dc().text_align, 4);
}

#[test]
fn restore_positive_is_one_based() {
    let mut ctx = ReplayContext::new();
    ctx.dc_mut().bk_mode = TRANSPARENT;
    ctx.save();
    ctx.dc_mut().bk_mode = OPAQUE;
    ctx.save();
    ctx.restore(1).unwrap();
    assert_eq!(ctx.depth(), 0);
    assert_eq!(ctx.dc().bk_mode, TRANSPARENT);
}

#[test]
fn restore_outside_the_stack_underflows() {
    let mut ctx = ReplayContext::new();
    ctx.save();
    let err = ctx.restore(-2).unwrap_err();
    assert!(matches!(
        err,
        WmfError::DcStackUnderflow {
            requested: -2,
            depth: 1
        }
    ));
    assert!(ctx.restore(2).is_err());
    assert_eq!(ctx.depth(), 1);
}

#[test]
fn objects_fill_the_lowest_free_slot_and_install() {
    let mut ctx = ReplayContext::new();
    assert_eq!(ctx.create_object(pen(1)).unwrap(), 0);
    assert_eq!(ctx.create_object(pen(2)).unwrap(), 1);
    assert_eq!(ctx.dc().pen.width, 2);
    assert!(ctx.delete_object(0));
    assert!(!ctx.delete_object(0));
    assert_eq!(ctx.create_object(pen(3)).unwrap(), 0);
    assert_eq!(ctx.create_object(pen(4)).unwrap(), 2);
}

#[test]
fn full_object_table_refuses_new_objects() {
    let mut ctx = ReplayContext::new();
    for expected in 0..=u16::MAX {
        assert_eq!(ctx.create_object(pen(1)).unwrap(), expected);
    }
    assert!(matches!(
        ctx.create_object(pen(2)).unwrap_err(),
        WmfError::InvalidHandle {
            handle: u16::MAX,
            ..
        }
    ));
    assert_eq!(ctx.objects().len(), usize::from(u16::MAX) + 1);
    assert_eq!(ctx.dc().pen.width, 1);

    assert!(ctx.delete_object(300));
    assert_eq!(ctx.create_object(pen(3)).unwrap(), 300);
}

#[test]
fn select_dispatches_on_object_kind() {
    let mut ctx = ReplayContext::new();
    let h = ctx.create_object(pen(7)).unwrap();
    ctx.create_object(pen(1)).unwrap();
    let region = ctx.create_object(GdiObject::Region(Arc::new(Region {
        bounds: RawRect::new(10, 10, 20, 30),
    }))).unwrap();
    assert!(ctx.dc().clip.is_none());

    assert!(ctx.select_object(h, Scale::IDENTITY));
    assert_eq!(ctx.dc().pen.width, 7);
    assert!(ctx.select_object(region, Scale::IDENTITY));
    assert_eq!(
        ctx.dc().clip,
        Some(ScaledRect {
            x: 10,
            y: 10,
            width: 10,
            height: 20
        })
    );
    assert!(!ctx.select_object(42, Scale::IDENTITY));
}

#[test]
fn typed_lookups_report_invalid_handles() {
    let mut ctx = ReplayContext::new();
    let h = ctx.create_object(pen(1)).unwrap();
    assert!(matches!(
        ctx.brush(h),
        Err(WmfError::InvalidHandle { handle: 0, .. })
    ));
    assert!(ctx.region(5).is_err());
}

#[test]
fn palette_edits_replace_table_slot_and_selection() {
    let mut ctx = ReplayContext::new();
    let original = Arc::new(Palette {
        entries: vec![Color::rgb(10, 20, 30)],
    });
    let h = ctx.create_object(GdiObject::Palette(Arc::clone(&original))).unwrap();
    assert!(ctx.edit_palette(|p| p.entries[0] = Color::rgb(1, 1, 1)));

    assert_eq!(original.entries[0], Color::rgb(10, 20, 30));
    match ctx.object(h) {
        Some(GdiObject::Palette(p)) => assert_eq!(p.entries[0], Color::rgb(1, 1, 1)),
        other => panic!("unexpected {other:?}"),
    }
    let indexed = Color {
        r: 0,
        g: 0,
        b: 0,
        flags: crate::foundation::core::COLOR_PALETTE_INDEX,
    };
    assert_eq!(ctx.resolve_color(indexed), Color::rgb(1, 1, 1));
}

#[test]
fn anisotropic_mapping_scales_by_extent_ratio() {
    let mut dc = DcState {
        map_mode: MM_ANISOTROPIC,
        window_org: ScaledPoint::new(100, 100),
        window_ext: Some(Extent::new(200, 100)),
        viewport_ext: Some(Extent::new(100, 100)),
        ..DcState::default()
    };
    let p = dc.transform() * kurbo::Point::new(300.0, 200.0);
    assert_eq!((p.x, p.y), (100.0, 100.0));

    dc.map_mode = MM_TEXT;
    let p = dc.transform() * kurbo::Point::new(300.0, 200.0);
    assert_eq!((p.x, p.y), (200.0, 100.0));
}

#[test]
fn clip_intersects_and_excludes_by_bounding_box() {
    let mut ctx = ReplayContext::new();
    ctx.exclude_clip(ScaledRect {
        x: 0,
        y: 0,
        width: 5,
        height: 5,
    });
    assert!(ctx.dc().clip.is_none());

    ctx.intersect_clip(ScaledRect {
        x: 0,
        y: 0,
        width: 100,
        height: 100,
    });
    ctx.intersect_clip(ScaledRect {
        x: 50,
        y: 20,
        width: 100,
        height: 10,
    });
    assert_eq!(
        ctx.dc().clip,
        Some(ScaledRect {
            x: 50,
            y: 20,
            width: 50,
            height: 10
        })
    );

    ctx.exclude_clip(ScaledRect {
        x: 40,
        y: 0,
        width: 20,
        height: 100,
    });
    assert_eq!(ctx.dc().clip.map(|c| (c.x, c.width)), Some((60, 40)));
}

#[test]
fn null_pen_has_no_stroke_and_width_scales() {
    let mut ctx = ReplayContext::new();
    ctx.create_object(pen(2)).unwrap();
    let stroke = ctx.stroke_style(Scale::new(2.0, 2.0)).unwrap();
    assert_eq!(stroke.width, 4.0);
    assert_eq!(stroke.color, Color::rgb(1, 2, 3));

    ctx.create_object(GdiObject::Pen(Arc::new(Pen {
        style: crate::gdi::objects::PS_NULL,
        ..Pen::default()
    }))).unwrap();
    assert!(ctx.stroke_style(Scale::IDENTITY).is_none());
}
