use super::*;
use crate::render::recording::{PaintSummary, RecordingSurface, SurfaceOp};

fn decoded<T: MetaCommand>(params: Vec<u16>) -> T {
    let mut cmd = T::decode(&RecordStore::from_params(T::OPCODE, params)).unwrap();
    cmd.rescale(Scale::IDENTITY);
    cmd
}

fn replay<T: MetaCommand>(cmd: &T, ctx: &mut ReplayContext) -> RecordingSurface {
    let mut surface = RecordingSurface::new();
    cmd.replay(Scale::IDENTITY, ctx, &mut surface).unwrap();
    surface
}

#[test]
fn rectangle_reads_bottom_right_top_left() {
    let mut rect: Rectangle = decoded(vec![40, 30, 20, 10]);
    assert_eq!(rect.rect, RawRect::new(10, 20, 30, 40));

    rect.rescale(Scale::new(2.0, 0.5));
    assert_eq!(
        rect.scaled,
        ScaledRect {
            x: 20,
            y: 10,
            width: 40,
            height: 10
        }
    );
    assert_eq!(rect.encode().unwrap().params(), &[40, 30, 20, 10]);
}

#[test]
fn short_rectangle_is_malformed() {
    let err = Rectangle::decode(&RecordStore::from_params(opcode::RECTANGLE, vec![1, 2, 3]))
        .unwrap_err();
    assert!(matches!(err, WmfError::Malformed { opcode: opcode::RECTANGLE, .. }));
}

#[test]
fn rectangle_fills_with_brush_then_strokes_with_pen() {
    let mut ctx = ReplayContext::new();
    let rect: Rectangle = decoded(vec![10, 10, 0, 0]);
    let surface = replay(&rect, &mut ctx);

    assert_eq!(surface.ops().len(), 2);
    assert!(matches!(
        &surface.ops()[0],
        SurfaceOp::Fill { paint: PaintSummary::Solid { color }, .. } if *color == Color::WHITE
    ));
    assert!(matches!(&surface.ops()[1], SurfaceOp::Stroke { .. }));
}

#[test]
fn line_to_strokes_from_current_position_and_moves_it() {
    let mut ctx = ReplayContext::new();
    let move_to: MoveTo = decoded(vec![5, 4]);
    assert!(replay(&move_to, &mut ctx).ops().is_empty());
    assert_eq!(ctx.dc().position, ScaledPoint::new(4, 5));

    let line: LineTo = decoded(vec![20, 10]);
    let surface = replay(&line, &mut ctx);
    let SurfaceOp::Stroke { path, .. } = &surface.ops()[0] else {
        panic!("expected a stroke, got {:?}", surface.ops());
    };
    let els = path.elements();
    assert_eq!(els[0], kurbo::PathEl::MoveTo(kurbo::Point::new(4.0, 5.0)));
    assert_eq!(els[1], kurbo::PathEl::LineTo(kurbo::Point::new(10.0, 20.0)));
    assert_eq!(ctx.dc().position, ScaledPoint::new(10, 20));
}

#[test]
fn round_rect_reads_corner_before_rectangle() {
    let rr: RoundRect = decoded(vec![6, 8, 40, 30, 20, 10]);
    assert_eq!(rr.corner_height, 6);
    assert_eq!(rr.corner_width, 8);
    assert_eq!(rr.rect, RawRect::new(10, 20, 30, 40));
    assert_eq!(rr.scaled_corner, (8, 6));
}

#[test]
fn pie_starts_at_center_and_arc_stays_open() {
    // Unit box centred on (50, 50), start radial to the right, end radial upwards.
    let params = vec![0, 50, 50, 100, 100, 100, 0, 0];
    let pie: Pie = decoded(params.clone());
    let path = pie.geometry.path(ArcClose::Pie);
    assert_eq!(
        path.elements()[0],
        kurbo::PathEl::MoveTo(kurbo::Point::new(50.0, 50.0))
    );
    assert_eq!(path.elements().last(), Some(&kurbo::PathEl::ClosePath));

    let arc: EllipticArc = decoded(params);
    assert_eq!(arc.geometry.start, RawPoint::new(100, 50));
    assert_eq!(arc.geometry.end, RawPoint::new(50, 0));
    let open = arc.geometry.path(ArcClose::Open);
    let kurbo::PathEl::MoveTo(first) = open.elements()[0] else {
        panic!("arc path must start with a move");
    };
    assert!((first.x - 100.0).abs() < 1e-9 && (first.y - 50.0).abs() < 1e-9);
    assert_ne!(open.elements().last(), Some(&kurbo::PathEl::ClosePath));

    let mut ctx = ReplayContext::new();
    let ops = replay(&arc, &mut ctx).into_ops();
    assert_eq!(ops.len(), 1, "open arcs are only stroked");
}

#[test]
fn polyline_reads_x_then_y() {
    let line: Polyline = decoded(vec![2, 1, 2, 3, 4]);
    assert_eq!(line.points, vec![RawPoint::new(1, 2), RawPoint::new(3, 4)]);
    assert_eq!(line.encode().unwrap().params(), &[2, 1, 2, 3, 4]);
}

#[test]
fn polygon_with_one_point_draws_nothing() {
    let mut ctx = ReplayContext::new();
    let poly: Polygon = decoded(vec![1, 7, 7]);
    assert!(replay(&poly, &mut ctx).ops().is_empty());
}

#[test]
fn polygon_count_past_the_record_is_malformed() {
    let err = Polygon::decode(&RecordStore::from_params(opcode::POLYGON, vec![3, 0, 0, 1, 1]))
        .unwrap_err();
    assert!(matches!(err, WmfError::Malformed { .. }));
}

#[test]
fn poly_polygon_uses_one_running_cursor() {
    let mut params = vec![2, 3, 4];
    params.extend([0, 0, 10, 0, 10, 10]);
    params.extend([20, 20, 30, 20, 30, 30, 20, 30]);
    assert_eq!(params.len(), 17);

    let pp: PolyPolygon = decoded(params.clone());
    assert_eq!(pp.polygons.len(), 2);
    assert_eq!(pp.polygons[0].len(), 3);
    assert_eq!(pp.polygons[1].len(), 4);
    assert_eq!(pp.polygons[1][0], RawPoint::new(20, 20));
    assert_eq!(pp.polygons[1][3], RawPoint::new(20, 30));

    let encoded = pp.encode().unwrap();
    assert_eq!(encoded.param_count(), 17);
    assert_eq!(encoded.params(), params.as_slice());
}

#[test]
fn poly_polygon_fills_every_ring_in_one_path() {
    let mut ctx = ReplayContext::new();
    let pp: PolyPolygon = decoded(vec![2, 3, 3, 0, 0, 4, 0, 4, 4, 10, 10, 14, 10, 14, 14]);
    let surface = replay(&pp, &mut ctx);
    let SurfaceOp::Fill { path, .. } = &surface.ops()[0] else {
        panic!("expected a fill");
    };
    let moves = path
        .elements()
        .iter()
        .filter(|el| matches!(el, kurbo::PathEl::MoveTo(_)))
        .count();
    assert_eq!(moves, 2);
}

#[test]
fn set_pixel_uses_its_own_color() {
    let mut ctx = ReplayContext::new();
    let px: SetPixel = decoded(vec![0x00FF, 0x0000, 3, 2]);
    assert_eq!(px.color, Color::rgb(255, 0, 0));
    assert_eq!(px.at, RawPoint::new(2, 3));

    let surface = replay(&px, &mut ctx);
    let SurfaceOp::Fill { paint, .. } = &surface.ops()[0] else {
        panic!("expected a fill");
    };
    assert_eq!(
        *paint,
        PaintSummary::Solid {
            color: Color::rgb(255, 0, 0)
        }
    );
}

#[test]
fn flood_fill_draws_nothing() {
    let mut ctx = ReplayContext::new();
    let ff: ExtFloodFill = decoded(vec![1, 0, 0, 5, 5]);
    assert_eq!(ff.mode, 1);
    assert!(replay(&ff, &mut ctx).ops().is_empty());
}

#[test]
fn pat_blt_honours_constant_raster_ops() {
    let mut ctx = ReplayContext::new();
    let whiteness = PatBlt {
        rop: WHITENESS,
        dest: RawExtentRect {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        },
        ..PatBlt::default()
    };
    let decoded_back: PatBlt = decoded(whiteness.encode().unwrap().params().to_vec());
    assert_eq!(decoded_back.rop, WHITENESS);
    assert_eq!(decoded_back.dest, whiteness.dest);

    let surface = replay(&decoded_back, &mut ctx);
    assert!(matches!(
        &surface.ops()[0],
        SurfaceOp::Fill { paint: PaintSummary::Solid { color }, .. } if *color == Color::WHITE
    ));

    let invert = PatBlt {
        rop: DSTINVERT,
        ..decoded_back
    };
    assert!(replay(&invert, &mut ctx).ops().is_empty());
}

#[test]
fn negative_extents_scale_from_the_smaller_corner() {
    let r = RawExtentRect {
        x: 10,
        y: 10,
        width: -4,
        height: 6,
    };
    assert_eq!(
        r.scaled(Scale::new(2.0, 1.0)),
        ScaledRect {
            x: 12,
            y: 10,
            width: 8,
            height: 6
        }
    );
}
