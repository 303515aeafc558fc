use std::sync::Arc;

use super::*;
use crate::gdi::objects::{LineCap, LineJoin};

fn stroke(width: f64) -> StrokeStyle {
    StrokeStyle {
        width,
        color: Color::BLACK,
        dash: Vec::new(),
        cap: LineCap::Round,
        join: LineJoin::Round,
    }
}

#[test]
fn ops_capture_transform_and_clip_at_call_time() {
    let mut surface = RecordingSurface::new();
    surface.set_transform(Affine::scale(2.0));
    surface.set_clip(Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
    surface.draw_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), &stroke(1.0));
    surface.set_clip(None);
    surface.fill_path(&BezPath::new(), &Paint::Solid(Color::WHITE), FillRule::NonZero);

    let ops = surface.ops();
    assert!(matches!(
        &ops[0],
        SurfaceOp::Stroke { transform, clip: Some(_), .. } if *transform == Affine::scale(2.0)
    ));
    assert!(matches!(&ops[1], SurfaceOp::Fill { clip: None, rule: FillRule::NonZero, .. }));
}

#[test]
fn strokes_filters_stroke_ops() {
    let mut surface = RecordingSurface::new();
    surface.draw_line(Point::ZERO, Point::new(3.0, 0.0), &stroke(2.0));
    surface.fill_path(&BezPath::new(), &Paint::Solid(Color::BLACK), FillRule::EvenOdd);
    surface.draw_line(Point::ZERO, Point::new(0.0, 3.0), &stroke(4.0));
    let widths: Vec<f64> = surface.strokes().map(|s| s.width).collect();
    assert_eq!(widths, vec![2.0, 4.0]);
}

#[test]
fn pattern_paints_are_summarised_by_size() {
    let bmp = Arc::new(DecodedBitmap {
        width: 8,
        height: 4,
        rgba8_premul: Arc::new(vec![0; 8 * 4 * 4]),
    });
    assert_eq!(
        PaintSummary::from(&Paint::Pattern(bmp)),
        PaintSummary::Pattern {
            width: 8,
            height: 4
        }
    );
}

#[test]
fn ops_serialize_with_an_op_tag() {
    let mut surface = RecordingSurface::new();
    surface.fill_path(
        &BezPath::new(),
        &Paint::Hatched {
            hatch: HatchStyle::Cross,
            color: Color::BLACK,
            background: None,
        },
        FillRule::EvenOdd,
    );
    let json = serde_json::to_value(surface.ops()).unwrap();
    assert_eq!(json[0]["op"], "fill");
    assert_eq!(json[0]["paint"]["kind"], "hatched");
}
