use crate::{
    bitmap::decode::DecodedBitmap,
    foundation::core::{Affine, BezPath, Color, Point, Rect},
    gdi::objects::HatchStyle,
    replay::surface::{DrawSurface, FillRule, Paint, StrokeStyle, TextRun},
};

/// Serializable description of a fill paint.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaintSummary {
    Solid {
        color: Color,
    },
    Hatched {
        hatch: HatchStyle,
        color: Color,
        background: Option<Color>,
    },
    Pattern {
        width: u32,
        height: u32,
    },
}

impl From<&Paint> for PaintSummary {
    fn from(paint: &Paint) -> Self {
        match paint {
            Paint::Solid(color) => Self::Solid { color: *color },
            Paint::Hatched {
                hatch,
                color,
                background,
            } => Self::Hatched {
                hatch: *hatch,
                color: *color,
                background: *background,
            },
            Paint::Pattern(bmp) => Self::Pattern {
                width: bmp.width,
                height: bmp.height,
            },
        }
    }
}

/// One recorded draw call, with the transform and clip in force when it was made.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    Fill {
        transform: Affine,
        clip: Option<Rect>,
        path: BezPath,
        paint: PaintSummary,
        rule: FillRule,
    },
    Stroke {
        transform: Affine,
        clip: Option<Rect>,
        path: BezPath,
        stroke: StrokeStyle,
    },
    Text {
        transform: Affine,
        clip: Option<Rect>,
        origin: Point,
        text: String,
        face: String,
        size: f64,
        color: Color,
    },
    Image {
        transform: Affine,
        clip: Option<Rect>,
        width: u32,
        height: u32,
        dest: Rect,
    },
}

/// Surface that records every call instead of drawing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    transform: Affine,
    clip: Option<Rect>,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<SurfaceOp> {
        self.ops
    }

    pub fn strokes(&self) -> impl Iterator<Item = &StrokeStyle> {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::Stroke { stroke, .. } => Some(stroke),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint, rule: FillRule) {
        self.ops.push(SurfaceOp::Fill {
            transform: self.transform,
            clip: self.clip,
            path: path.clone(),
            paint: paint.into(),
            rule,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &StrokeStyle) {
        self.ops.push(SurfaceOp::Stroke {
            transform: self.transform,
            clip: self.clip,
            path: path.clone(),
            stroke: stroke.clone(),
        });
    }

    fn draw_text(&mut self, run: &TextRun) {
        self.ops.push(SurfaceOp::Text {
            transform: self.transform,
            clip: self.clip,
            origin: run.origin,
            text: run.text.clone(),
            face: run.font.face_name.clone(),
            size: run.size,
            color: run.color,
        });
    }

    fn draw_image(&mut self, image: &DecodedBitmap, dest: Rect) {
        self.ops.push(SurfaceOp::Image {
            transform: self.transform,
            clip: self.clip,
            width: image.width,
            height: image.height,
            dest,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
