use std::sync::Arc;

use crate::{
    bitmap::decode::DecodedBitmap,
    foundation::core::{Affine, BezPath, Color, Rect},
    foundation::error::{WmfError, WmfResult},
    gdi::objects::{LineCap, LineJoin},
    render::FrameRGBA,
    replay::surface::{DrawSurface, FillRule, Paint, StrokeStyle, TextRun},
};

/// Raster surface backed by `vello_cpu`.
///
/// Hatched brushes are approximated by their foreground color. Text is counted but not drawn:
/// no font data is bundled.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    transform: Affine,
    clip: Option<Rect>,
    skipped_text: usize,
}

impl CpuSurface {
    pub fn new(width: u32, height: u32, clear_rgba: Option<[u8; 4]>) -> WmfResult<Self> {
        let width: u16 = width
            .try_into()
            .map_err(|_| WmfError::Other(anyhow::anyhow!("surface width exceeds u16")))?;
        let height: u16 = height
            .try_into()
            .map_err(|_| WmfError::Other(anyhow::anyhow!("surface height exceeds u16")))?;
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        if let Some([r, g, b, a]) = clear_rgba {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }
        Ok(Self {
            width,
            height,
            ctx,
            transform: Affine::IDENTITY,
            clip: None,
            skipped_text: 0,
        })
    }

    pub fn skipped_text(&self) -> usize {
        self.skipped_text
    }

    /// Rasterise everything drawn so far.
    pub fn finish(mut self) -> FrameRGBA {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Run `draw` inside the current clip, with the current transform installed.
    fn clipped(&mut self, draw: impl FnOnce(&mut vello_cpu::RenderContext)) {
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match self.clip {
            Some(clip) => {
                self.ctx.push_clip_layer(&rect_to_cpu_path(clip));
                draw(&mut self.ctx);
                self.ctx.pop_layer();
            }
            None => draw(&mut self.ctx),
        }
    }
}

impl DrawSurface for CpuSurface {
    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint, rule: FillRule) {
        let cpu_path = bezpath_to_cpu(path);
        let fill = match rule {
            FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
            FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
        };
        let pattern = match paint {
            Paint::Pattern(bmp) => match pattern_paint(bmp) {
                Ok(image) => Some(image),
                Err(err) => {
                    tracing::warn!(%err, "pattern brush dropped");
                    return;
                }
            },
            _ => None,
        };
        self.clipped(|ctx| {
            ctx.set_fill_rule(fill);
            match (paint, pattern) {
                (_, Some(image)) => ctx.set_paint(image),
                (Paint::Solid(c), None) => ctx.set_paint(color_to_cpu(*c)),
                (Paint::Hatched { color, background, .. }, None) => {
                    if let Some(bg) = background {
                        ctx.set_paint(color_to_cpu(*bg));
                        ctx.fill_path(&cpu_path);
                    }
                    ctx.set_paint(color_to_cpu(*color));
                }
                (Paint::Pattern(_), None) => return,
            }
            ctx.fill_path(&cpu_path);
        });
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &StrokeStyle) {
        let cpu_path = bezpath_to_cpu(path);
        let mut style = vello_cpu::kurbo::Stroke::new(stroke.width)
            .with_caps(match stroke.cap {
                LineCap::Round => vello_cpu::kurbo::Cap::Round,
                LineCap::Square => vello_cpu::kurbo::Cap::Square,
                LineCap::Flat => vello_cpu::kurbo::Cap::Butt,
            })
            .with_join(match stroke.join {
                LineJoin::Round => vello_cpu::kurbo::Join::Round,
                LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
                LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
            });
        if !stroke.dash.is_empty() {
            style = style.with_dashes(0.0, stroke.dash.iter().copied());
        }
        let color = color_to_cpu(stroke.color);
        self.clipped(|ctx| {
            ctx.set_stroke(style);
            ctx.set_paint(color);
            ctx.stroke_path(&cpu_path);
        });
    }

    fn draw_text(&mut self, run: &TextRun) {
        self.skipped_text += 1;
        tracing::trace!(text = %run.text, "text not rasterised");
    }

    fn draw_image(&mut self, image: &DecodedBitmap, dest: Rect) {
        let paint = match pattern_paint(image) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(%err, "image dropped");
                return;
            }
        };
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        if w == 0.0 || h == 0.0 || dest.width() == 0.0 || dest.height() == 0.0 {
            return;
        }
        let placement = self.transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / w, dest.height() / h);
        self.ctx.set_transform(affine_to_cpu(self.transform));
        let clip = self.clip;
        if let Some(c) = clip {
            self.ctx.push_clip_layer(&rect_to_cpu_path(c));
        }
        self.ctx.set_transform(affine_to_cpu(placement));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        if clip.is_some() {
            self.ctx.pop_layer();
        }
    }
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn pattern_paint(image: &DecodedBitmap) -> WmfResult<vello_cpu::Image> {
    let pixmap = image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler {
            x_extend: vello_cpu::peniko::Extend::Repeat,
            y_extend: vello_cpu::peniko::Extend::Repeat,
            ..Default::default()
        },
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu_path(r: Rect) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    out.move_to((r.x0, r.y0));
    out.line_to((r.x1, r.y0));
    out.line_to((r.x1, r.y1));
    out.line_to((r.x0, r.y1));
    out.close_path();
    out
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> WmfResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| WmfError::Other(anyhow::anyhow!("image width exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| WmfError::Other(anyhow::anyhow!("image height exceeds u16")))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(WmfError::Other(anyhow::anyhow!(
            "decoded image byte length mismatch"
        )));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
