use crate::{
    config::ReplaySettings,
    foundation::error::{WmfError, WmfResult},
    interpreter::{Interpreter, ReplayReport},
    record::{opcode, reader::Metafile},
};

pub mod cpu;
pub mod recording;

#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data, as PNG encoders expect.
    pub fn to_unpremultiplied(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            if a != 0 && a != 255 {
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
                }
            }
        }
        out
    }
}

/// Output size in pixels plus the scale that maps logical units onto it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Logical picture extent: placeable bounds, else the first window extent in the records.
pub fn logical_size(metafile: &Metafile) -> Option<(f64, f64)> {
    if let Some(b) = metafile.bounds() {
        return Some((f64::from(b.width()), f64::from(b.height())));
    }
    metafile
        .records
        .iter()
        .find(|r| r.opcode() == opcode::SET_WINDOW_EXT)
        .and_then(|r| Some((r.i16_at(1).ok()?, r.i16_at(0).ok()?)))
        .map(|(w, h)| (f64::from(w).abs(), f64::from(h).abs()))
}

/// Resolve the output size from explicit settings, the file's physical size, or its logical
/// extent, in that order.
pub fn frame_geometry(metafile: &Metafile, settings: &ReplaySettings) -> WmfResult<FrameGeometry> {
    let logical = logical_size(metafile)
        .filter(|(w, h)| *w > 0.0 && *h > 0.0)
        .ok_or_else(|| WmfError::header("picture has no bounds and no window extent"))?;
    let natural = metafile.frame_size().unwrap_or(logical);
    let (width, height) = match (settings.width, settings.height) {
        (Some(w), Some(h)) => (f64::from(w), f64::from(h)),
        (Some(w), None) => (f64::from(w), f64::from(w) * natural.1 / natural.0),
        (None, Some(h)) => (f64::from(h) * natural.0 / natural.1, f64::from(h)),
        (None, None) => (natural.0 * settings.scale, natural.1 * settings.scale),
    };
    let width = width.round().clamp(1.0, f64::from(u16::MAX)) as u32;
    let height = height.round().clamp(1.0, f64::from(u16::MAX)) as u32;
    Ok(FrameGeometry {
        width,
        height,
        scale_x: f64::from(width) / logical.0,
        scale_y: f64::from(height) / logical.1,
    })
}

/// Replay `metafile` onto a fresh CPU surface.
#[tracing::instrument(skip(metafile, settings))]
pub fn render_metafile(
    metafile: &Metafile,
    settings: &ReplaySettings,
) -> WmfResult<(FrameRGBA, ReplayReport)> {
    let geometry = frame_geometry(metafile, settings)?;
    let mut surface = cpu::CpuSurface::new(geometry.width, geometry.height, settings.clear_rgba)?;
    let report = Interpreter::new(settings.clone())
        .with_scale(geometry.scale_x, geometry.scale_y)
        .run(&metafile.records, &mut surface)?;
    Ok((surface.finish(), report))
}

#[cfg(test)]
#[path = "../tests/unit/render/mod.rs"]
mod tests;
