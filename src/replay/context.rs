use std::sync::Arc;

use crate::{
    bitmap::decode::{BitmapDecoder, DibDecoder},
    foundation::core::{Affine, BezPath, Color, Vec2},
    foundation::error::{WmfError, WmfResult},
    foundation::math::{RawPoint, Scale, ScaledPoint, ScaledRect},
    gdi::objects::{Brush, Font, GdiObject, Palette, Pen, Region},
    replay::surface::{DrawSurface, FillRule, Paint, StrokeStyle},
};

pub const TRANSPARENT: u16 = 1;
pub const OPAQUE: u16 = 2;

pub const MM_TEXT: u16 = 1;
pub const MM_ISOTROPIC: u16 = 7;
pub const MM_ANISOTROPIC: u16 = 8;

pub const ALTERNATE: u16 = 1;
pub const R2_COPYPEN: u16 = 13;

/// Width/height pair for window and viewport extents, in unscaled logical units.
///
/// Signed: a negative extent flips the axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Extent {
    pub width: i32,
    pub height: i32,
}

impl Extent {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl From<RawPoint> for Extent {
    fn from(p: RawPoint) -> Self {
        Self::new(i32::from(p.x), i32::from(p.y))
    }
}

/// One device-context snapshot. `SaveDC` pushes a clone; `RestoreDC` swaps one back in.
#[derive(Clone, Debug, PartialEq)]
pub struct DcState {
    pub pen: Arc<Pen>,
    pub brush: Arc<Brush>,
    pub font: Arc<Font>,
    pub palette: Option<Arc<Palette>>,
    /// Handle of the selected palette, needed to write palette edits back to the table.
    pub palette_handle: Option<u16>,
    pub region: Option<Arc<Region>>,
    pub position: ScaledPoint,
    pub bk_mode: u16,
    pub bk_color: Color,
    pub text_color: Color,
    pub text_align: u16,
    pub poly_fill_mode: u16,
    pub rop2: u16,
    pub map_mode: u16,
    pub stretch_blt_mode: u16,
    pub rel_abs: u16,
    pub text_char_extra: i16,
    pub break_count: u16,
    pub break_extra: i16,
    pub mapper_flags: u32,
    pub layout: u32,
    /// Clip rectangle in logical units; `None` is unclipped.
    pub clip: Option<ScaledRect>,
    pub window_org: ScaledPoint,
    pub window_ext: Option<Extent>,
    pub viewport_org: ScaledPoint,
    pub viewport_ext: Option<Extent>,
}

impl Default for DcState {
    fn default() -> Self {
        Self {
            pen: Arc::new(Pen::default()),
            brush: Arc::new(Brush::default()),
            font: Arc::new(Font::default()),
            palette: None,
            palette_handle: None,
            region: None,
            position: ScaledPoint::default(),
            bk_mode: OPAQUE,
            bk_color: Color::WHITE,
            text_color: Color::BLACK,
            text_align: 0,
            poly_fill_mode: ALTERNATE,
            rop2: R2_COPYPEN,
            map_mode: MM_TEXT,
            stretch_blt_mode: 1,
            rel_abs: 1,
            text_char_extra: 0,
            break_count: 0,
            break_extra: 0,
            mapper_flags: 0,
            layout: 0,
            clip: None,
            window_org: ScaledPoint::default(),
            window_ext: None,
            viewport_org: ScaledPoint::default(),
            viewport_ext: None,
        }
    }
}

impl DcState {
    /// Logical-to-surface transform for the current window/viewport mapping.
    ///
    /// Origins always translate. Extents only contribute in the isotropic and anisotropic map
    /// modes, and only once both the window and the viewport extent have been set.
    pub fn transform(&self) -> Affine {
        let to_window = Affine::translate(Vec2::new(
            -f64::from(self.window_org.x),
            -f64::from(self.window_org.y),
        ));
        let to_viewport = Affine::translate(Vec2::new(
            f64::from(self.viewport_org.x),
            f64::from(self.viewport_org.y),
        ));
        let ratio = match (self.map_mode, self.window_ext, self.viewport_ext) {
            (MM_ISOTROPIC | MM_ANISOTROPIC, Some(win), Some(vp))
                if win.width != 0 && win.height != 0 =>
            {
                let sx = f64::from(vp.width) / f64::from(win.width);
                let sy = f64::from(vp.height) / f64::from(win.height);
                if self.map_mode == MM_ISOTROPIC {
                    let m = sx.abs().min(sy.abs());
                    Affine::scale_non_uniform(m.copysign(sx), m.copysign(sy))
                } else {
                    Affine::scale_non_uniform(sx, sy)
                }
            }
            _ => Affine::IDENTITY,
        };
        to_viewport * ratio * to_window
    }

    pub fn fill_rule(&self) -> FillRule {
        FillRule::from_mode(self.poly_fill_mode)
    }
}

/// Replay state for one metafile: the GDI object table plus the device-context stack.
pub struct ReplayContext {
    objects: Vec<Option<GdiObject>>,
    dc: DcState,
    saved: Vec<DcState>,
    decoder: Arc<dyn BitmapDecoder>,
}

impl Default for ReplayContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReplayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayContext")
            .field("objects", &self.objects)
            .field("dc", &self.dc)
            .field("saved", &self.saved.len())
            .finish_non_exhaustive()
    }
}

impl ReplayContext {
    pub fn new() -> Self {
        Self::with_decoder(Arc::new(DibDecoder))
    }

    pub fn with_decoder(decoder: Arc<dyn BitmapDecoder>) -> Self {
        Self {
            objects: Vec::new(),
            dc: DcState::default(),
            saved: Vec::new(),
            decoder,
        }
    }

    pub fn dc(&self) -> &DcState {
        &self.dc
    }

    pub fn dc_mut(&mut self) -> &mut DcState {
        &mut self.dc
    }

    pub fn decoder(&self) -> &dyn BitmapDecoder {
        self.decoder.as_ref()
    }

    // ---- DC stack ----

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.dc.clone());
    }

    /// `RestoreDC(n)`: positive `n` is the 1-based saved position, negative `n` is relative to
    /// the top of the stack, `0` does nothing.
    pub fn restore(&mut self, saved_dc: i16) -> WmfResult<()> {
        if saved_dc == 0 {
            return Ok(());
        }
        let depth = self.saved.len();
        let target = if saved_dc > 0 {
            i64::from(saved_dc) - 1
        } else {
            depth as i64 + i64::from(saved_dc)
        };
        if target < 0 || target >= depth as i64 {
            return Err(WmfError::DcStackUnderflow {
                requested: saved_dc,
                depth,
            });
        }
        let target = target as usize;
        self.dc = self.saved[target].clone();
        self.saved.truncate(target);
        Ok(())
    }

    // ---- object table ----

    pub fn objects(&self) -> &[Option<GdiObject>] {
        &self.objects
    }

    pub fn object(&self, handle: u16) -> Option<&GdiObject> {
        self.objects.get(usize::from(handle)).and_then(Option::as_ref)
    }

    /// Store `obj` in the lowest free slot and install it in the live DC.
    ///
    /// Handles are 16-bit, so a table with every slot taken refuses the object.
    pub fn create_object(&mut self, obj: GdiObject) -> WmfResult<u16> {
        let slot = match self.objects.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                self.objects.push(None);
                self.objects.len() - 1
            }
        };
        let Ok(handle) = u16::try_from(slot) else {
            self.objects.truncate(slot);
            return Err(WmfError::invalid_handle(u16::MAX, "object table is full"));
        };
        self.objects[slot] = Some(obj.clone());
        self.install(&obj, handle);
        tracing::trace!(handle, kind = obj.kind(), "created object");
        Ok(handle)
    }

    /// Select the object at `handle` into the live DC. Returns `false` for a dangling handle.
    ///
    /// Selecting a region also makes its bounding box the clip rectangle.
    pub fn select_object(&mut self, handle: u16, scale: Scale) -> bool {
        let Some(obj) = self.object(handle).cloned() else {
            tracing::warn!(handle, "SelectObject on an empty handle");
            return false;
        };
        if let GdiObject::Region(region) = &obj {
            self.dc.clip = Some(scale.rect(region.bounds));
        }
        self.install(&obj, handle);
        true
    }

    pub fn delete_object(&mut self, handle: u16) -> bool {
        match self.objects.get_mut(usize::from(handle)) {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => {
                tracing::warn!(handle, "DeleteObject on an empty handle");
                false
            }
        }
    }

    fn install(&mut self, obj: &GdiObject, handle: u16) {
        match obj {
            GdiObject::Pen(p) => self.dc.pen = Arc::clone(p),
            GdiObject::Brush(b) => self.dc.brush = Arc::clone(b),
            GdiObject::Font(f) => self.dc.font = Arc::clone(f),
            GdiObject::Palette(p) => {
                self.dc.palette = Some(Arc::clone(p));
                self.dc.palette_handle = Some(handle);
            }
            GdiObject::Region(r) => self.dc.region = Some(Arc::clone(r)),
        }
    }

    pub fn region(&self, handle: u16) -> WmfResult<Arc<Region>> {
        match self.object(handle) {
            Some(GdiObject::Region(r)) => Ok(Arc::clone(r)),
            Some(other) => Err(WmfError::invalid_handle(
                handle,
                format!("expected a region, found a {}", other.kind()),
            )),
            None => Err(WmfError::invalid_handle(handle, "no object at this handle")),
        }
    }

    pub fn brush(&self, handle: u16) -> WmfResult<Arc<Brush>> {
        match self.object(handle) {
            Some(GdiObject::Brush(b)) => Ok(Arc::clone(b)),
            Some(other) => Err(WmfError::invalid_handle(
                handle,
                format!("expected a brush, found a {}", other.kind()),
            )),
            None => Err(WmfError::invalid_handle(handle, "no object at this handle")),
        }
    }

    /// Apply `edit` to a copy of the selected palette and publish the copy to both the table
    /// slot and the live DC. Returns `false` when no palette is selected.
    pub fn edit_palette(&mut self, edit: impl FnOnce(&mut Palette)) -> bool {
        let Some(current) = self.dc.palette.as_deref() else {
            tracing::warn!("palette edit without a selected palette");
            return false;
        };
        let mut next = current.clone();
        edit(&mut next);
        let next = Arc::new(next);
        if let Some(slot) = self
            .dc
            .palette_handle
            .and_then(|h| self.objects.get_mut(usize::from(h)))
            && matches!(slot, Some(GdiObject::Palette(_)))
        {
            *slot = Some(GdiObject::Palette(Arc::clone(&next)));
        }
        self.dc.palette = Some(next);
        true
    }

    /// Resolve `PALETTEINDEX` references through the selected palette.
    pub fn resolve_color(&self, color: Color) -> Color {
        match color.palette_index() {
            Some(index) => self
                .dc
                .palette
                .as_ref()
                .and_then(|p| p.get(index))
                .map(Color::without_flags)
                .unwrap_or(Color::BLACK),
            None => color.without_flags(),
        }
    }

    // ---- drawing helpers ----

    /// Push the current mapping and clip to the surface before a draw call.
    pub fn sync(&self, surface: &mut dyn DrawSurface) {
        surface.set_transform(self.dc.transform());
        surface.set_clip(self.dc.clip.map(ScaledRect::to_kurbo));
    }

    pub fn paint_for(&self, brush: &Brush) -> Option<Paint> {
        match brush {
            Brush::Null => None,
            Brush::Solid(c) => Some(Paint::Solid(self.resolve_color(*c))),
            Brush::Hatched { hatch, color } => Some(Paint::Hatched {
                hatch: *hatch,
                color: self.resolve_color(*color),
                background: (self.dc.bk_mode == OPAQUE)
                    .then(|| self.resolve_color(self.dc.bk_color)),
            }),
            Brush::Pattern(Some(bmp)) => Some(Paint::Pattern(Arc::clone(bmp))),
            Brush::Pattern(None) => Some(Paint::Solid(self.resolve_color(self.dc.text_color))),
        }
    }

    /// Stroke style of the selected pen, or `None` for `PS_NULL`.
    pub fn stroke_style(&self, scale: Scale) -> Option<StrokeStyle> {
        let pen = &self.dc.pen;
        if !pen.is_visible() {
            return None;
        }
        let width = f64::from(scale.width(i32::from(pen.width)).max(1));
        Some(StrokeStyle {
            width,
            color: self.resolve_color(pen.color),
            dash: pen.dash().pattern().iter().map(|d| d * width).collect(),
            cap: pen.cap(),
            join: pen.join(),
        })
    }

    /// Fill `path` with the current brush (when `fill`) and outline it with the current pen.
    pub fn draw_shape(
        &self,
        surface: &mut dyn DrawSurface,
        path: &BezPath,
        scale: Scale,
        fill: bool,
    ) {
        self.sync(surface);
        if fill && let Some(paint) = self.paint_for(&self.dc.brush) {
            surface.fill_path(path, &paint, self.dc.fill_rule());
        }
        if let Some(stroke) = self.stroke_style(scale) {
            surface.stroke_path(path, &stroke);
        }
    }

    // ---- clipping ----

    pub fn intersect_clip(&mut self, rect: ScaledRect) {
        self.dc.clip = Some(match self.dc.clip {
            Some(current) => intersect(current, rect),
            None => rect,
        });
    }

    /// Exclude `rect` from the clip. Regions are tracked as bounding boxes, so the result is
    /// the box of what remains.
    pub fn exclude_clip(&mut self, rect: ScaledRect) {
        if let Some(current) = self.dc.clip {
            self.dc.clip = Some(exclude_bbox(current, rect));
        }
    }

    pub fn offset_clip(&mut self, dx: i32, dy: i32) {
        if let Some(c) = self.dc.clip.as_mut() {
            c.x += dx;
            c.y += dy;
        }
    }
}

fn intersect(a: ScaledRect, b: ScaledRect) -> ScaledRect {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    ScaledRect {
        x,
        y,
        width: (right - x).max(0),
        height: (bottom - y).max(0),
    }
}

fn exclude_bbox(clip: ScaledRect, cut: ScaledRect) -> ScaledRect {
    let covers_x = cut.x <= clip.x && cut.right() >= clip.right();
    let covers_y = cut.y <= clip.y && cut.bottom() >= clip.bottom();
    let mut out = clip;
    if covers_x && covers_y {
        out.width = 0;
        out.height = 0;
    } else if covers_y && cut.x <= clip.x && cut.right() > clip.x {
        out.x = cut.right();
        out.width = clip.right() - out.x;
    } else if covers_y && cut.right() >= clip.right() && cut.x < clip.right() {
        out.width = cut.x - clip.x;
    } else if covers_x && cut.y <= clip.y && cut.bottom() > clip.y {
        out.y = cut.bottom();
        out.height = clip.bottom() - out.y;
    } else if covers_x && cut.bottom() >= clip.bottom() && cut.y < clip.bottom() {
        out.height = cut.y - clip.y;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/replay/context.rs"]
mod tests;
