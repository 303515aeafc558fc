/// Scale a logical coordinate: `floor(raw * scale + 0.5)`.
pub fn scale_coord(raw: i32, scale: f64) -> i32 {
    (f64::from(raw) * scale + 0.5).floor() as i32
}

/// Scale a length. Uses the magnitude of `raw` and never collapses a non-zero length to zero.
pub fn scale_length(raw: i32, scale: f64) -> i32 {
    if raw == 0 {
        return 0;
    }
    scale_coord(raw.saturating_abs(), scale.abs()).max(1)
}

/// Per-command horizontal/vertical scale factors.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Scale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(self, raw: i16) -> i32 {
        scale_coord(i32::from(raw), self.x)
    }

    pub fn y(self, raw: i16) -> i32 {
        scale_coord(i32::from(raw), self.y)
    }

    pub fn width(self, raw: i32) -> i32 {
        scale_length(raw, self.x)
    }

    pub fn height(self, raw: i32) -> i32 {
        scale_length(raw, self.y)
    }

    pub fn point(self, p: RawPoint) -> ScaledPoint {
        ScaledPoint {
            x: self.x(p.x),
            y: self.y(p.y),
        }
    }

    /// Scale a rectangle given by its corners: origin via [`Scale::x`]/[`Scale::y`] of the
    /// top-left corner, extent via the length rule.
    pub fn rect(self, r: RawRect) -> ScaledRect {
        let left = r.left.min(r.right);
        let top = r.top.min(r.bottom);
        ScaledRect {
            x: self.x(left),
            y: self.y(top),
            width: self.width(r.width()),
            height: self.height(r.height()),
        }
    }
}

/// Unscaled logical point as stored in a record.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RawPoint {
    pub x: i16,
    pub y: i16,
}

impl RawPoint {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Unscaled logical rectangle as stored in a record (corners, not extents).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RawRect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl RawRect {
    pub fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(self) -> i32 {
        (i32::from(self.right) - i32::from(self.left)).abs()
    }

    pub fn height(self) -> i32 {
        (i32::from(self.bottom) - i32::from(self.top)).abs()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ScaledPoint {
    pub x: i32,
    pub y: i32,
}

impl ScaledPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(f64::from(self.x), f64::from(self.y))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ScaledRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScaledRect {
    pub fn right(self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(self) -> i32 {
        self.y + self.height
    }

    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
