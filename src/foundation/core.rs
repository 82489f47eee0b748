pub use kurbo::{Point, Rect, Size, Vec2};

/// A point in time or a duration on the host clock, in whole milliseconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// Zero milliseconds.
    pub const ZERO: Self = Self(0);

    /// Add a duration, saturating at `u64::MAX`.
    pub fn saturating_add(self, rhs: Millis) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Subtract a duration, saturating at zero.
    pub fn saturating_sub(self, rhs: Millis) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Round a fractional millisecond value; negative and non-finite input maps to zero.
    pub fn from_f64_round(ms: f64) -> Self {
        if !ms.is_finite() || ms <= 0.0 {
            return Self::ZERO;
        }
        Self(ms.round() as u64)
    }
}

/// Visible window onto the page: its size and how far the page is scrolled.
///
/// Reference points are expressed in viewport coordinates (origin at the top-left of the visible
/// area), the same space pointer events are reported in.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Visible area, in viewport units.
    pub size: Size,
    /// Page scroll offset; page coordinates minus this give viewport coordinates.
    #[serde(default)]
    pub scroll: Vec2,
}

impl Viewport {
    /// Non-finite or negative dimensions are clamped to zero.
    pub fn new(width: f64, height: f64) -> Self {
        fn dim(v: f64) -> f64 {
            if v.is_finite() { v.max(0.0) } else { 0.0 }
        }

        Self {
            size: Size::new(dim(width), dim(height)),
            scroll: Vec2::ZERO,
        }
    }

    /// Same size, scrolled to `scroll`.
    pub fn with_scroll(mut self, scroll: Vec2) -> Self {
        self.scroll = scroll;
        self
    }

    /// Visible width.
    pub fn width(self) -> f64 {
        self.size.width
    }

    /// Visible height.
    pub fn height(self) -> f64 {
        self.size.height
    }

    /// The viewport rectangle in viewport coordinates.
    pub fn bounds(self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.size)
    }

    /// True when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.size.width <= 0.0 || self.size.height <= 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
