use kurbo::Affine;

use crate::foundation::{
    core::{Point, Rect, Size, Viewport},
    math::Rng64,
};

/// How reference points are assigned to shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPolicy {
    /// Center of each node's on-screen bounding box.
    #[default]
    Measured,
    /// Seeded scatter around the viewport edges, outside the safe zone.
    Procedural,
}

/// Centered region kept free of procedurally placed shapes, sized relative to the viewport.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SafeZone {
    /// Zone width over viewport width.
    pub width_fraction: f64,
    /// Zone height over viewport height.
    pub height_fraction: f64,
}

impl Default for SafeZone {
    fn default() -> Self {
        Self {
            width_fraction: 0.6,
            height_fraction: 0.8,
        }
    }
}

impl SafeZone {
    /// Clamp both fractions into `[0, 1]`; non-finite values fall back to the defaults.
    pub fn normalized(self) -> Self {
        let d = Self::default();
        let f = |v: f64, fallback: f64| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        Self {
            width_fraction: f(self.width_fraction, d.width_fraction),
            height_fraction: f(self.height_fraction, d.height_fraction),
        }
    }

    /// The zone in viewport coordinates.
    pub fn rect(self, viewport: Size) -> Rect {
        let z = self.normalized();
        let size = Size::new(
            viewport.width * z.width_fraction,
            viewport.height * z.height_fraction,
        );
        let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        Rect::from_center_size(center, size)
    }
}

/// Edge band a procedurally placed shape lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRegion {
    /// Above the safe zone, full width.
    Top,
    /// Right of the safe zone, full height.
    Right,
    /// Below the safe zone, full width.
    Bottom,
    /// Left of the safe zone, full height.
    Left,
}

impl EdgeRegion {
    /// Shapes cycle top, right, bottom, left in document order.
    pub fn for_index(index: usize) -> Self {
        match index % 4 {
            0 => Self::Top,
            1 => Self::Right,
            2 => Self::Bottom,
            _ => Self::Left,
        }
    }

    /// The band between the viewport edge and the safe zone.
    pub fn band(self, bounds: Rect, safe: Rect) -> Rect {
        match self {
            Self::Top => Rect::new(bounds.x0, bounds.y0, bounds.x1, safe.y0),
            Self::Right => Rect::new(safe.x1, bounds.y0, bounds.x1, bounds.y1),
            Self::Bottom => Rect::new(bounds.x0, safe.y1, bounds.x1, bounds.y1),
            Self::Left => Rect::new(bounds.x0, bounds.y0, safe.x0, bounds.y1),
        }
    }
}

/// Scatter `count` points around the viewport edges, avoiding the safe zone.
///
/// Point `i` lands in [`EdgeRegion::for_index`]`(i)` at an offset drawn from a SplitMix64 stream
/// seeded with `seed`, so the same seed always produces the same relative placement.
#[tracing::instrument(skip(zone))]
pub fn procedural_points(count: usize, viewport: Viewport, zone: SafeZone, seed: u64) -> Vec<Point> {
    let bounds = viewport.bounds();
    let safe = zone.rect(viewport.size);
    let mut rng = Rng64::new(seed);

    (0..count)
        .map(|i| {
            let band = EdgeRegion::for_index(i).band(bounds, safe);
            let x = rng.range_f64(band.x0, band.x1);
            let y = rng.range_f64(band.y0, band.y1);
            Point::new(x, y)
        })
        .collect()
}

/// Transform fitting a `frame`-sized document into `target` with `xMidYMid slice` semantics:
/// uniform scale so the document covers the target, centered, overflow cropped.
///
/// `None` when either size is degenerate.
pub fn slice_fit(frame: Size, target: Size) -> Option<Affine> {
    if !(frame.width > 0.0 && frame.height > 0.0 && target.width > 0.0 && target.height > 0.0) {
        return None;
    }
    let s = (target.width / frame.width).max(target.height / frame.height);
    let tx = (target.width - frame.width * s) / 2.0;
    let ty = (target.height - frame.height * s) / 2.0;
    Some(Affine::translate((tx, ty)) * Affine::scale(s))
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/layout.rs"]
mod tests;
