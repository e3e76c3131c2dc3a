//! Pan/zoom transform for the tree view.

use serde::{Deserialize, Serialize};

use super::Point;

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.2;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 3.0;
/// Share of the viewport the initial fit fills.
const FIT_MARGIN: f64 = 0.9;
/// Wheel delta (in pixels) per doubling of scale.
const WHEEL_SENSITIVITY: f64 = 0.002;

/// Maps layout space to screen space: `screen = layout * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal translation.
    pub x: f64,
    /// Vertical translation.
    pub y: f64,
    /// Scale factor. Interactive zoom keeps it within `MIN_SCALE..=MAX_SCALE`;
    /// a fitted transform may go below `MIN_SCALE` so large trees stay visible.
    pub k: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, k: 1.0 }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Top-left corner.
    pub min: Point,
    /// Bottom-right corner.
    pub max: Point,
}

impl Bounds {
    /// Smallest box containing every circle, or `None` when there are none.
    pub fn of_circles(circles: impl IntoIterator<Item = (Point, f64)>) -> Option<Self> {
        circles.into_iter().fold(None, |acc, (c, r)| {
            let (lo, hi) = (Point::new(c.x - r, c.y - r), Point::new(c.x + r, c.y + r));
            Some(match acc {
                None => Self { min: lo, max: hi },
                Some(b) => Self {
                    min: Point::new(b.min.x.min(lo.x), b.min.y.min(lo.y)),
                    max: Point::new(b.max.x.max(hi.x), b.max.y.max(hi.y)),
                },
            })
        })
    }

    fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

impl Transform {
    /// The transform that shows all of `bounds` centered in the viewport,
    /// filling at most 90% of it. The scale is capped at `MAX_SCALE` but has
    /// no lower bound.
    #[must_use]
    pub fn fit(bounds: Bounds, width: f64, height: f64) -> Self {
        let span_x = (bounds.max.x - bounds.min.x).max(f64::EPSILON);
        let span_y = (bounds.max.y - bounds.min.y).max(f64::EPSILON);
        let k = (width / span_x).min(height / span_y) * FIT_MARGIN;
        let k = if k.is_finite() && k > 0.0 { k.min(MAX_SCALE) } else { MAX_SCALE };
        let center = bounds.center();
        Self { x: width / 2.0 - center.x * k, y: height / 2.0 - center.y * k, k }
    }

    /// Layout point to screen point.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    /// Screen point to layout point.
    #[must_use]
    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// Translates by a screen-space offset.
    #[must_use]
    pub fn pan(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..self }
    }

    /// Smallest scale interactive zoom may reach after this transform was
    /// fitted: `MIN_SCALE`, or lower when the fit itself is smaller.
    #[must_use]
    pub fn zoom_floor(&self) -> f64 {
        MIN_SCALE.min(self.k)
    }

    /// Rescales by `factor` keeping the layout point under `anchor` fixed.
    /// The scale stays at most `MAX_SCALE` and at least the smaller of
    /// `floor` and `MIN_SCALE`.
    #[must_use]
    pub fn zoom_about(self, anchor: Point, factor: f64, floor: f64) -> Self {
        let k = clamp_scale(self.k * factor, floor);
        let fixed = self.invert(anchor);
        Self { x: anchor.x - fixed.x * k, y: anchor.y - fixed.y * k, k }
    }

    /// Applies one wheel event; positive `delta_y` zooms out.
    #[must_use]
    pub fn wheel(self, anchor: Point, delta_y: f64, floor: f64) -> Self {
        self.zoom_about(anchor, 2.0_f64.powf(-delta_y * WHEEL_SENSITIVITY), floor)
    }

    /// SVG `transform` attribute value.
    #[must_use]
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

fn clamp_scale(k: f64, floor: f64) -> f64 {
    if k.is_finite() {
        k.clamp(floor.min(MIN_SCALE), MAX_SCALE)
    } else {
        MAX_SCALE
    }
}
