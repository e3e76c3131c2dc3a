//! Static ring layout.

use std::f64::consts::TAU;

use super::Point;

/// Distance kept between the ring and the viewport edge.
const MARGIN: f64 = 100.0;

/// Places `count` nodes on a circle of radius `min(width, height) / 2 - 100`
/// centered in the viewport, at equal angles starting from the positive x
/// axis, in input order.
///
/// The radius is not floored: viewports smaller than 200 pixels produce a
/// zero or negative radius, which mirrors the ring through the center.
#[must_use]
pub fn positions(count: usize, width: f64, height: f64) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let radius = width.min(height) / 2.0 - MARGIN;
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / count as f64;
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = i as f64 * step;
            Point::new(width / 2.0 + radius * angle.cos(), height / 2.0 + radius * angle.sin())
        })
        .collect()
}
