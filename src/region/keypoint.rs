//! Key point region geometry.

use serde::{Deserialize, Serialize};

use crate::geom::{BBox, Canvas, Coord, ItemViewport, Norm};

/// A single marked point, normalized 0–100, with a display diameter in
/// canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    /// Point x, as a percentage of item width.
    pub x: f64,
    /// Point y, as a percentage of item height.
    pub y: f64,
    /// Display diameter in canvas pixels; also the hit radius.
    pub width: f64,
}

impl KeyPoint {
    /// Creates a key point.
    pub fn new(x: f64, y: f64, width: f64) -> Self {
        Self { x, y, width }
    }

    /// Moves the point.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Hit test by canvas distance against the display radius.
    pub fn contains(&self, probe: Coord<Canvas>, viewport: &ItemViewport) -> bool {
        let center = viewport.to_canvas(Coord::new(self.x, self.y));
        center.distance_to(&probe) <= (self.width / 2.0).max(1.0)
    }

    /// Bounding box of the displayed marker, normalized.
    pub fn bounding_box(&self, viewport: &ItemViewport) -> BBox<Norm> {
        let rx = viewport.to_norm_x(self.width / 2.0);
        let ry = viewport.to_norm_y(self.width / 2.0);
        BBox::from_ltrb(self.x - rx, self.y - ry, self.x + rx, self.y + ry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_within_radius() {
        let viewport = ItemViewport::new(100, 100);
        let point = KeyPoint::new(50.0, 50.0, 10.0);

        assert!(point.contains(Coord::new(50.0, 50.0), &viewport));
        assert!(point.contains(Coord::new(54.0, 50.0), &viewport));
        assert!(!point.contains(Coord::new(56.0, 50.0), &viewport));
    }

    #[test]
    fn test_tiny_width_still_hittable() {
        let viewport = ItemViewport::new(100, 100);
        let point = KeyPoint::new(50.0, 50.0, 0.0);
        assert!(point.contains(Coord::new(50.5, 50.0), &viewport));
    }

    #[test]
    fn test_bounding_box_centered() {
        let viewport = ItemViewport::new(100, 100);
        let point = KeyPoint::new(50.0, 50.0, 10.0);
        let bbox = point.bounding_box(&viewport);
        assert!((bbox.left() - 45.0).abs() < 1e-9);
        assert!((bbox.right() - 55.0).abs() < 1e-9);
    }
}
