//! Rectangle region geometry.
//!
//! A rectangle stores its unrotated footprint (top-left origin plus
//! extents) in the normalized domain; the owning region's rotation is
//! applied around the top-left origin. Interactive drawing supports both
//! the plain two-point diagonal and the three-point rotated form (anchor,
//! direction edge, perpendicular extent).

use serde::{Deserialize, Serialize};

use crate::geom::{rotated_envelope_norm, BBox, Canvas, Coord, ItemViewport, Norm};

/// Axis extents of a rectangle region before rotation, normalized 0–100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge of the unrotated footprint.
    pub x: f64,
    /// Top edge of the unrotated footprint.
    pub y: f64,
    /// Extent along the local x axis, as a percentage of item width.
    pub width: f64,
    /// Extent along the local y axis, as a percentage of item height.
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle from its unrotated footprint.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned rectangle spanning two opposite corners.
    ///
    /// Corner order does not matter; the footprint is normalized so that
    /// width and height are non-negative.
    pub fn from_two_points(a: Coord<Norm>, b: Coord<Norm>) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Rotated rectangle from the three-point drawing gesture.
    ///
    /// The first click anchors one corner, the second sets the direction
    /// edge (local x axis), and the drag cursor sets the perpendicular
    /// extent by projecting onto the edge normal. All math runs in canvas
    /// space because the rotation angle is only meaningful there.
    ///
    /// Returns the footprint plus the rotation in degrees. Falls back to
    /// the two-point form when anchor and edge coincide.
    pub fn from_three_points(
        anchor: Coord<Canvas>,
        edge: Coord<Canvas>,
        cursor: Coord<Canvas>,
        viewport: &ItemViewport,
    ) -> (Self, f64) {
        let ex = edge.x - anchor.x;
        let ey = edge.y - anchor.y;
        let width_px = (ex * ex + ey * ey).sqrt();

        if width_px < f64::EPSILON {
            let rect =
                Self::from_two_points(viewport.to_norm(anchor), viewport.to_norm(cursor));
            return (rect, 0.0);
        }

        let theta = ey.atan2(ex);
        let (ux, uy) = (ex / width_px, ey / width_px);
        // Unit normal of the direction edge.
        let (px, py) = (-uy, ux);

        let h = (cursor.x - edge.x) * px + (cursor.y - edge.y) * py;
        let height_px = h.abs();

        // A cursor on the far side of the edge flips the rectangle across
        // it; the origin moves so the footprint stays positive.
        let origin = if h >= 0.0 {
            anchor
        } else {
            Coord::new(anchor.x + px * h, anchor.y + py * h)
        };

        let rect = Self {
            x: viewport.to_norm_x(origin.x),
            y: viewport.to_norm_y(origin.y),
            width: viewport.to_norm_x(width_px),
            height: viewport.to_norm_y(height_px),
        };

        (rect, theta.to_degrees().rem_euclid(360.0))
    }

    /// Replaces the footprint, normalizing negative extents.
    pub fn set_position(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.x = if width < 0.0 { x + width } else { x };
        self.y = if height < 0.0 { y + height } else { y };
        self.width = width.abs();
        self.height = height.abs();
    }

    /// The unrotated footprint as a bounding box.
    pub fn footprint(&self) -> BBox<Norm> {
        BBox::from_ltrb(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Axis-aligned envelope of the rotated rectangle, in the normalized
    /// domain. Rotation pivots on the top-left origin.
    pub fn bounding_box(&self, rotation_deg: f64, viewport: &ItemViewport) -> BBox<Norm> {
        rotated_envelope_norm(
            self.footprint(),
            rotation_deg,
            Coord::new(self.x, self.y),
            viewport,
        )
    }

    /// Hit test: inverse-rotate the probe into the rectangle's local axes,
    /// then run the plain AABB check.
    pub fn contains(
        &self,
        probe: Coord<Canvas>,
        rotation_deg: f64,
        viewport: &ItemViewport,
    ) -> bool {
        let origin_x = viewport.to_canvas_x(self.x);
        let origin_y = viewport.to_canvas_y(self.y);
        let width_px = viewport.to_canvas_x(self.width);
        let height_px = viewport.to_canvas_y(self.height);

        let dx = probe.x - origin_x;
        let dy = probe.y - origin_y;

        let theta = -rotation_deg.to_radians();
        let lx = dx * theta.cos() - dy * theta.sin();
        let ly = dx * theta.sin() + dy * theta.cos();

        lx >= 0.0 && lx <= width_px && ly >= 0.0 && ly <= height_px
    }
}
