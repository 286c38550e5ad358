//! Ellipse region geometry.
//!
//! An ellipse stores its center and radii in the normalized domain; the
//! owning region's rotation is applied around the center.

use serde::{Deserialize, Serialize};

use crate::geom::{rotated_envelope_norm, BBox, Canvas, Coord, ItemViewport, Norm};

/// Center and radii of an ellipse region, normalized 0–100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    /// Center x, as a percentage of item width.
    pub x: f64,
    /// Center y, as a percentage of item height.
    pub y: f64,
    /// Radius along the local x axis, as a percentage of item width.
    pub radius_x: f64,
    /// Radius along the local y axis, as a percentage of item height.
    pub radius_y: f64,
}

impl Ellipse {
    /// Creates an ellipse from center and radii.
    pub fn new(x: f64, y: f64, radius_x: f64, radius_y: f64) -> Self {
        Self {
            x,
            y,
            radius_x,
            radius_y,
        }
    }

    /// Ellipse from the two-point drawing gesture: the first click is the
    /// center, the drag cursor sets both radii.
    pub fn from_two_points(center: Coord<Norm>, cursor: Coord<Norm>) -> Self {
        Self {
            x: center.x,
            y: center.y,
            radius_x: (cursor.x - center.x).abs(),
            radius_y: (cursor.y - center.y).abs(),
        }
    }

    /// Rotated ellipse from the three-point drawing gesture.
    ///
    /// The first click anchors the center, the second sets the local x
    /// axis (direction plus radius), and the drag cursor sets the
    /// perpendicular radius by projection. Math runs in canvas space for
    /// the same aspect reason as the rectangle.
    pub fn from_three_points(
        center: Coord<Canvas>,
        edge: Coord<Canvas>,
        cursor: Coord<Canvas>,
        viewport: &ItemViewport,
    ) -> (Self, f64) {
        let ex = edge.x - center.x;
        let ey = edge.y - center.y;
        let radius_x_px = (ex * ex + ey * ey).sqrt();

        if radius_x_px < f64::EPSILON {
            let ellipse =
                Self::from_two_points(viewport.to_norm(center), viewport.to_norm(cursor));
            return (ellipse, 0.0);
        }

        let theta = ey.atan2(ex);
        let (px, py) = (-ey / radius_x_px, ex / radius_x_px);
        let radius_y_px =
            ((cursor.x - center.x) * px + (cursor.y - center.y) * py).abs();

        let ellipse = Self {
            x: viewport.to_norm_x(center.x),
            y: viewport.to_norm_y(center.y),
            radius_x: viewport.to_norm_x(radius_x_px),
            radius_y: viewport.to_norm_y(radius_y_px),
        };

        (ellipse, theta.to_degrees().rem_euclid(360.0))
    }

    /// Replaces center and radii, normalizing negative radii.
    pub fn set_position(&mut self, x: f64, y: f64, radius_x: f64, radius_y: f64) {
        self.x = x;
        self.y = y;
        self.radius_x = radius_x.abs();
        self.radius_y = radius_y.abs();
    }

    /// The unrotated extent as a bounding box.
    pub fn footprint(&self) -> BBox<Norm> {
        BBox::from_ltrb(
            self.x - self.radius_x,
            self.y - self.radius_y,
            self.x + self.radius_x,
            self.y + self.radius_y,
        )
    }

    /// Axis-aligned envelope of the rotated ellipse, in the normalized
    /// domain. Rotation pivots on the center.
    ///
    /// The envelope of the rotated extent box encloses the rotated
    /// ellipse; the looser box keeps the math shared with the rectangle.
    pub fn bounding_box(&self, rotation_deg: f64, viewport: &ItemViewport) -> BBox<Norm> {
        rotated_envelope_norm(
            self.footprint(),
            rotation_deg,
            Coord::new(self.x, self.y),
            viewport,
        )
    }

    /// Hit test via the rotated-ellipse implicit equation: inverse-rotate
    /// the probe around the center, then check
    /// `(dx/rx)^2 + (dy/ry)^2 <= 1` in canvas space.
    pub fn contains(
        &self,
        probe: Coord<Canvas>,
        rotation_deg: f64,
        viewport: &ItemViewport,
    ) -> bool {
        let rx = viewport.to_canvas_x(self.radius_x);
        let ry = viewport.to_canvas_y(self.radius_y);
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }

        let dx = probe.x - viewport.to_canvas_x(self.x);
        let dy = probe.y - viewport.to_canvas_y(self.y);

        let theta = -rotation_deg.to_radians();
        let lx = dx * theta.cos() - dy * theta.sin();
        let ly = dx * theta.sin() + dy * theta.cos();

        (lx / rx).powi(2) + (ly / ry).powi(2) <= 1.0
    }
}
