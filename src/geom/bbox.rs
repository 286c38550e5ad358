//! Bounding box types in left/top/right/bottom form.
//!
//! Bounding boxes are derived values: they are computed on demand from a
//! region's geometry plus rotation and are never stored or persisted.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::transform::ItemViewport;
use super::{Canvas, Norm};

/// An axis-aligned bounding box (left, top, right, bottom).
///
/// The `TSpace` parameter should be either [`Canvas`](super::Canvas) or
/// [`Norm`](super::Norm), ensuring type safety across coordinate spaces.
///
/// Note: This type does NOT enforce that left < right in the constructor,
/// allowing "malformed" boxes to exist transiently. Validation reports
/// these rather than preventing them from being represented.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBox<TSpace> {
    /// Creates a new bounding box from min and max coordinates.
    #[inline]
    pub fn new(min: Coord<TSpace>, max: Coord<TSpace>) -> Self {
        Self { min, max }
    }

    /// Creates a new bounding box from explicit edge values.
    #[inline]
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            min: Coord::new(left, top),
            max: Coord::new(right, bottom),
        }
    }

    /// Returns the left edge.
    #[inline]
    pub fn left(&self) -> f64 {
        self.min.x
    }

    /// Returns the top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.min.y
    }

    /// Returns the right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.max.x
    }

    /// Returns the bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.max.y
    }

    /// Returns the width of the bounding box.
    ///
    /// May be negative if the box is malformed (right < left).
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the height of the bounding box.
    ///
    /// May be negative if the box is malformed (bottom < top).
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns the center of the bounding box.
    #[inline]
    pub fn center(&self) -> Coord<TSpace> {
        Coord::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns true if the box is properly ordered (min <= max for both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Returns the smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self::from_ltrb(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
        )
    }
}

impl<TSpace> std::fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBox")
            .field("left", &self.min.x)
            .field("top", &self.min.y)
            .field("right", &self.max.x)
            .field("bottom", &self.max.y)
            .finish()
    }
}

impl<TSpace> Default for BBox<TSpace> {
    fn default() -> Self {
        Self::from_ltrb(0.0, 0.0, 0.0, 0.0)
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for BBox<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BBox", 4)?;
        state.serialize_field("left", &self.min.x)?;
        state.serialize_field("top", &self.min.y)?;
        state.serialize_field("right", &self.max.x)?;
        state.serialize_field("bottom", &self.max.y)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for BBox<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct BBoxData {
            left: f64,
            top: f64,
            right: f64,
            bottom: f64,
        }
        let data = BBoxData::deserialize(deserializer)?;
        Ok(BBox::from_ltrb(data.left, data.top, data.right, data.bottom))
    }
}

/// Rotates the four corners of `bbox` by `rotation_deg` around `pivot` and
/// returns the axis-aligned envelope of the rotated corners.
///
/// Both the box and the pivot must be in the same (canvas) space; rotating
/// directly in the square normalized domain over a non-square canvas skews
/// the result, so normalized callers go through
/// [`rotated_envelope_norm`] instead.
pub fn rotated_envelope(bbox: BBox<Canvas>, rotation_deg: f64, pivot: Coord<Canvas>) -> BBox<Canvas> {
    if rotation_deg == 0.0 {
        return bbox;
    }

    let theta = rotation_deg * (PI / 180.0);
    let cos_t = theta.cos();
    let sin_t = theta.sin();

    let corners = [
        (bbox.left(), bbox.top()),
        (bbox.right(), bbox.top()),
        (bbox.right(), bbox.bottom()),
        (bbox.left(), bbox.bottom()),
    ];

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for (x, y) in corners {
        let dx = x - pivot.x;
        let dy = y - pivot.y;
        let rx = pivot.x + (dx * cos_t) - (dy * sin_t);
        let ry = pivot.y + (dx * sin_t) + (dy * cos_t);

        min_x = min_x.min(rx);
        min_y = min_y.min(ry);
        max_x = max_x.max(rx);
        max_y = max_y.max(ry);
    }

    BBox::from_ltrb(min_x, min_y, max_x, max_y)
}

/// Rotation-aware envelope for a box expressed in the normalized domain.
///
/// The normalized domain is square (0–100 on both axes) but the canvas it
/// maps to usually is not, and rotation angles are meaningful in canvas
/// space. The box is projected onto the canvas, rotated there, and the
/// envelope mapped back, which applies the mandatory width/height ratio
/// correction.
pub fn rotated_envelope_norm(
    bbox: BBox<Norm>,
    rotation_deg: f64,
    pivot: Coord<Norm>,
    viewport: &ItemViewport,
) -> BBox<Norm> {
    if rotation_deg == 0.0 {
        return bbox;
    }

    let canvas_box = BBox::<Canvas>::from_ltrb(
        viewport.to_canvas_x(bbox.left()),
        viewport.to_canvas_y(bbox.top()),
        viewport.to_canvas_x(bbox.right()),
        viewport.to_canvas_y(bbox.bottom()),
    );
    let canvas_pivot = Coord::<Canvas>::new(
        viewport.to_canvas_x(pivot.x),
        viewport.to_canvas_y(pivot.y),
    );

    let rotated = rotated_envelope(canvas_box, rotation_deg, canvas_pivot);

    BBox::from_ltrb(
        viewport.to_norm_x(rotated.left()),
        viewport.to_norm_y(rotated.top()),
        viewport.to_norm_x(rotated.right()),
        viewport.to_norm_y(rotated.bottom()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_ltrb() {
        let bbox: BBox<Canvas> = BBox::from_ltrb(10.0, 20.0, 100.0, 80.0);
        assert_eq!(bbox.left(), 10.0);
        assert_eq!(bbox.top(), 20.0);
        assert_eq!(bbox.right(), 100.0);
        assert_eq!(bbox.bottom(), 80.0);
        assert_eq!(bbox.width(), 90.0);
        assert_eq!(bbox.height(), 60.0);
    }

    #[test]
    fn test_bbox_ordering() {
        let ordered: BBox<Canvas> = BBox::from_ltrb(10.0, 20.0, 100.0, 80.0);
        assert!(ordered.is_ordered());

        let unordered: BBox<Canvas> = BBox::from_ltrb(100.0, 80.0, 10.0, 20.0);
        assert!(!unordered.is_ordered());
    }

    #[test]
    fn test_envelope_zero_rotation_is_identity() {
        let bbox: BBox<Canvas> = BBox::from_ltrb(10.0, 10.0, 30.0, 20.0);
        let out = rotated_envelope(bbox, 0.0, bbox.center());
        assert_eq!(out, bbox);
    }

    #[test]
    fn test_envelope_90_degrees_swaps_extents() {
        let bbox: BBox<Canvas> = BBox::from_ltrb(0.0, 0.0, 40.0, 20.0);
        let out = rotated_envelope(bbox, 90.0, bbox.center());

        assert!((out.width() - 20.0).abs() < 1e-9);
        assert!((out.height() - 40.0).abs() < 1e-9);
        // Center is preserved under rotation about the center.
        assert!((out.center().x - 20.0).abs() < 1e-9);
        assert!((out.center().y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_envelope_four_quarter_turns_is_identity() {
        let original: BBox<Canvas> = BBox::from_ltrb(10.0, 10.0, 30.0, 20.0);
        let pivot = original.center();

        let mut bbox = original;
        for _ in 0..4 {
            bbox = rotated_envelope(bbox, 90.0, pivot);
        }

        assert!((bbox.left() - original.left()).abs() < 1e-9);
        assert!((bbox.top() - original.top()).abs() < 1e-9);
        assert!((bbox.right() - original.right()).abs() < 1e-9);
        assert!((bbox.bottom() - original.bottom()).abs() < 1e-9);
    }

    #[test]
    fn test_norm_envelope_corrects_for_aspect() {
        // A square in the normalized domain over a 200x100 canvas is a
        // 2:1 rectangle on screen. Rotating 90 degrees must swap the
        // on-screen extents, which in normalized terms means the box does
        // NOT stay square.
        let viewport = ItemViewport::new(200, 100);
        let bbox: BBox<Norm> = BBox::from_ltrb(40.0, 40.0, 60.0, 60.0);
        let out = rotated_envelope_norm(bbox, 90.0, bbox.center(), &viewport);

        // On-canvas: 40x20 box becomes 20x40. Normalized: width 10, height 40.
        assert!((out.width() - 10.0).abs() < 1e-9);
        assert!((out.height() - 40.0).abs() < 1e-9);
    }
}
