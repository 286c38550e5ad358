//! Region entities: the drawable shapes and spans of an annotation.
//!
//! A [`Region`] pairs identity and annotation state (selection, labels,
//! owning item) with one geometry variant. Geometry is stored in the
//! normalized 0–100 domain and re-projected through an
//! [`ItemViewport`](crate::geom::ItemViewport) whenever canvas pixels are
//! involved, so zooming or resizing the canvas never rewrites a region.
//!
//! # Design Principles
//!
//! 1. **Closed variant set**: region behavior is dispatched over a tagged
//!    union rather than trait objects, so every operation handles every
//!    variant or explicitly opts out.
//!
//! 2. **Permissive geometry**: degenerate shapes (zero-size rectangles,
//!    open polygons) are representable; validation reports them and the
//!    serializer skips them rather than panicking mid-gesture.

mod brush;
mod ellipse;
mod keypoint;
mod polygon;
mod rect;
mod span;

pub use brush::{Brush, Compose, MaskBitmap, MaskData, RleMask, Stroke};
pub use ellipse::Ellipse;
pub use keypoint::KeyPoint;
pub use polygon::{Polygon, MIN_POLYGON_POINTS};
pub use rect::Rect;
pub use span::TextSpan;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{BBox, Canvas, Coord, ItemViewport, Norm, NORM_EXTENT};
use crate::registry::ControlKind;

/// A unique identifier for a region within one annotation tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

impl RegionId {
    /// Creates a new RegionId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionId({})", self.0)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of geometry a region carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Rect,
    Ellipse,
    Polygon,
    Brush,
    KeyPoint,
    TextSpan,
}

impl RegionKind {
    /// The wire type emitted for a bare (unlabeled) geometry result.
    pub fn bare_type(&self) -> &'static str {
        match self {
            Self::Rect => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::Brush => "brush",
            Self::KeyPoint => "keypoint",
            Self::TextSpan => "textspan",
        }
    }

    /// Parses a bare geometry wire type.
    pub fn from_bare_type(tag: &str) -> Option<Self> {
        match tag {
            "rectangle" => Some(Self::Rect),
            "ellipse" => Some(Self::Ellipse),
            "polygon" => Some(Self::Polygon),
            "brush" => Some(Self::Brush),
            "keypoint" => Some(Self::KeyPoint),
            "textspan" => Some(Self::TextSpan),
            _ => None,
        }
    }
}

/// Which coordinate domain a region's stored geometry is in.
///
/// New regions are always normalized; pixel mode exists only for legacy
/// imports and is migrated away on the first re-projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordMode {
    #[default]
    Normalized,
    Pixel,
}

/// One classification attached to a region by a control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelState {
    /// Name of the control that produced this label state.
    pub from_name: String,
    /// The kind of control (shape labels, text labels, or choices).
    pub kind: ControlKind,
    /// Selected label or choice values, in selection order.
    pub values: Vec<String>,
}

impl LabelState {
    /// Creates a label state.
    pub fn new(
        from_name: impl Into<String>,
        kind: ControlKind,
        values: Vec<String>,
    ) -> Self {
        Self {
            from_name: from_name.into(),
            kind,
            values,
        }
    }
}

/// The geometry variants a region can carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Ellipse(Ellipse),
    Polygon(Polygon),
    Brush(Brush),
    KeyPoint(KeyPoint),
    TextSpan(TextSpan),
}

impl Shape {
    /// The kind tag of this variant.
    pub fn kind(&self) -> RegionKind {
        match self {
            Self::Rect(_) => RegionKind::Rect,
            Self::Ellipse(_) => RegionKind::Ellipse,
            Self::Polygon(_) => RegionKind::Polygon,
            Self::Brush(_) => RegionKind::Brush,
            Self::KeyPoint(_) => RegionKind::KeyPoint,
            Self::TextSpan(_) => RegionKind::TextSpan,
        }
    }
}

/// One drawn shape or span attached to an item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Identifier within the owning tree.
    pub id: RegionId,
    /// Stable identifier used to correlate wire results.
    pub result_id: String,
    /// The geometry variant.
    pub shape: Shape,
    /// Rotation in degrees, normalized to [0, 360).
    pub rotation: f64,
    /// Whether the region is currently selected.
    pub selected: bool,
    /// Whether the region is currently highlighted.
    pub highlighted: bool,
    /// Label states attached by controls, in attachment order.
    pub labels: Vec<LabelState>,
    /// Index of the owning item for multi-item objects.
    pub item_index: usize,
    /// Which domain the stored geometry is in.
    pub coord_mode: CoordMode,
}

impl Region {
    /// Creates a committed region with normalized geometry.
    pub fn new(id: RegionId, result_id: impl Into<String>, shape: Shape) -> Self {
        Self {
            id,
            result_id: result_id.into(),
            shape,
            rotation: 0.0,
            selected: false,
            highlighted: false,
            labels: Vec::new(),
            item_index: 0,
            coord_mode: CoordMode::Normalized,
        }
    }

    /// The kind of geometry this region carries.
    pub fn kind(&self) -> RegionKind {
        self.shape.kind()
    }

    /// Sets the rotation, normalized into [0, 360).
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees.rem_euclid(360.0);
    }

    /// Rotates by a delta, normalized into [0, 360).
    pub fn rotate_by(&mut self, degrees: f64) {
        self.set_rotation(self.rotation + degrees);
    }

    /// Attaches a label state.
    pub fn add_label(&mut self, label: LabelState) {
        self.labels.push(label);
    }

    /// Incremental drawing: update geometry from the drag cursor plus the
    /// points clicked so far, all in canvas space.
    ///
    /// Rectangles and ellipses rebuild from their anchor points (two-point
    /// axis-aligned, or three-point rotated); brushes extend the current
    /// stroke; key points follow the cursor. Polygon vertices and text
    /// spans are edited through their own operations instead.
    pub fn draw(
        &mut self,
        cursor: Coord<Canvas>,
        prior: &[Coord<Canvas>],
        viewport: &ItemViewport,
    ) {
        match &mut self.shape {
            Shape::Rect(rect) => match prior {
                [] => {}
                [anchor] => {
                    *rect =
                        Rect::from_two_points(viewport.to_norm(*anchor), viewport.to_norm(cursor));
                    self.rotation = 0.0;
                }
                [anchor, edge, ..] => {
                    let (drawn, rotation) =
                        Rect::from_three_points(*anchor, *edge, cursor, viewport);
                    *rect = drawn;
                    self.rotation = rotation;
                }
            },
            Shape::Ellipse(ellipse) => match prior {
                [] => {}
                [center] => {
                    *ellipse = Ellipse::from_two_points(
                        viewport.to_norm(*center),
                        viewport.to_norm(cursor),
                    );
                    self.rotation = 0.0;
                }
                [center, edge, ..] => {
                    let (drawn, rotation) =
                        Ellipse::from_three_points(*center, *edge, cursor, viewport);
                    *ellipse = drawn;
                    self.rotation = rotation;
                }
            },
            Shape::Brush(brush) => brush.extend_stroke(cursor, viewport),
            Shape::KeyPoint(point) => {
                let norm = viewport.to_norm(cursor);
                point.set_position(norm.x, norm.y);
            }
            Shape::Polygon(_) | Shape::TextSpan(_) => {}
        }
    }

    /// Bounding box in the normalized domain, or None for regions without
    /// 2-D geometry (text spans, empty polygons and masks).
    pub fn bounding_box(&self, viewport: &ItemViewport) -> Option<BBox<Norm>> {
        match &self.shape {
            Shape::Rect(rect) => Some(rect.bounding_box(self.rotation, viewport)),
            Shape::Ellipse(ellipse) => Some(ellipse.bounding_box(self.rotation, viewport)),
            Shape::Polygon(polygon) => polygon.bounding_box(),
            Shape::Brush(brush) => brush.bounding_box(),
            Shape::KeyPoint(point) => Some(point.bounding_box(viewport)),
            Shape::TextSpan(_) => None,
        }
    }

    /// Hit test against a canvas-space probe point.
    ///
    /// Text spans never match; they are hit through
    /// [`contains_offset`](Self::contains_offset).
    pub fn contains(&self, probe: Coord<Canvas>, viewport: &ItemViewport) -> bool {
        match &self.shape {
            Shape::Rect(rect) => rect.contains(probe, self.rotation, viewport),
            Shape::Ellipse(ellipse) => ellipse.contains(probe, self.rotation, viewport),
            Shape::Polygon(polygon) => polygon.contains(probe, viewport),
            Shape::Brush(brush) => brush.contains(probe, viewport),
            Shape::KeyPoint(point) => point.contains(probe, viewport),
            Shape::TextSpan(_) => false,
        }
    }

    /// Hit test against a character offset; false for 2-D regions.
    pub fn contains_offset(&self, offset: u64) -> bool {
        match &self.shape {
            Shape::TextSpan(span) => span.contains_offset(offset),
            _ => false,
        }
    }

    /// Re-projects stored geometry after the displayed item's pixel size
    /// changes.
    ///
    /// Normalized geometry is size-independent, so for ordinary regions
    /// this is a no-op and repeated calls cannot accumulate drift. A
    /// legacy pixel-mode region is migrated into the normalized domain
    /// exactly once, using the previous viewport, and the mode flips so
    /// the division can never run twice.
    pub fn update_item_size(&mut self, prev: &ItemViewport, _next: &ItemViewport) {
        if self.coord_mode == CoordMode::Normalized {
            return;
        }

        let sx = NORM_EXTENT / prev.width as f64;
        let sy = NORM_EXTENT / prev.height as f64;

        match &mut self.shape {
            Shape::Rect(rect) => {
                rect.x *= sx;
                rect.y *= sy;
                rect.width *= sx;
                rect.height *= sy;
            }
            Shape::Ellipse(ellipse) => {
                ellipse.x *= sx;
                ellipse.y *= sy;
                ellipse.radius_x *= sx;
                ellipse.radius_y *= sy;
            }
            Shape::Polygon(polygon) => {
                for point in &mut polygon.points {
                    point.x *= sx;
                    point.y *= sy;
                }
            }
            Shape::KeyPoint(point) => {
                point.x *= sx;
                point.y *= sy;
            }
            // Masks live on the item's intrinsic grid and spans have no
            // spatial coordinates; neither carries pixel-mode geometry.
            Shape::Brush(_) | Shape::TextSpan(_) => {}
        }

        self.coord_mode = CoordMode::Normalized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_region(x: f64, y: f64, w: f64, h: f64) -> Region {
        Region::new(
            RegionId::new(1),
            "r1",
            Shape::Rect(Rect::new(x, y, w, h)),
        )
    }

    #[test]
    fn test_rotation_normalized_into_range() {
        let mut region = rect_region(10.0, 10.0, 20.0, 10.0);
        region.set_rotation(-90.0);
        assert_eq!(region.rotation, 270.0);
        region.rotate_by(100.0);
        assert_eq!(region.rotation, 10.0);
    }

    #[test]
    fn test_draw_two_point_rect() {
        let viewport = ItemViewport::new(1000, 800);
        let mut region = rect_region(0.0, 0.0, 0.0, 0.0);
        region.draw(
            Coord::new(300.0, 250.0),
            &[Coord::new(100.0, 100.0)],
            &viewport,
        );

        let Shape::Rect(rect) = &region.shape else {
            panic!("still a rect");
        };
        assert!((rect.x - 10.0).abs() < 1e-9);
        assert!((rect.y - 12.5).abs() < 1e-9);
        assert!((rect.width - 20.0).abs() < 1e-9);
        assert!((rect.height - 18.75).abs() < 1e-9);
    }

    #[test]
    fn test_update_item_size_is_idempotent_for_normalized() {
        let before = ItemViewport::new(1000, 800);
        let after = ItemViewport::new(500, 400);

        let mut region = rect_region(10.0, 12.5, 20.0, 18.75);
        let original = region.clone();

        for _ in 0..5 {
            region.update_item_size(&before, &after);
        }
        assert_eq!(region, original);
    }

    #[test]
    fn test_update_item_size_migrates_pixel_mode_once() {
        let prev = ItemViewport::new(1000, 800);
        let next = ItemViewport::new(500, 400);

        let mut region = rect_region(100.0, 100.0, 200.0, 150.0);
        region.coord_mode = CoordMode::Pixel;

        region.update_item_size(&prev, &next);
        assert_eq!(region.coord_mode, CoordMode::Normalized);

        let Shape::Rect(rect) = &region.shape else {
            panic!("still a rect");
        };
        assert!((rect.x - 10.0).abs() < 1e-9);
        assert!((rect.y - 12.5).abs() < 1e-9);
        assert!((rect.width - 20.0).abs() < 1e-9);
        assert!((rect.height - 18.75).abs() < 1e-9);

        // A second call must not divide again.
        let snapshot = region.clone();
        region.update_item_size(&next, &prev);
        assert_eq!(region, snapshot);
    }

    #[test]
    fn test_span_region_never_matches_canvas_probe() {
        let viewport = ItemViewport::new(100, 100);
        let region = Region::new(
            RegionId::new(2),
            "r2",
            Shape::TextSpan(TextSpan::new(0, 10, "hello")),
        );
        assert!(!region.contains(Coord::new(50.0, 50.0), &viewport));
        assert!(region.contains_offset(5));
        assert!(region.bounding_box(&viewport).is_none());
    }
}
