//! Polygon region geometry.
//!
//! A polygon is an ordered list of normalized vertices. It starts open
//! while being drawn and may only be closed once it has at least three
//! points; a closed polygon can never drop below three points again.
//! These guards are silent no-ops rather than errors because they fire
//! during normal interactive drawing.

use serde::{Deserialize, Serialize};

use crate::geom::{BBox, Canvas, Coord, ItemViewport, Norm};

/// Minimum number of vertices a polygon needs before it can close.
pub const MIN_POLYGON_POINTS: usize = 3;

/// An ordered list of vertices, normalized 0–100.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices in drawing order.
    pub points: Vec<Coord<Norm>>,
    /// Whether the outline has been committed.
    pub closed: bool,
}

impl Polygon {
    /// Creates an open polygon with no vertices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a polygon from existing vertices.
    pub fn from_points(points: Vec<Coord<Norm>>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Appends a vertex to the outline.
    pub fn add_point(&mut self, point: Coord<Norm>) {
        self.points.push(point);
    }

    /// Inserts a vertex at `index`, clamped to the current length.
    pub fn insert_point(&mut self, index: usize, point: Coord<Norm>) {
        let index = index.min(self.points.len());
        self.points.insert(index, point);
    }

    /// Removes the vertex at `index`.
    ///
    /// Returns false without mutating when the index is out of range or
    /// when removal would take a closed polygon below three vertices.
    pub fn remove_point(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        if self.closed && self.points.len() <= MIN_POLYGON_POINTS {
            return false;
        }
        self.points.remove(index);
        true
    }

    /// Moves the vertex at `index`.
    pub fn move_point(&mut self, index: usize, point: Coord<Norm>) -> bool {
        match self.points.get_mut(index) {
            Some(existing) => {
                *existing = point;
                true
            }
            None => false,
        }
    }

    /// Commits the outline. A no-op below three vertices; returns whether
    /// the polygon is closed afterwards.
    pub fn close(&mut self) -> bool {
        if self.points.len() >= MIN_POLYGON_POINTS {
            self.closed = true;
        }
        self.closed
    }

    /// Bounding box of the vertices, or None while the outline is empty.
    pub fn bounding_box(&self) -> Option<BBox<Norm>> {
        let first = self.points.first()?;
        let mut bbox = BBox::new(*first, *first);
        for point in &self.points[1..] {
            bbox.min.x = bbox.min.x.min(point.x);
            bbox.min.y = bbox.min.y.min(point.y);
            bbox.max.x = bbox.max.x.max(point.x);
            bbox.max.y = bbox.max.y.max(point.y);
        }
        Some(bbox)
    }

    /// Hit test using the odd-even ray casting rule.
    ///
    /// Open or degenerate outlines contain nothing. The test runs in
    /// canvas space so it agrees with what the user sees.
    pub fn contains(&self, probe: Coord<Canvas>, viewport: &ItemViewport) -> bool {
        if !self.closed || self.points.len() < MIN_POLYGON_POINTS {
            return false;
        }

        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;

        for i in 0..n {
            let vi = viewport.to_canvas(self.points[i]);
            let vj = viewport.to_canvas(self.points[j]);

            if ((vi.y > probe.y) != (vj.y > probe.y))
                && (probe.x < (vj.x - vi.x) * (probe.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}
