//! Conversions between canvas pixel space and the normalized domain.
//!
//! The normalized domain is fixed at 0–100 on each axis regardless of how
//! large the item is currently rendered. A value converts as
//! `norm = canvas / extent * 100` and back as `canvas = norm / 100 * extent`.

use super::coord::Coord;
use super::space::NORM_EXTENT;
use super::{Canvas, Norm};

/// The current pixel-space extent of a displayed item.
///
/// Holds the dimensions needed to project between canvas pixels and the
/// normalized domain, including the width/height ratio used to correct
/// rotation math over non-square canvases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemViewport {
    /// Current rendered width of the item in pixels.
    pub width: u32,
    /// Current rendered height of the item in pixels.
    pub height: u32,
}

impl ItemViewport {
    /// Creates a viewport for an item rendered at the given pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Converts a canvas x value to the normalized domain.
    #[inline]
    pub fn to_norm_x(&self, canvas: f64) -> f64 {
        canvas / self.width as f64 * NORM_EXTENT
    }

    /// Converts a canvas y value to the normalized domain.
    #[inline]
    pub fn to_norm_y(&self, canvas: f64) -> f64 {
        canvas / self.height as f64 * NORM_EXTENT
    }

    /// Converts a normalized x value to canvas pixels.
    #[inline]
    pub fn to_canvas_x(&self, norm: f64) -> f64 {
        norm / NORM_EXTENT * self.width as f64
    }

    /// Converts a normalized y value to canvas pixels.
    #[inline]
    pub fn to_canvas_y(&self, norm: f64) -> f64 {
        norm / NORM_EXTENT * self.height as f64
    }

    /// Converts a canvas point to the normalized domain.
    pub fn to_norm(&self, point: Coord<Canvas>) -> Coord<Norm> {
        Coord::new(self.to_norm_x(point.x), self.to_norm_y(point.y))
    }

    /// Converts a normalized point to canvas pixels.
    pub fn to_canvas(&self, point: Coord<Norm>) -> Coord<Canvas> {
        Coord::new(self.to_canvas_x(point.x), self.to_canvas_y(point.y))
    }

    /// Width divided by height of the rendered item.
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}
