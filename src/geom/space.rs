//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between different coordinate systems at compile time.

use std::fmt;

/// Marker type for canvas coordinates (absolute pixel values).
///
/// Canvas coordinates are floats representing absolute positions within the
/// currently displayed item, where (0, 0) is the top-left corner and the
/// extent depends on the current zoom / window size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Canvas {}

/// Marker type for normalized coordinates (0.0 to 100.0).
///
/// Normalized coordinates represent positions as percentages of the item
/// dimensions, making them independent of the current pixel rendering size.
/// All persisted geometry is expressed in this domain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Norm {}

/// The extent of the normalized domain on each axis.
pub const NORM_EXTENT: f64 = 100.0;

impl fmt::Debug for Canvas {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Canvas has no variants
    }
}

impl fmt::Debug for Norm {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Norm has no variants
    }
}
