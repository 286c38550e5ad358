//! Geometry primitives and coordinate-space transforms.
//!
//! This module defines the two coordinate spaces the engine works in —
//! the canvas pixel space of the currently rendered item and the fixed
//! 0–100 normalized domain all geometry is persisted in — plus the typed
//! points, derived bounding boxes, and rotation-aware envelope math
//! shared by every region variant.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: marker types prevent mixing canvas and normalized
//!    coordinates at compile time.
//!
//! 2. **Derived, never stored**: bounding boxes are pure functions of
//!    geometry plus rotation, recomputed on read.
//!
//! 3. **Aspect correction**: rotation math over normalized geometry always
//!    routes through canvas space, because the square normalized domain
//!    skews angles over a non-square canvas.

mod bbox;
mod coord;
mod space;
mod transform;

pub use bbox::{rotated_envelope, rotated_envelope_norm, BBox};
pub use coord::Coord;
pub use space::{Canvas, Norm, NORM_EXTENT};
pub use transform::ItemViewport;
