//! Plane geometry for toolpaths
//!
//! Points, bounding boxes and the arc resolver used for G2/G3 moves.

pub mod arc;
pub mod point;

pub use arc::{
    resolve_arc, tessellate, ArcDirection, ArcGeometry, ArcIssue, ArcResolver,
    DEFAULT_ARC_TOLERANCE,
};
pub use point::{Bounds, Point};
