//! Layout math for the scroll region.
//!
//! This module handles:
//! - Snapping scroll offsets to row boundaries
//! - Computing the materialized row window from a scroll position
//! - Computing min/max heights of the scroll region and body padding
//! - Holding per-view scroll/height/window state

mod geometry;
mod viewport;

pub use geometry::{
    clamp_value, round_to, Geometry, HeightBounds, Measurements, RowRange,
};
pub(crate) use geometry::to_row;
pub use viewport::ViewportState;
