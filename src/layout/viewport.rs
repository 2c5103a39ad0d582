//! Viewport state for one mounted view.

use super::{round_to, RowRange};

/// Scroll, height and row-window state of the scroll region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportState {
    /// Vertical scroll offset, always a multiple of the row height.
    pub scroll_top: f64,
    /// Horizontal scroll offset as reported by the surface.
    pub scroll_left: f64,
    /// Rendered height of the scroll region (0 = not yet established).
    pub view_height: f64,
    /// Row the materialized window is centered on.
    pub center_row: u32,
    /// First materialized row.
    pub start_row: u32,
    /// One past the last materialized row.
    pub end_row: u32,
    /// Cached outer height of one body row, valid for the current mount.
    pub row_height: f64,
    /// Cached outer height of the header, valid for the current mount.
    pub header_height: f64,
}

impl ViewportState {
    /// Create a zeroed viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero scroll, height and center; the cached measurements survive
    /// until the next mount replaces them.
    pub fn reset(&mut self) {
        self.scroll_top = 0.0;
        self.scroll_left = 0.0;
        self.view_height = 0.0;
        self.center_row = 0;
        self.start_row = 0;
        self.end_row = 0;
    }

    /// The materialized window.
    pub fn range(&self) -> RowRange {
        RowRange::new(self.start_row, self.end_row)
    }

    /// Store new scroll offsets, snapping the vertical one to a row boundary.
    pub fn set_scroll(&mut self, scroll_top: f64, scroll_left: f64) {
        self.scroll_top = round_to(scroll_top.max(0.0), self.row_height);
        self.scroll_left = scroll_left.max(0.0);
    }

    /// Store a new window and re-center inside it.
    ///
    /// `center` is clamped so `start_row <= center_row <= end_row` holds.
    pub fn set_range(&mut self, range: RowRange, center: u32) {
        self.start_row = range.start;
        self.end_row = range.end;
        self.center_row = center.clamp(range.start, range.end);
    }

    /// True if a row height has been measured for this mount.
    pub fn is_measured(&self) -> bool {
        self.row_height > 0.0
    }
}
