//! Viewport controller.
//!
//! Owns the [`ViewportState`] of one view and decides when the materialized
//! row window has to be replaced. It is a small state machine:
//!
//! ```text
//! Initializing --mount--> Idle --scroll past edge--> RangeDirty --mount--> Idle
//!                          \--resize--> Resizing --mount--> Idle
//! ```
//!
//! The controller never talks to the provider. It hands back a
//! [`RangeRequest`] and the caller pushes it through the sync gateway.

use crate::config::ViewerConfig;
use crate::layout::{clamp_value, Geometry, HeightBounds, Measurements, RowRange, ViewportState};
use crate::render::ViewModel;
use crate::sync::EventKind;
use crate::types::DatasetMetadata;

/// Height changes smaller than this are measurement noise.
const RESIZE_TOLERANCE_PX: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing measured yet, or a reset is being remounted.
    Initializing,
    /// The materialized window covers the viewport.
    Idle,
    /// A new window was requested and has not been mounted yet.
    RangeDirty,
    /// The scroll region was resized and a sync is outstanding.
    Resizing,
}

/// New window to request from the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRequest {
    pub range: RowRange,
    pub scroll_top: f64,
    pub view_height: f64,
    pub event: EventKind,
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    phase: Phase,
    viewport: ViewportState,
    geometry: Geometry,
    metadata: DatasetMetadata,
    bounds: HeightBounds,
    full_height: f64,
    scrollbar_height: f64,
    range_margin: f64,
    edge_margin: f64,
    pending: Option<RangeRequest>,
}

impl ViewportController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            phase: Phase::Initializing,
            viewport: ViewportState::new(),
            geometry: Geometry::default(),
            metadata: DatasetMetadata::default(),
            bounds: HeightBounds::default(),
            full_height: 0.0,
            scrollbar_height: 0.0,
            range_margin: config.range_margin,
            edge_margin: config.edge_margin,
            pending: None,
        }
    }

    pub fn configure(&mut self, config: &ViewerConfig) {
        self.range_margin = config.range_margin;
        self.edge_margin = config.edge_margin;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn bounds(&self) -> HeightBounds {
        self.bounds
    }

    /// The request issued since the last mount, if any.
    pub fn pending(&self) -> Option<&RangeRequest> {
        self.pending.as_ref()
    }

    /// Window to report in syncs that are not range changes.
    pub fn range(&self) -> RowRange {
        self.viewport.range()
    }

    /// Take measurements of freshly mounted markup.
    ///
    /// The first mount (and the one after a reset) centers the window on the
    /// current scroll offset. Later mounts keep the stored center row, so the
    /// window is the one the answered request asked for even if the user kept
    /// scrolling inside it meanwhile.
    ///
    /// The view height is established from the bounds on first mount
    /// (minimum when lazy, maximum otherwise) and afterwards kept, clamped
    /// into the new bounds.
    pub fn mount(&mut self, measurements: &Measurements, metadata: &DatasetMetadata) {
        self.viewport.row_height = measurements.row_height;
        self.viewport.header_height = measurements.header_height;
        self.metadata = metadata.clone();
        self.geometry = Geometry::new(measurements, metadata);

        self.viewport
            .set_scroll(self.viewport.scroll_top, self.viewport.scroll_left);
        let anchor = if self.phase == Phase::Initializing {
            self.viewport.scroll_top
        } else {
            f64::from(self.viewport.center_row) * measurements.row_height
        };
        let range = self.geometry.compute_range(anchor, self.range_margin);
        let center = self.geometry.scroll_row(anchor);
        self.viewport.set_range(range, center);

        let (top, bottom) = self.geometry.padding(&range);
        self.full_height = if self.geometry.is_lazy() {
            measurements.table_outer_height + top + bottom
        } else {
            measurements.table_outer_height
        };
        self.scrollbar_height = measurements.scrollbar_height;
        self.bounds = self
            .geometry
            .compute_heights(self.full_height, self.scrollbar_height);

        self.viewport.view_height = if self.viewport.view_height <= 0.0 {
            if self.geometry.is_lazy() {
                self.bounds.min
            } else {
                self.bounds.max
            }
        } else {
            clamp_value(self.viewport.view_height, self.bounds.min, self.bounds.max)
        };

        self.pending = None;
        self.phase = Phase::Idle;
        tracing::debug!(
            start = range.start,
            end = range.end,
            lazy = self.geometry.is_lazy(),
            view_height = self.viewport.view_height,
            "mounted"
        );
    }

    /// Record a settled scroll position.
    ///
    /// Returns a request when the narrow window around the new position is
    /// no longer covered by the materialized one. The new wide window is
    /// stored immediately, so further scrolling inside it coalesces into the
    /// same request.
    pub fn on_scroll(&mut self, scroll_top: f64, scroll_left: f64) -> Option<RangeRequest> {
        self.viewport.set_scroll(scroll_top, scroll_left);
        if self.phase == Phase::Initializing || !self.geometry.is_lazy() {
            return None;
        }

        let narrow = self
            .geometry
            .compute_range(self.viewport.scroll_top, self.edge_margin);
        if self.viewport.range().contains(&narrow) {
            return None;
        }

        let range = self
            .geometry
            .compute_range(self.viewport.scroll_top, self.range_margin);
        let center = self.geometry.scroll_row(self.viewport.scroll_top);
        self.viewport.set_range(range, center);
        self.phase = Phase::RangeDirty;
        tracing::debug!(
            scroll_top = self.viewport.scroll_top,
            start = range.start,
            end = range.end,
            "window left, requesting range"
        );
        Some(self.issue(EventKind::Scroll))
    }

    /// React to a new measured height of the scroll region.
    ///
    /// A height equal to the stored one is a no-op. Otherwise the height
    /// bounds are re-derived from the heights cached at mount and the new
    /// height is clamped into them.
    pub fn on_resize(&mut self, view_height: f64) -> Option<RangeRequest> {
        if self.phase == Phase::Initializing
            || (view_height - self.viewport.view_height).abs() < RESIZE_TOLERANCE_PX
        {
            return None;
        }
        self.bounds = self
            .geometry
            .compute_heights(self.full_height, self.scrollbar_height);
        self.viewport.view_height = clamp_value(view_height, self.bounds.min, self.bounds.max);
        let range = self
            .geometry
            .compute_range(self.viewport.scroll_top, self.range_margin);
        let center = self.geometry.scroll_row(self.viewport.scroll_top);
        self.viewport.set_range(range, center);
        self.phase = Phase::Resizing;
        tracing::debug!(view_height, "view resized");
        Some(self.issue(EventKind::Resize))
    }

    /// Zero scroll, height and center and recompute the window from the
    /// top of the dataset.
    pub fn reset(&mut self) -> RangeRequest {
        self.viewport.reset();
        let range = self.geometry.compute_range(0.0, self.range_margin);
        self.viewport.set_range(range, 0);
        self.phase = Phase::Initializing;
        tracing::debug!(start = range.start, end = range.end, "viewport reset");
        self.issue(EventKind::Reset)
    }

    /// Snapshot for the renderer.
    pub fn view_model(&self) -> ViewModel {
        let range = self.viewport.range();
        let (padding_top, padding_bottom) = self.geometry.padding(&range);
        ViewModel {
            range,
            padding_top,
            padding_bottom,
            heights: self.bounds,
            view_height: self.viewport.view_height,
            scroll_top: self.viewport.scroll_top,
            scroll_left: self.viewport.scroll_left,
            footer: self.metadata.shape_text(),
            max_column_width: self.metadata.max_column_width,
        }
    }

    fn issue(&mut self, event: EventKind) -> RangeRequest {
        let request = RangeRequest {
            range: self.viewport.range(),
            scroll_top: self.viewport.scroll_top,
            view_height: self.viewport.view_height,
            event,
        };
        self.pending = Some(request);
        request
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn metadata(total_rows: u32) -> DatasetMetadata {
        DatasetMetadata {
            total_rows,
            total_cols: 4,
            min_rows: 20,
            max_rows: 500,
            ..DatasetMetadata::default()
        }
    }

    fn measurements(body_rows: u32) -> Measurements {
        Measurements {
            row_height: 24.0,
            header_height: 30.0,
            table_outer_height: 30.0 + f64::from(body_rows) * 24.0,
            scrollbar_height: 0.0,
            view_height: 0.0,
            screen_height: 960.0,
        }
    }

    fn mounted() -> ViewportController {
        let mut controller = ViewportController::new(&ViewerConfig::default());
        controller.mount(&measurements(160), &metadata(10_000));
        controller
    }

    #[test]
    fn test_first_mount_lazy_uses_min_height() {
        let controller = mounted();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.range(), RowRange::new(0, 160));
        assert_eq!(controller.viewport().view_height, 30.0 + 20.0 * 24.0);
        assert_eq!(controller.bounds().max, 30.0 + 10_000.0 * 24.0);
    }

    #[test]
    fn test_first_mount_eager_uses_max_height() {
        let mut controller = ViewportController::new(&ViewerConfig::default());
        controller.mount(&measurements(12), &metadata(12));
        assert_eq!(controller.range(), RowRange::new(0, 12));
        assert_eq!(controller.viewport().view_height, 30.0 + 12.0 * 24.0);
    }

    #[test]
    fn test_scroll_inside_window_is_quiet() {
        let mut controller = mounted();
        // narrow window at row 100 is [60, 140)
        assert_eq!(controller.on_scroll(2400.0, 0.0), None);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn test_scroll_past_edge_requests_wide_window() {
        let mut controller = mounted();
        let request = controller.on_scroll(4800.0, 0.0).unwrap();
        assert_eq!(request.range, RowRange::new(40, 360));
        assert_eq!(request.event, EventKind::Scroll);
        assert_eq!(controller.phase(), Phase::RangeDirty);
        assert_eq!(controller.viewport().center_row, 200);

        // further scrolling inside the requested window coalesces
        assert_eq!(controller.on_scroll(5280.0, 0.0), None);
        assert_eq!(controller.pending(), Some(&request));
    }

    #[test]
    fn test_eager_data_never_requests() {
        let mut controller = ViewportController::new(&ViewerConfig::default());
        controller.mount(&measurements(400), &metadata(400));
        assert_eq!(controller.on_scroll(9000.0, 0.0), None);
    }

    #[test]
    fn test_resize_same_height_is_noop() {
        let mut controller = mounted();
        let height = controller.viewport().view_height;
        assert_eq!(controller.on_resize(height), None);
        let request = controller.on_resize(height + 100.0).unwrap();
        assert_eq!(request.event, EventKind::Resize);
        assert_eq!(controller.phase(), Phase::Resizing);
    }

    #[test]
    fn test_remount_places_requested_window() {
        let mut controller = mounted();
        let request = controller.on_scroll(4800.0, 0.0).unwrap();
        // still inside [40, 360) when the answer lands
        assert_eq!(controller.on_scroll(5280.0, 0.0), None);

        controller.mount(&measurements(320), &metadata(10_000));
        assert_eq!(controller.range(), request.range);
        assert_eq!(controller.viewport().center_row, 200);
        assert_eq!(controller.viewport().scroll_top, 5280.0);
        assert_eq!(controller.view_model().padding_top, 40.0 * 24.0);
    }

    #[test]
    fn test_resize_rederives_bounds_and_clamps() {
        let mut controller = mounted();
        let bounds = controller.bounds();
        controller.on_resize(bounds.max + 1_000.0).unwrap();
        assert_eq!(controller.bounds(), bounds);
        assert_eq!(controller.viewport().view_height, bounds.max);
        controller.on_resize(100.0).unwrap();
        assert_eq!(controller.viewport().view_height, bounds.min);
    }

    #[test]
    fn test_remount_keeps_height_within_bounds() {
        let mut controller = mounted();
        controller.on_resize(700.0);
        controller.mount(&measurements(160), &metadata(10_000));
        assert_eq!(controller.viewport().view_height, 700.0);

        // dataset shrank below the kept height
        controller.mount(&measurements(5), &metadata(5));
        assert_eq!(controller.viewport().view_height, 30.0 + 5.0 * 24.0);
    }

    #[test]
    fn test_reset_zeroes_viewport() {
        let mut controller = mounted();
        controller.on_scroll(4800.0, 12.0);
        let request = controller.reset();
        assert_eq!(request.range, RowRange::new(0, 160));
        assert_eq!(request.event, EventKind::Reset);
        assert_eq!(controller.viewport().scroll_top, 0.0);
        assert_eq!(controller.viewport().scroll_left, 0.0);
        assert_eq!(controller.phase(), Phase::Initializing);
    }

    #[test]
    fn test_view_model_padding_and_footer() {
        let mut controller = mounted();
        controller.on_scroll(4800.0, 0.0);
        let model = controller.view_model();
        assert_eq!(model.padding_top, 40.0 * 24.0);
        assert_eq!(model.padding_bottom, (10_000.0 - 360.0) * 24.0);
        assert_eq!(model.footer, "10000 rows × 4 columns");
    }
}
