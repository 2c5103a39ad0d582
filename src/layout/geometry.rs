//! Row window and height arithmetic.
//!
//! Everything here is pure: the inputs are measurements taken from mounted
//! markup plus the dataset metadata, the outputs are row ranges and pixel
//! bounds. Scroll offsets are always snapped to row boundaries so a computed
//! window starts exactly on a rendered row.

use crate::types::DatasetMetadata;

/// Round `value` to the nearest multiple of `multiple`.
///
/// Non-positive or non-finite multiples leave the value untouched (this is the
/// "no rows measured yet" case).
pub fn round_to(value: f64, multiple: f64) -> f64 {
    if !multiple.is_finite() || multiple <= 0.0 {
        return value;
    }
    multiple * (value / multiple).round()
}

/// Clamp `value` into `[min, max]`.
pub fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Convert a fractional row count to a row index clamped into `[0, max]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_row(value: f64, max: u32) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(max) {
        max
    } else {
        value as u32
    }
}

/// Half-open row window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    /// The empty window at row 0.
    pub const EMPTY: RowRange = RowRange { start: 0, end: 0 };

    /// Create a range; swapped bounds are normalized.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Number of rows in the window.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// True if the window holds no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely inside this window.
    pub fn contains(&self, other: &RowRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// Minimum and maximum heights of the scroll region, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightBounds {
    pub min: f64,
    pub max: f64,
}

/// Raw pixel measurements read from a surface after markup is attached.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurements {
    /// Outer height of the first body row.
    pub row_height: f64,
    /// Outer height of the table header.
    pub header_height: f64,
    /// Outer height of the whole table element.
    pub table_outer_height: f64,
    /// Height taken by a horizontal scrollbar (offset minus client height).
    pub scrollbar_height: f64,
    /// Current rendered height of the scroll region.
    pub view_height: f64,
    /// Physical display height, the upper bound for one screen of rows.
    pub screen_height: f64,
}

/// Geometry calculator bound to one set of measurements and one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub row_height: f64,
    pub header_height: f64,
    pub screen_height: f64,
    pub total_rows: u32,
    pub min_rows: u32,
    pub max_rows: u32,
}

impl Geometry {
    /// Build a calculator from surface measurements and provider metadata.
    pub fn new(measurements: &Measurements, metadata: &DatasetMetadata) -> Self {
        Self {
            row_height: measurements.row_height,
            header_height: measurements.header_height,
            screen_height: measurements.screen_height,
            total_rows: metadata.total_rows,
            min_rows: metadata.min_rows,
            max_rows: metadata.max_rows,
        }
    }

    /// Lazy loading is active when a row cap exists and the dataset exceeds it.
    pub fn is_lazy(&self) -> bool {
        self.max_rows != 0 && self.total_rows > self.max_rows
    }

    /// Rows that fit in one physical screen.
    ///
    /// Falls back to `min_rows` while the screen height is unknown.
    pub fn window_rows(&self) -> f64 {
        if self.row_height <= 0.0 {
            return 0.0;
        }
        if self.screen_height > 0.0 {
            (self.screen_height / self.row_height).round()
        } else {
            f64::from(self.min_rows)
        }
    }

    /// Row window around `scroll_top`, extended by `margin_scale` screens on
    /// each side.
    pub fn compute_range(&self, scroll_top: f64, margin_scale: f64) -> RowRange {
        if !self.is_lazy() {
            return RowRange::new(0, self.total_rows);
        }
        if self.row_height <= 0.0 {
            return RowRange::EMPTY;
        }

        let margin_rows = (self.window_rows() * margin_scale).round();
        let scroll_row = f64::from(self.scroll_row(scroll_top));

        let start = to_row(scroll_row - margin_rows, self.total_rows);
        let end = to_row(scroll_row + margin_rows, self.total_rows);
        RowRange::new(start, end)
    }

    /// Row index under a (snapped or raw) scroll offset.
    pub fn scroll_row(&self, scroll_top: f64) -> u32 {
        if self.row_height <= 0.0 {
            return 0;
        }
        to_row((scroll_top / self.row_height).round(), self.total_rows)
    }

    /// Height bounds of the scroll region.
    ///
    /// Both bounds include `scrollbar_height` so a horizontal scrollbar never
    /// clips the last visible row.
    pub fn compute_heights(&self, table_outer_height: f64, scrollbar_height: f64) -> HeightBounds {
        let max = table_outer_height.max(0.0);
        let min = max.min(self.header_height + f64::from(self.min_rows) * self.row_height);
        let scrollbar = scrollbar_height.max(0.0);
        HeightBounds {
            min: min + scrollbar,
            max: max + scrollbar,
        }
    }

    /// Body padding that stands in for the rows outside `range`.
    pub fn padding(&self, range: &RowRange) -> (f64, f64) {
        let top = f64::from(range.start) * self.row_height;
        let bottom = f64::from(self.total_rows.saturating_sub(range.end)) * self.row_height;
        (top.max(0.0), bottom.max(0.0))
    }

    /// Whole rows visible in a region of `view_height` pixels.
    pub fn view_rows(&self, view_height: f64) -> u32 {
        if self.row_height <= 0.0 {
            return 0;
        }
        to_row(
            round_to(view_height, self.row_height) / self.row_height,
            u32::MAX,
        )
    }
}
