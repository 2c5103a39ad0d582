//! Common test utilities for driving a headless table view.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use serde_json::Value;

use pdview::render::{HeadKind, HeadlessMetrics, HeadlessSurface, Surface};
use pdview::sync::{Host, MemoryHost};
use pdview::viewer::ElementInfo;
use pdview::{TableView, ViewerConfig};

pub use super::fixtures::*;

pub type View = TableView<HeadlessSurface, MemoryHost>;

/// Rows in the lazy dataset used by most scenarios.
pub const TOTAL_ROWS: u32 = 10_000;
/// Rows materialized by the first mount at scroll 0.
pub const FIRST_WINDOW: u32 = 160;

/// Unmounted view with default metrics (24px rows, 30px header, 960px screen).
#[must_use]
pub fn new_view() -> View {
    TableView::new(
        HeadlessSurface::new(HeadlessMetrics::default()),
        MemoryHost::new(),
        ViewerConfig::default(),
    )
}

/// View mounted on the first window of a 10000-row, 4-column dataset.
#[must_use]
pub fn lazy_view() -> View {
    let mut view = new_view();
    let response = ResponseBuilder::new(TableBuilder::new(4).rows(0..FIRST_WINDOW).build())
        .rows(TOTAL_ROWS, 500, 20)
        .build();
    view.receive(response).expect("initial mount");
    view
}

/// View mounted on a small dataset that fits without lazy loading.
#[must_use]
pub fn eager_view(rows: u32) -> View {
    let mut view = new_view();
    let response = ResponseBuilder::new(TableBuilder::new(4).rows(0..rows).grouped(2).build())
        .rows(rows, 500, 20)
        .build();
    view.receive(response).expect("initial mount");
    view
}

/// Answer for the window currently held by the view.
#[must_use]
pub fn window_response(view: &View, seq: u64) -> pdview::sync::SyncResponse {
    let range = view.controller().range();
    ResponseBuilder::new(TableBuilder::new(4).rows(range.start..range.end).build())
        .rows(TOTAL_ROWS, 500, 20)
        .seq(seq)
        .build()
}

/// Position of the header for logical column `id`.
#[must_use]
pub fn column_position<H: Host>(view: &TableView<HeadlessSurface, H>, id: u32) -> usize {
    view.surface()
        .index()
        .heads_of(HeadKind::Column)
        .find(|h| h.id == id)
        .map(|h| h.position)
        .expect("column header")
}

/// Position of the `n`th row header in document order.
#[must_use]
pub fn row_position(view: &View, n: usize) -> usize {
    view.surface()
        .index()
        .heads_of(HeadKind::Row)
        .nth(n)
        .map(|h| h.position)
        .expect("row header")
}

/// Click path on the label of column `id`, header left at natural width.
#[must_use]
pub fn column_label_path<H: Host>(view: &TableView<HeadlessSurface, H>, id: u32) -> Vec<ElementInfo> {
    vec![
        ElementInfo::new(&["pd-col-text"]),
        ElementInfo::head(column_position(view, id), &["pd-col-head"]).with_widths(80.0, 80.0),
        ElementInfo::new(&["pd-view"]),
    ]
}

/// Click path on the `n`th row header.
#[must_use]
pub fn row_head_path(view: &View, n: usize) -> Vec<ElementInfo> {
    vec![
        ElementInfo::head(row_position(view, n), &["pd-row-head"]),
        ElementInfo::new(&["pd-view"]),
    ]
}

/// `event` field of every commit so far.
#[must_use]
pub fn sent_events(view: &View) -> Vec<String> {
    view.host()
        .commits
        .iter()
        .filter_map(|c| c.get("event").and_then(Value::as_str).map(str::to_string))
        .collect()
}

/// Messages of every log record shipped over the host channel.
#[must_use]
pub fn log_messages(view: &View) -> Vec<String> {
    view.host()
        .messages
        .iter()
        .filter(|m| m["type"] == "log")
        .filter_map(|m| m["records"].as_array())
        .flatten()
        .filter_map(|r| r["message"].as_str().map(str::to_string))
        .collect()
}

/// Decoded `state_cols` of the last commit.
#[must_use]
pub fn last_state_cols(view: &View) -> Value {
    let text = view.host().last("state_cols").and_then(Value::as_str).expect("state_cols");
    serde_json::from_str(text).expect("state_cols json")
}
