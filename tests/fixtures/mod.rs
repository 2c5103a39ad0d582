//! Test fixtures for generating provider markup and responses in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::{ResponseBuilder, TableBuilder};
//!
//! let markup = TableBuilder::new(4).rows(0..160).build();
//! let response = ResponseBuilder::new(markup).rows(10_000, 500, 20).build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::fmt::Write as _;
use std::ops::Range;

use pdview::sync::SyncResponse;
use pdview::ViewerConfig;

// ============================================================================
// Table Builder
// ============================================================================

/// Builder for `table.pd-table` markup as the provider renders it.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    columns: Vec<u32>,
    rows: Vec<u32>,
    group_span: Option<u32>,
    filter_icons: bool,
    search: bool,
    stylesheet: bool,
}

impl TableBuilder {
    /// Table with logical columns `0..n_cols` in natural order.
    pub fn new(n_cols: u32) -> Self {
        Self {
            columns: (0..n_cols).collect(),
            rows: Vec::new(),
            group_span: None,
            filter_icons: false,
            search: false,
            stylesheet: false,
        }
    }

    /// Render columns in this order instead.
    pub fn columns(mut self, order: &[u32]) -> Self {
        self.columns = order.to_vec();
        self
    }

    /// Body rows carrying these logical row ids.
    pub fn rows(mut self, ids: Range<u32>) -> Self {
        self.rows = ids.collect();
        self
    }

    /// Add an outer row header spanning `span` rows at a time.
    pub fn grouped(mut self, span: u32) -> Self {
        self.group_span = Some(span.max(1));
        self
    }

    /// Add a filter icon to every column header.
    pub fn with_filters(mut self) -> Self {
        self.filter_icons = true;
        self
    }

    /// Add the search input above the table.
    pub fn with_search(mut self) -> Self {
        self.search = true;
        self
    }

    /// Carry ids in a leading `<style>` block keyed by `pd-col-N` /
    /// `pd-row-N` classes instead of inline, as a pandas `Styler` does.
    pub fn with_stylesheet(mut self) -> Self {
        self.stylesheet = true;
        self
    }

    /// Class and inline style of a header carrying logical `id`.
    fn head_attrs(&self, axis: &str, n: usize, id: u32) -> String {
        if self.stylesheet {
            format!(r#"class="pd-{axis}-head pd-{axis}-{n}""#)
        } else {
            format!(r#"class="pd-{axis}-head" style="--pd-df-iloc: {id}""#)
        }
    }

    pub fn build(&self) -> String {
        let mut html = String::new();
        if self.stylesheet {
            html.push_str(r#"<style type="text/css">"#);
            for (n, id) in self.columns.iter().enumerate() {
                let _ = write!(html, "\n#T_pd th.pd-col-{n} {{\n  --pd-df-iloc: {id};\n}}");
            }
            for (n, id) in self.rows.iter().enumerate() {
                let _ = write!(html, "\n#T_pd th.pd-row-{n} {{\n  --pd-df-iloc: {id};\n}}");
            }
            html.push_str("\n</style>");
        }
        if self.search {
            html.push_str(r#"<input class="pd-search" type="text"/>"#);
        }
        html.push_str(r#"<table class="pd-table"><thead><tr>"#);
        html.push_str(r#"<th class="blank">&nbsp;</th>"#);
        if self.group_span.is_some() {
            html.push_str(r#"<th class="blank">&nbsp;</th>"#);
        }
        for (n, &id) in self.columns.iter().enumerate() {
            let attrs = self.head_attrs("col", n, id);
            let filter = if self.filter_icons {
                r#"<span class="pd-col-i-filter"></span>"#
            } else {
                ""
            };
            let _ = write!(
                html,
                r#"<th {attrs}><span class="pd-col-text" draggable="true">c{id}</span>{filter}</th>"#
            );
        }
        html.push_str("</tr></thead><tbody>");
        for (n, &id) in self.rows.iter().enumerate() {
            let attrs = self.head_attrs("row", n, id);
            html.push_str("<tr>");
            if let Some(span) = self.group_span {
                let span = span as usize;
                if n % span == 0 {
                    let remaining = (self.rows.len() - n).min(span);
                    let _ = write!(html, r#"<th {attrs} rowspan="{remaining}">g{id}</th>"#);
                }
            }
            let _ = write!(html, r#"<th {attrs}>{id}</th>"#);
            for col in &self.columns {
                let _ = write!(html, "<td>{id}.{col}</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

// ============================================================================
// Response Builder
// ============================================================================

/// Builder for provider responses.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    response: SyncResponse,
}

impl ResponseBuilder {
    pub fn new(markup: impl Into<String>) -> Self {
        let mut response = SyncResponse {
            view: markup.into(),
            ..SyncResponse::default()
        };
        response.metadata.total_cols = 4;
        Self { response }
    }

    /// Answer to the request with this sequence number.
    pub fn seq(mut self, seq: u64) -> Self {
        self.response.seq = Some(seq);
        self
    }

    pub fn rows(mut self, total_rows: u32, max_rows: u32, min_rows: u32) -> Self {
        self.response.metadata.total_rows = total_rows;
        self.response.metadata.max_rows = max_rows;
        self.response.metadata.min_rows = min_rows;
        self
    }

    pub fn cols(mut self, total_cols: u32) -> Self {
        self.response.metadata.total_cols = total_cols;
        self
    }

    pub fn max_colwidth(mut self, chars: u32) -> Self {
        self.response.metadata.max_column_width = chars;
        self
    }

    pub fn reset(mut self) -> Self {
        self.response.reset = true;
        self
    }

    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.response.config = Some(config);
        self
    }

    pub fn state(mut self, cols: &str, rows: &str) -> Self {
        self.response.state_cols = Some(cols.to_string());
        self.response.state_rows = Some(rows.to_string());
        self
    }

    pub fn build(self) -> SyncResponse {
        self.response
    }
}
