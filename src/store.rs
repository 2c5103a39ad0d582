//! Interaction state store.
//!
//! Holds the sort/width/order overlay for columns, the selection overlay for
//! rows and the search query. Every mutation rewrites one whole mapping and
//! bumps a version counter; the sync layer serializes the mappings only at
//! the boundary.

use crate::error::Result;
use crate::types::{ColumnId, ColumnStates, RowId, RowStates, SelectState, SortDirection};

/// Versioned interaction overlay for one view.
#[derive(Debug, Clone, Default)]
pub struct InteractionStore {
    columns: ColumnStates,
    rows: RowStates,
    search_query: String,
    version: u64,
}

impl InteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &ColumnStates {
        &self.columns
    }

    pub fn rows(&self) -> &RowStates {
        &self.rows
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Monotonic counter bumped by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True while a non-empty search query is stored.
    pub fn is_searching(&self) -> bool {
        !self.search_query.is_empty()
    }

    /// Cycle the sort of `column` through `desc -> asc -> none`.
    ///
    /// Only the addressed column changes; sort entries of other columns are
    /// left as they are.
    pub fn toggle_sort(&mut self, column: ColumnId) -> &ColumnStates {
        let next = SortDirection::next(self.columns.get(column).sort);
        self.columns.update(column, |c| c.sort = next);
        self.bump();
        tracing::debug!(column, sort = next.map(SortDirection::as_str), "toggle sort");
        &self.columns
    }

    /// Flip the selection of a row group (`none <-> active`).
    ///
    /// The next state is decided by the first member so the whole group ends
    /// up in the same state. An empty group is a no-op.
    pub fn toggle_select(&mut self, group: &[RowId]) -> &RowStates {
        let Some(&first) = group.first() else {
            return &self.rows;
        };
        let next = SelectState::next(self.rows.get(first).select);
        for &row in group {
            self.rows.update(row, |r| r.select = next);
        }
        self.bump();
        tracing::debug!(
            rows = group.len(),
            first,
            select = next.map(SelectState::as_str),
            "toggle select"
        );
        &self.rows
    }

    /// Set a width override in pixels; 0 restores automatic width.
    pub fn set_width(&mut self, column: ColumnId, pixels: u32) -> &ColumnStates {
        let width = (pixels != 0).then_some(pixels);
        self.columns.update(column, |c| c.width = width);
        self.bump();
        tracing::debug!(column, pixels, "set width");
        &self.columns
    }

    /// Replace the column order wholesale.
    ///
    /// The caller guarantees `sequence` is a permutation of the current
    /// order; it is not validated here.
    pub fn reorder(&mut self, sequence: Vec<ColumnId>) -> &ColumnStates {
        self.columns.order = sequence;
        self.bump();
        tracing::debug!(order = ?self.columns.order, "reorder");
        &self.columns
    }

    /// Store a trimmed search query; an empty string clears the filter.
    pub fn set_search_query(&mut self, query: &str) -> &str {
        query.trim().clone_into(&mut self.search_query);
        self.bump();
        tracing::debug!(query = %self.search_query, "search");
        &self.search_query
    }

    /// Record the mounted column order if none is stored yet.
    ///
    /// This is bookkeeping, not a user mutation, so the version is unchanged.
    pub fn ensure_order(&mut self, mounted: impl IntoIterator<Item = ColumnId>) {
        if self.columns.order.is_empty() {
            self.columns.order = mounted.into_iter().collect();
        }
    }

    /// Order with `dragged` and `target` swapped in place.
    ///
    /// Returns `None` when the two are equal or either is not part of the
    /// stored order.
    pub fn swapped_order(&self, dragged: ColumnId, target: ColumnId) -> Option<Vec<ColumnId>> {
        if dragged == target {
            return None;
        }
        let order = &self.columns.order;
        let from = order.iter().position(|&c| c == dragged)?;
        let to = order.iter().position(|&c| c == target)?;
        let mut sequence = order.clone();
        sequence.swap(from, to);
        Some(sequence)
    }

    /// Wipe every overlay (dataset reset).
    pub fn clear(&mut self) {
        self.columns = ColumnStates::default();
        self.rows = RowStates::default();
        self.search_query.clear();
        self.bump();
    }

    /// Replace the column mapping from its JSON form.
    ///
    /// Malformed input fails closed to an empty mapping.
    pub fn load_columns(&mut self, json: &str) {
        self.columns = match serde_json::from_str(json) {
            Ok(columns) => columns,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed column state");
                ColumnStates::default()
            }
        };
        self.bump();
    }

    /// Replace the row mapping from its JSON form.
    ///
    /// Malformed input fails closed to an empty mapping.
    pub fn load_rows(&mut self, json: &str) {
        self.rows = match serde_json::from_str(json) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed row state");
                RowStates::default()
            }
        };
        self.bump();
    }

    pub fn columns_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.columns)?)
    }

    pub fn rows_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
