//! Typed interaction state records.
//!
//! The wire format is JSON (one object per mapping), but in memory every
//! entry is a typed record. Entries that fall back to their default are
//! removed, so absence of a key always means "untouched".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable logical column identifier (ordinal in the original frame).
pub type ColumnId = u32;

/// Stable logical row identifier (ordinal in the original frame).
pub type RowId = u32;

/// Sort direction of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Next step of the `none -> desc -> asc -> none` cycle.
    pub fn next(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Desc),
            Some(Self::Desc) => Some(Self::Asc),
            Some(Self::Asc) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Class placed on a column header sorted this way.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Asc => "pd-sort-asc",
            Self::Desc => "pd-sort-desc",
        }
    }
}

/// Selection mark of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectState {
    /// Marked by the provider or a previous session.
    Checked,
    /// Toggled on by a click in this view.
    Active,
}

impl SelectState {
    /// Next step of the `none -> active -> none` cycle. Any existing mark
    /// clears.
    pub fn next(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Active),
            Some(_) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checked => "checked",
            Self::Active => "active",
        }
    }

    /// Class placed on a row header carrying this mark.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Checked => "pd-select-checked",
            Self::Active => "pd-select-active",
        }
    }
}

/// Per-column overlay: sort direction and width override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl ColumnState {
    pub fn is_default(&self) -> bool {
        self.sort.is_none() && self.width.is_none()
    }
}

/// Per-row overlay: selection mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<SelectState>,
}

impl RowState {
    pub fn is_default(&self) -> bool {
        self.select.is_none()
    }
}

/// Column mapping plus the materialized left-to-right order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStates {
    #[serde(default)]
    pub columns: BTreeMap<ColumnId, ColumnState>,
    #[serde(default)]
    pub order: Vec<ColumnId>,
}

impl ColumnStates {
    /// State of `id`, default if untouched.
    pub fn get(&self, id: ColumnId) -> ColumnState {
        self.columns.get(&id).copied().unwrap_or_default()
    }

    /// Read-modify-write one entry, dropping it if it returns to default.
    pub fn update(&mut self, id: ColumnId, f: impl FnOnce(&mut ColumnState)) -> ColumnState {
        let mut entry = self.get(id);
        f(&mut entry);
        if entry.is_default() {
            self.columns.remove(&id);
        } else {
            self.columns.insert(id, entry);
        }
        entry
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.order.is_empty()
    }
}

/// Row mapping. Serialized as a plain object keyed by row id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowStates {
    pub rows: BTreeMap<RowId, RowState>,
}

impl RowStates {
    /// State of `id`, default if untouched.
    pub fn get(&self, id: RowId) -> RowState {
        self.rows.get(&id).copied().unwrap_or_default()
    }

    /// Read-modify-write one entry, dropping it if it returns to default.
    pub fn update(&mut self, id: RowId, f: impl FnOnce(&mut RowState)) -> RowState {
        let mut entry = self.get(id);
        f(&mut entry);
        if entry.is_default() {
            self.rows.remove(&id);
        } else {
            self.rows.insert(id, entry);
        }
        entry
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
