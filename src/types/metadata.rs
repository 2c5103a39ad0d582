//! Dataset metadata reported by the provider.

use serde::{Deserialize, Serialize};

/// Read-only dataset snapshot supplied by the provider with every response.
///
/// Field names on the wire follow the provider's traits (`n_rows`,
/// `max_colwidth`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Rows in the (searched/filtered) dataset.
    #[serde(rename = "n_rows", default)]
    pub total_rows: u32,
    /// Columns in the dataset.
    #[serde(rename = "n_cols", default)]
    pub total_cols: u32,
    /// Rows that stay visible at minimum height.
    #[serde(default)]
    pub min_rows: u32,
    /// Row cap above which lazy loading kicks in (0 = unlimited).
    #[serde(default)]
    pub max_rows: u32,
    /// Column cap forwarded from the provider's display options.
    #[serde(default)]
    pub max_columns: u32,
    /// Cell width cap in characters (0 = untruncated).
    #[serde(rename = "max_colwidth", default)]
    pub max_column_width: u32,
}

impl DatasetMetadata {
    /// True when only a window of rows is materialized.
    pub fn is_lazy(&self) -> bool {
        self.max_rows != 0 && self.total_rows > self.max_rows
    }

    /// True when cell contents are truncated to `max_column_width`.
    pub fn is_truncated(&self) -> bool {
        self.max_column_width != 0
    }

    /// Footer line describing the dataset shape.
    pub fn shape_text(&self) -> String {
        format!("{} rows × {} columns", self.total_rows, self.total_cols)
    }
}
