//! Wire records exchanged with the provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ViewerConfig;
use crate::error::Result;
use crate::layout::RowRange;
use crate::store::InteractionStore;
use crate::types::{ColumnStates, DatasetMetadata, RowStates};

/// Revision of the outbound field set. Bumped whenever a field is added,
/// renamed or changes meaning.
pub const PROTOCOL_VERSION: u32 = 1;

/// Why a sync was pushed. Diagnostic only; the provider must not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Scroll,
    Sort,
    Select,
    Resize,
    Reorder,
    Search,
    Reset,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Sort => "sort",
            Self::Select => "select",
            Self::Resize => "resize",
            Self::Reorder => "reorder",
            Self::Search => "search",
            Self::Reset => "reset",
        }
    }
}

/// Local view and interaction state pushed to the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncRequest {
    pub version: u32,
    /// Assigned by the gateway when the request actually leaves.
    pub seq: u64,
    pub event: EventKind,
    pub start_rows: u32,
    pub end_rows: u32,
    pub state_cols: ColumnStates,
    pub state_rows: RowStates,
    pub search_query: String,
}

impl SyncRequest {
    /// Snapshot the requested window and the whole interaction overlay.
    pub fn new(range: RowRange, store: &InteractionStore, event: EventKind) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            seq: 0,
            event,
            start_rows: range.start,
            end_rows: range.end,
            state_cols: store.columns().clone(),
            state_rows: store.rows().clone(),
            search_query: store.search_query().to_string(),
        }
    }

    pub fn range(&self) -> RowRange {
        RowRange::new(self.start_rows, self.end_rows)
    }

    /// Key/value pairs as set on the host, in a stable order.
    ///
    /// The two state mappings travel as JSON strings: the provider keeps them
    /// as opaque text traits and parses them itself.
    pub fn fields(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("version", Value::from(self.version)),
            ("seq", Value::from(self.seq)),
            ("event", Value::from(self.event.as_str())),
            ("start_rows", Value::from(self.start_rows)),
            ("end_rows", Value::from(self.end_rows)),
            ("state_cols", Value::from(serde_json::to_string(&self.state_cols)?)),
            ("state_rows", Value::from(serde_json::to_string(&self.state_rows)?)),
            ("search_query", Value::from(self.search_query.as_str())),
        ])
    }
}

/// Freshly rendered window plus dataset metadata from the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SyncResponse {
    /// Sequence number of the request this answers; `None` for a
    /// provider-initiated push.
    #[serde(default)]
    pub seq: Option<u64>,
    /// Rendered table markup.
    #[serde(default)]
    pub view: String,
    #[serde(flatten)]
    pub metadata: DatasetMetadata,
    /// The underlying dataset changed; local state must be dropped.
    #[serde(default)]
    pub reset: bool,
    #[serde(default)]
    pub config: Option<ViewerConfig>,
    /// Column state restored by the provider (JSON text).
    #[serde(default)]
    pub state_cols: Option<String>,
    /// Row state restored by the provider (JSON text).
    #[serde(default)]
    pub state_rows: Option<String>,
}

impl SyncResponse {
    /// Decode a whole response object.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Merge a single changed field into this response.
    ///
    /// Unknown keys are ignored; values of the wrong type leave the field
    /// untouched.
    pub fn apply_field(&mut self, key: &str, value: &Value) {
        let as_u32 = || value.as_u64().and_then(|v| u32::try_from(v).ok());
        match key {
            "seq" => self.seq = value.as_u64(),
            "view" => {
                if let Some(view) = value.as_str() {
                    self.view = view.to_string();
                }
            }
            "n_rows" => self.metadata.total_rows = as_u32().unwrap_or(self.metadata.total_rows),
            "n_cols" => self.metadata.total_cols = as_u32().unwrap_or(self.metadata.total_cols),
            "min_rows" => self.metadata.min_rows = as_u32().unwrap_or(self.metadata.min_rows),
            "max_rows" => self.metadata.max_rows = as_u32().unwrap_or(self.metadata.max_rows),
            "max_columns" => {
                self.metadata.max_columns = as_u32().unwrap_or(self.metadata.max_columns);
            }
            "max_colwidth" => {
                self.metadata.max_column_width =
                    as_u32().unwrap_or(self.metadata.max_column_width);
            }
            "reset" => self.reset = value.as_bool().unwrap_or(false),
            "config" => {
                self.config = serde_json::from_value(value.clone()).ok();
            }
            "state_cols" => self.state_cols = value.as_str().map(str::to_string),
            "state_rows" => self.state_rows = value.as_str().map(str::to_string),
            _ => {}
        }
    }
}
