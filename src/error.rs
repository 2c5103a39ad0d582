//! Structured error types for pdview.
//!
//! Most failure modes in the viewport are recoverable locally (see the
//! fail-closed loaders in [`crate::store`]); these errors cover the
//! boundaries where something genuinely cannot proceed.

/// All errors that can occur while indexing markup or talking to the host.
#[derive(Debug, thiserror::Error)]
pub enum PdviewError {
    /// Interaction state or provider payload failed to (de)serialize.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider markup could not be tokenized.
    #[error("Markup: {0}")]
    Markup(#[from] quick_xml::Error),

    /// The host rejected a state update or message.
    #[error("Host: {0}")]
    Host(String),

    /// Mount surface is missing or detached.
    #[error("Surface: {0}")]
    Surface(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PdviewError>;

impl From<String> for PdviewError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for PdviewError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<PdviewError> for wasm_bindgen::JsValue {
    fn from(e: PdviewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
