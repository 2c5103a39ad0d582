//! Engine tuning delivered by the provider.
//!
//! There is no local configuration surface: the provider may attach a
//! `config` object to any response, and every field falls back to its
//! default when absent.

use serde::{Deserialize, Serialize};

/// Margin (in screens) of the resting window requested from the provider.
pub const DEFAULT_RANGE_MARGIN: f64 = 4.0;

/// Margin (in screens) used to test whether a scroll left the window.
pub const DEFAULT_EDGE_MARGIN: f64 = 1.0;

/// Quiet period before a burst of scroll events is synced.
pub const DEFAULT_SCROLL_DEBOUNCE_MS: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Wide margin scale for resting ranges.
    pub range_margin: f64,
    /// Narrow margin scale for edge tests.
    pub edge_margin: f64,
    /// Scroll debounce delay in milliseconds.
    pub scroll_debounce_ms: f64,
    /// Minimum level forwarded to the host log channel
    /// (`trace`, `debug`, `info`, `warn`, `error`).
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            range_margin: DEFAULT_RANGE_MARGIN,
            edge_margin: DEFAULT_EDGE_MARGIN,
            scroll_debounce_ms: DEFAULT_SCROLL_DEBOUNCE_MS,
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parsed `log_level`, `INFO` if unrecognized.
    pub fn level(&self) -> tracing::Level {
        self.log_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ViewerConfig = serde_json::from_str(r#"{"range_margin": 2.5}"#).unwrap();
        assert_eq!(config.range_margin, 2.5);
        assert_eq!(config.edge_margin, DEFAULT_EDGE_MARGIN);
        assert_eq!(config.scroll_debounce_ms, DEFAULT_SCROLL_DEBOUNCE_MS);
    }

    #[test]
    fn test_level_parsing() {
        let mut config = ViewerConfig::default();
        assert_eq!(config.level(), tracing::Level::INFO);
        config.log_level = "debug".into();
        assert_eq!(config.level(), tracing::Level::DEBUG);
        config.log_level = "loud".into();
        assert_eq!(config.level(), tracing::Level::INFO);
    }
}
