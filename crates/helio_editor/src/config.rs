// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings, persisted as RON alongside the project.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Whether edit history is recorded at all
    pub history_enabled: bool,
    /// Coalescing window for continuous edits, in milliseconds
    pub history_coalesce_ms: u64,
    /// Maximum number of history entries kept
    pub max_history: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_enabled: true,
            history_coalesce_ms: 500,
            max_history: 100,
        }
    }
}

impl EditorConfig {
    /// The coalescing window as a [`Duration`]
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.history_coalesce_ms)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Parse from RON
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.history_enabled);
        assert_eq!(config.coalesce_window(), Duration::from_millis(500));
        assert_eq!(config.max_history, 100);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EditorConfig {
            history_enabled: false,
            history_coalesce_ms: 250,
            max_history: 42,
        };
        let text = config.to_ron().unwrap();
        let loaded = EditorConfig::from_ron(&text).unwrap();
        assert_eq!(loaded, config);
    }
}
