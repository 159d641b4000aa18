use serde::Deserialize;
use thiserror::Error;

/// Default number of undo steps kept per document
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// Undo history settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of undo steps, 0 for unlimited
    pub undo_limit: usize,
    /// Coalesce the samples of a drag gesture into a single undo step
    pub merge_gestures: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            merge_gestures: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid history config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl HistoryConfig {
    /// Load settings from a JSON object; missing fields use their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
