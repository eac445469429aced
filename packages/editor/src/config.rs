use crate::EditorError;
use pagecraft_model::CascadeMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Editor session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo steps kept; `null` keeps all of them
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Fold consecutive edits of the same node into one undo step
    #[serde(default)]
    pub coalesce_updates: bool,

    /// Window in which a repeated drop of the same item is ignored
    #[serde(default = "default_drop_debounce_ms")]
    pub drop_debounce_ms: u64,

    /// Whether mobile styles fall back to tablet overrides
    #[serde(default)]
    pub responsive_cascade: CascadeMode,

    /// Seed for generated node ids
    #[serde(default = "default_id_seed")]
    pub id_seed: String,
}

fn default_drop_debounce_ms() -> u64 {
    250
}

fn default_id_seed() -> String {
    "page".to_string()
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a directory, falling back to defaults
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            coalesce_updates: false,
            drop_debounce_ms: default_drop_debounce_ms(),
            responsive_cascade: CascadeMode::Independent,
            id_seed: default_id_seed(),
        }
    }
}
