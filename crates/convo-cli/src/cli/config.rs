use std::path::Path;

use anyhow::{Context, Result};
use convo_core::origin::Origin;
use convo_core::{LoaderConfig, ViewOptions};
use serde::{Deserialize, Serialize};

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Loader settings (indent cap, strategy, network use)
    #[serde(default)]
    pub loader: LoaderConfig,

    /// How rows are laid out
    #[serde(default)]
    pub view: ViewOptions,

    /// Server the notes came from, used for permalinks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Deserialize config from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }
}
