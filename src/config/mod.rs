pub mod columns;
pub mod paths;
pub mod scoring;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub use columns::ColumnConfig;
pub use paths::PathConfig;
pub use scoring::ScoringConfig;

/// Main configuration for the Energy-Performance pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub columns: ColumnConfig,
    pub scoring: ScoringConfig,
    pub paths: PathConfig,
}

impl Config {
    /// Load a JSON config file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.scoring.validate()?;
        Ok(config)
    }

    pub fn to_dict(&self) -> anyhow::Result<HashMap<String, serde_json::Value>> {
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }

    pub fn from_dict(data: HashMap<String, serde_json::Value>) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_value(serde_json::to_value(data)?)?;
        config.scoring.validate()?;
        Ok(config)
    }
}
