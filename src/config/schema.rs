use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding one YAML/JSON file per city
    /// (defaults to ~/.config/city-atlas/data)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Glob patterns, relative to `data_dir`, selecting city files
    #[serde(default)]
    pub include: Option<Vec<String>>,

    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

impl Config {
    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| super::get_config_dir().join("data"))
    }

    /// Scoring settings with defaults filled in
    pub fn effective_scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }
}
