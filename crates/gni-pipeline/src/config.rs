use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Configuration for the reconciliation pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stop the run at the first event that fails with a fatal error.
    /// When `false` the failure is recorded and processing continues.
    pub halt_on_fatal: bool,
    /// Resolve metadata documents through the content fetcher.
    pub fetch_metadata: bool,
    /// Skip events at or before the stored checkpoint.
    pub skip_replayed: bool,
    /// Directory of metadata documents named by content address.
    pub metadata_dir: Option<PathBuf>,
    /// Contract parameter values served to `ParameterUpdated` handlers.
    pub contract_state: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            halt_on_fatal: true,
            fetch_metadata: true,
            skip_replayed: true,
            metadata_dir: None,
            contract_state: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PipelineError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
