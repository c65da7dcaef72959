//! `load_config` module: reads the optional YAML pipeline configuration.
//!
//! Every section and key is optional; a missing or empty file section falls
//! back to defaults. Command-line flags override what is loaded here.
//!
//! ```yaml
//! etudes:
//!   exclude: [one]
//! daily:
//!   output: ./daily_etude_data.json
//! mock:
//!   scenario: partial_failure
//!   output: ./mock_etude_data.json
//! ```
//!
//! # Errors
//! Unreadable files and invalid YAML surface as `anyhow::Error` with the path
//! and the underlying cause, for reporting at the CLI boundary.

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::mock_data::Scenario;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub etudes: EtudesSection,
    pub daily: DailySection,
    pub mock: MockSection,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtudesSection {
    /// Catalog keys to skip during discovery.
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DailySection {
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MockSection {
    pub scenario: Scenario,
    pub output: Option<PathBuf>,
}

/// Loads a pipeline config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(PipelineConfig::default());
    }

    let config: PipelineConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    info!(
        config_path = ?path_ref,
        excluded = config.etudes.exclude.len(),
        scenario = %config.mock.scenario,
        "Config loaded successfully"
    );
    Ok(config)
}

/// Loads `path` if given, otherwise returns the default config.
pub fn load_optional_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(PipelineConfig::default()),
    }
}
