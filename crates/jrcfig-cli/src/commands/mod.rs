//! CLI commands.

pub mod catalog;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use jrcfig_core::models::config::JrcfigConfig;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jrcfig")
        .join("config.json")
}

/// Load the configuration named by `--config`, else the user configuration
/// file if one exists, else the built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<JrcfigConfig> {
    let config = match config_path {
        Some(path) => JrcfigConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using configuration from {}", default_path.display());
                JrcfigConfig::from_file(&default_path)?
            } else {
                JrcfigConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}
