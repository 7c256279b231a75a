//! TOML configuration file loading
//!
//! Supports `~/.config/anything/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AnythingConfigFile {
    /// User id sent with every remote call
    #[serde(default)]
    pub user_id: Option<String>,

    /// Backend service configuration
    #[serde(default)]
    pub backend: BackendFileConfig,

    /// Plugin generation configuration
    #[serde(default)]
    pub plugins: PluginsFileConfig,
}

/// Backend service configuration
#[derive(Debug, Default, Deserialize)]
pub struct BackendFileConfig {
    /// Base URL (e.g. "http://127.0.0.1:8000")
    pub url: Option<String>,

    /// Transport timeout in seconds; unset means no timeout
    pub timeout_secs: Option<u64>,
}

/// Plugin generation configuration
#[derive(Debug, Default, Deserialize)]
pub struct PluginsFileConfig {
    /// Substrings that mark a command as a plugin request
    pub keywords: Option<Vec<String>>,
}

/// Read and parse a config file at an explicit path
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<AnythingConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Load the TOML config file from the standard path
///
/// Returns `AnythingConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> AnythingConfigFile {
    let Some(path) = config_file_path() else {
        return AnythingConfigFile::default();
    };

    if !path.exists() {
        return AnythingConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            AnythingConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/anything/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("anything").join("config.toml"))
}
