//! Configuration management for the Anything App
//!
//! Precedence, highest first: CLI flags, environment, TOML file, defaults.

pub mod file;

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::gateway::HttpGateway;
use crate::gateway::client::parse_base_url;
use crate::orchestrator::{DEFAULT_PLUGIN_KEYWORDS, KeywordClassifier};
use crate::{Error, Result};

use file::AnythingConfigFile;

/// Default backend address
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Anything App configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend service base URL
    pub backend_url: Url,

    /// User id sent with every remote call
    pub user_id: Option<String>,

    /// Transport timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,

    /// Substrings that mark a command as a plugin request
    pub plugin_keywords: Vec<String>,
}

impl Config {
    /// Load configuration from the standard config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is invalid
    pub fn load() -> Result<Self> {
        Self::resolve(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit config file and the environment
    ///
    /// Unlike [`Config::load`], a missing or unparsable file is an error.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a value is invalid
    pub fn load_from(path: &Path) -> Result<Self> {
        let fc = file::read_config_file(path)?;
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL or timeout is invalid
    pub fn resolve<F>(fc: AnythingConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = env("ANYTHING_BACKEND_URL")
            .or(fc.backend.url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = parse_base_url(&backend_url)?;

        let user_id = env("ANYTHING_USER_ID").or(fc.user_id).filter(|id| is_set(id));

        let timeout_secs = match env("ANYTHING_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("invalid ANYTHING_TIMEOUT_SECS {raw:?}: {e}"))
            })?),
            None => fc.backend.timeout_secs,
        };
        let request_timeout = match timeout_secs {
            Some(0) => {
                return Err(Error::Config(
                    "timeout must be at least one second".to_string(),
                ));
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let plugin_keywords = fc.plugins.keywords.unwrap_or_else(|| {
            DEFAULT_PLUGIN_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect()
        });

        Ok(Self {
            backend_url,
            user_id,
            request_timeout,
            plugin_keywords,
        })
    }

    /// Override the backend URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is invalid
    pub fn with_backend_url(mut self, raw: &str) -> Result<Self> {
        self.backend_url = parse_base_url(raw)?;
        Ok(self)
    }

    /// Override the user id; a blank id leaves the current one in place
    #[must_use]
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        if let Some(user_id) = user_id.filter(|id| is_set(id)) {
            self.user_id = Some(user_id);
        }
        self
    }

    /// Build the HTTP gateway this configuration describes
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn gateway(&self) -> Result<HttpGateway> {
        match self.request_timeout {
            Some(timeout) => HttpGateway::with_timeout(self.backend_url.as_str(), timeout),
            None => HttpGateway::new(self.backend_url.as_str()),
        }
    }

    /// Build the plugin request classifier
    #[must_use]
    pub fn classifier(&self) -> KeywordClassifier {
        KeywordClassifier::new(&self.plugin_keywords)
    }
}

fn is_set(id: &str) -> bool {
    !id.trim().is_empty()
}
