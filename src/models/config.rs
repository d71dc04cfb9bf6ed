use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// HTTP transport settings
    #[serde(default)]
    pub transport: TransportConfig,

    /// Defaults applied to props given on the command line
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Settings for the reqwest-backed transport
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum number of redirects to follow
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("inline-svg/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_redirects() -> usize {
    10
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_keep_during_loading")]
    pub keep_during_loading: bool,

    #[serde(default)]
    pub unique_ids_base: Option<String>,
}

fn default_keep_during_loading() -> bool {
    true
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            keep_during_loading: default_keep_during_loading(),
            unique_ids_base: None,
        }
    }
}

impl AppConfig {
    /// Parse configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults when the file is
    /// missing or invalid
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    timeout_secs = config.transport.timeout_secs,
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }
}
