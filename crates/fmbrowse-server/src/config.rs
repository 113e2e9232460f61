use fmbrowse_egress::{FileMakerConfig, HttpClientConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub filemaker: FileMakerSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the FileMaker Data API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMakerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Full scheme and host, overrides `host`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_false")]
    pub accept_invalid_certs: bool,

    /// Request timeout; unset leaves the transport default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            filemaker: FileMakerSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FileMakerSettings {
    fn default() -> Self {
        Self {
            host: None,
            base_url: None,
            database: None,
            username: None,
            password: None,
            api_version: default_api_version(),
            accept_invalid_certs: false,
            timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Data API connection (no FMBROWSE_ prefix for these)
        if let Ok(val) = std::env::var("FM_HOST") {
            self.filemaker.host = Some(val);
        }

        if let Ok(val) = std::env::var("FM_DATABASE") {
            self.filemaker.database = Some(val);
        }

        if let Ok(val) = std::env::var("FM_USER") {
            self.filemaker.username = Some(val);
        }

        if let Ok(val) = std::env::var("FM_PASSWORD") {
            self.filemaker.password = Some(val);
        }

        if let Ok(val) = std::env::var("FMBROWSE_BASE_URL") {
            self.filemaker.base_url = Some(val);
        }

        if let Ok(val) = std::env::var("FMBROWSE_ACCEPT_INVALID_CERTS") {
            if let Ok(accept) = val.parse::<bool>() {
                self.filemaker.accept_invalid_certs = accept;
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("FMBROWSE_LOG_LEVEL") {
            self.logging.level = val;
        }

        // Proxy listen address
        if let Ok(val) = std::env::var("FMBROWSE_PORT") {
            if let Ok(port) = val.parse::<u16>() {
                self.port = port;
            }
        }

        if let Ok(val) = std::env::var("FMBROWSE_HOST") {
            self.host = val;
        }
    }

    /// Presence checks only
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fm = &self.filemaker;
        if is_blank(&fm.host) && is_blank(&fm.base_url) {
            return Err(ConfigError::Missing("filemaker.host (FM_HOST)"));
        }
        if is_blank(&fm.database) {
            return Err(ConfigError::Missing("filemaker.database (FM_DATABASE)"));
        }
        if is_blank(&fm.username) {
            return Err(ConfigError::Missing("filemaker.username (FM_USER)"));
        }
        if is_blank(&fm.password) {
            return Err(ConfigError::Missing("filemaker.password (FM_PASSWORD)"));
        }
        Ok(())
    }

    pub fn to_filemaker_config(&self) -> Result<FileMakerConfig, ConfigError> {
        self.validate()?;
        let fm = &self.filemaker;

        let client_config = HttpClientConfig {
            timeout_secs: fm.timeout_secs,
            accept_invalid_certs: fm.accept_invalid_certs,
            ..HttpClientConfig::default()
        };

        let mut config = FileMakerConfig::new(
            fm.host.as_deref().unwrap_or_default(),
            fm.database.clone().unwrap_or_default(),
            fm.username.clone().unwrap_or_default(),
            fm.password.clone().unwrap_or_default(),
        )
        .with_api_version(fm.api_version.clone())
        .with_client_config(client_config);

        if let Some(base_url) = fm.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5173
}

fn default_api_version() -> String {
    FileMakerConfig::DEFAULT_API_VERSION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}
