//! Data API connection settings and endpoint construction

use crate::{EgressError, Result, client::HttpClientConfig};
use reqwest::Url;
use std::fmt;

/// Connection settings for one hosted database
#[derive(Clone)]
pub struct FileMakerConfig {
    /// Scheme and host of the server (default: `https://{host}`)
    pub base_url: String,

    /// Hosted database (file) name
    pub database: String,

    /// Account used for the session exchange
    pub username: String,

    pub password: String,

    /// Data API version path segment
    pub api_version: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl FileMakerConfig {
    pub const DEFAULT_API_VERSION: &'static str = "vLatest";

    /// Create a configuration for `https://{host}`
    pub fn new(
        host: impl AsRef<str>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: format!("https://{}", host.as_ref().trim_end_matches('/')),
            database: database.into(),
            username: username.into(),
            password: password.into(),
            api_version: Self::DEFAULT_API_VERSION.to_string(),
            client_config: HttpClientConfig::default(),
        }
    }

    /// Set the base URL (for local servers, proxies and tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_client_config(mut self, client_config: HttpClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    /// `{base}/fmi/data/{version}/databases/{database}/sessions`
    pub fn sessions_url(&self) -> Result<Url> {
        self.database_endpoint(&["sessions"])
    }

    /// `{base}/fmi/data/{version}/databases/{database}/layouts/{layout}/records`
    pub fn records_url(&self, layout: &str) -> Result<Url> {
        self.database_endpoint(&["layouts", layout, "records"])
    }

    /// `{base}/fmi/data/{version}/databases/{database}/layouts/{layout}/records/{id}`
    pub fn record_url(&self, layout: &str, record_id: &str) -> Result<Url> {
        self.database_endpoint(&["layouts", layout, "records", record_id])
    }

    /// `{base}/fmi/data/{version}/databases/{database}/layouts/{layout}/_find`
    pub fn find_url(&self, layout: &str) -> Result<Url> {
        self.database_endpoint(&["layouts", layout, "_find"])
    }

    /// Append percent-encoded path segments below the database root
    fn database_endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            EgressError::ConfigError(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                EgressError::ConfigError(format!("Base URL '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["fmi", "data", self.api_version.as_str(), "databases"])
            .push(&self.database)
            .extend(segments);

        Ok(url)
    }
}

impl fmt::Debug for FileMakerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileMakerConfig")
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("client_config", &self.client_config)
            .finish()
    }
}
