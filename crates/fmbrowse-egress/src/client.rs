//! Shared HTTP client utilities

use crate::{EgressError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::warn;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds, `None` leaves the transport default
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds, `None` leaves the transport default
    pub connect_timeout_secs: Option<u64>,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,

    /// Accept self-signed or otherwise invalid TLS certificates.
    /// Local FileMaker Servers commonly run with a self-signed certificate.
    pub accept_invalid_certs: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: None,
            pool_max_idle_per_host: 8,
            user_agent: format!("fmbrowse/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    if config.accept_invalid_certs {
        warn!("TLS certificate verification is disabled for the Data API client");
    }

    let mut builder = ClientBuilder::new();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    builder
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        // Expire idle connections before the server closes them
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| EgressError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.connect_timeout_secs, None);
        assert_eq!(config.pool_max_idle_per_host, 8);
        assert!(!config.accept_invalid_certs);
        assert!(config.user_agent.starts_with("fmbrowse/"));
    }

    #[test]
    fn test_create_client() {
        let config = HttpClientConfig::default();
        assert!(create_client(&config).is_ok());
    }

    #[test]
    fn test_create_client_with_timeouts() {
        let config = HttpClientConfig {
            timeout_secs: Some(30),
            connect_timeout_secs: Some(5),
            ..Default::default()
        };
        assert!(create_client(&config).is_ok());
    }

    #[test]
    fn test_client_accepting_invalid_certs() {
        let config = HttpClientConfig {
            accept_invalid_certs: true,
            ..Default::default()
        };
        assert!(create_client(&config).is_ok());
    }
}
