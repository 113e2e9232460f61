//! Data API session token holder
//!
//! The Data API authenticates each call with a bearer token obtained by
//! posting Basic credentials to the `sessions` endpoint. The token is fetched
//! lazily on first use and cached for the lifetime of the manager.
//!
//! There is no expiry tracking and no refresh: once the server expires the
//! session, calls fail until the manager is rebuilt.

use crate::{EgressError, Result, client::create_client, filemaker::FileMakerConfig};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Single-slot cache of the session token, shared by every caller
pub struct SessionManager {
    config: FileMakerConfig,
    client: Client,
    token: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    #[serde(default)]
    response: Option<SessionResponse>,
    #[serde(default)]
    messages: Vec<SessionMessage>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionMessage {
    #[serde(default)]
    message: String,
}

impl SessionManager {
    /// Create a session manager with its own HTTP client
    pub fn new(config: FileMakerConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a session manager around an existing HTTP client
    pub fn with_client(config: FileMakerConfig, client: Client) -> Self {
        Self {
            config,
            client,
            token: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &FileMakerConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Return the cached token, creating a session on first use.
    ///
    /// Two callers racing on an empty cache may both create a session; the
    /// last one written wins.
    #[instrument(skip(self))]
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }

        let token = self.create_session().await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    /// Whether a token is currently cached
    pub async fn has_token(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Exchange the configured credentials for a new session token
    async fn create_session(&self) -> Result<String> {
        let url = self.config.sessions_url()?;
        debug!(url = %url, user = %self.config.username, "Creating Data API session");

        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| {
                warn!("Session request failed: {}", e);
                EgressError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        let envelope: Option<SessionEnvelope> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = envelope
                .as_ref()
                .and_then(|env| env.messages.first())
                .map(|m| m.message.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            warn!(status = status.as_u16(), "Data API session was rejected");

            return Err(if status == reqwest::StatusCode::UNAUTHORIZED {
                EgressError::AuthFailed {
                    status_code: status.as_u16(),
                    message,
                }
            } else {
                EgressError::ApiError {
                    status_code: status.as_u16(),
                    code: None,
                    message,
                }
            });
        }

        let token = envelope
            .and_then(|env| env.response)
            .and_then(|resp| resp.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                EgressError::MalformedResponse("session response carries no token".to_string())
            })?;

        info!(
            "Created Data API session for database {} (token length: {} chars)",
            self.config.database,
            token.len()
        );
        Ok(token)
    }
}
