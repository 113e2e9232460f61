//! fmbrowse Egress Connectors
//!
//! This crate talks to the remote Data API:
//! - HTTP client construction
//! - Session token holder (one credential exchange per process)
//! - Record fetcher (list, find and single-record calls)

pub mod client;
pub mod fetcher;
pub mod filemaker;
pub mod session;

pub use client::{HttpClientConfig, create_client};
pub use fetcher::RecordFetcher;
pub use filemaker::FileMakerConfig;
pub use session::SessionManager;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Authentication failed ({status_code}): {message}")]
    AuthFailed { status_code: u16, message: String },

    #[error(
        "Data API error {status_code}{}: {message}",
        code.as_ref().map(|c| format!(" (code {})", c)).unwrap_or_default()
    )]
    ApiError {
        status_code: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, EgressError>;

impl From<EgressError> for fmbrowse_core::Error {
    fn from(err: EgressError) -> Self {
        match err {
            EgressError::HttpError(e) => fmbrowse_core::Error::Transport(e.to_string()),
            EgressError::AuthFailed { message, .. } => fmbrowse_core::Error::AuthFailed(message),
            EgressError::ApiError {
                status_code,
                code,
                message,
            } => fmbrowse_core::Error::Api {
                status_code,
                code,
                message,
            },
            EgressError::MalformedResponse(msg) => fmbrowse_core::Error::MalformedResponse(msg),
            EgressError::ConfigError(msg) => fmbrowse_core::Error::Config(msg),
        }
    }
}
