//! Error types for fmbrowse Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid date '{0}': expected YYYY-MM-DD or MM/DD/YYYY")]
    InvalidDate(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error(
        "Data API error {status_code}{}: {message}",
        code.as_ref().map(|c| format!(" (code {})", c)).unwrap_or_default()
    )]
    Api {
        status_code: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
