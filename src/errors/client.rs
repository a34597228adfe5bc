//! Dashboard API client error types

use thiserror::Error;

/// Errors surfaced by the HTTP client for the dashboard API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server answered with an error body; `message` is its `detail` or `message` field
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport level failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Base URL or path could not be joined
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            ClientError::InvalidUrl(_) => None,
        }
    }
}
