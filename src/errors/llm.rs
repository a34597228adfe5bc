//! LLM backend error types

use thiserror::Error;

/// Errors talking to the language model backend
#[derive(Error, Debug)]
pub enum LlmError {
    /// No candidate endpoint answered
    #[error("LLM backend unreachable: {0}")]
    Unreachable(String),

    /// Transport level failure (connect, timeout, decode)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("LLM backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend answered but the payload was not what we expected
    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    /// Configured base URL cannot be parsed
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Prompt template failed to render
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),
}

impl LlmError {
    /// Returns true when the backend itself is the problem, as opposed to local bugs
    pub fn is_upstream(&self) -> bool {
        !matches!(self, LlmError::Prompt(_))
    }
}

impl From<handlebars::RenderError> for LlmError {
    fn from(err: handlebars::RenderError) -> Self {
        LlmError::Prompt(err.to_string())
    }
}
