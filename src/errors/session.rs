//! Chat session error types

use thiserror::Error;

/// Errors raised by the chat session container and its storage port
#[derive(Error, Debug)]
pub enum SessionError {
    /// A message is already in flight
    #[error("A message is already being sent")]
    Busy,

    /// Refused to send an empty or whitespace-only query
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Storage IO failed
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// History could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
