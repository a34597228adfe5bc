//! Domain-specific error types
//!
//! # Error Categories
//!
//! - **DataSetError**: corpus loading, previews and listing queries
//! - **LlmError**: language model backend calls and prompt rendering
//! - **SessionError**: chat session container and its persistence port
//! - **ClientError**: HTTP client for the dashboard API
//!
//! The HTTP layer maps these onto status codes in `server::error`.

pub mod client;
pub mod data_set;
pub mod llm;
pub mod session;

pub use client::ClientError;
pub use data_set::DataSetError;
pub use llm::LlmError;
pub use session::SessionError;

/// Result type alias for data set operations
pub type DataSetResult<T> = Result<T, DataSetError>;

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Result type alias for chat session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for API client operations
pub type ClientResult<T> = Result<T, ClientError>;
