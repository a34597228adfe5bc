//! Data set error types
//!
//! Errors raised while loading the CSV corpus or answering queries against it.
//!
//! # Examples
//!
//! ```rust
//! use tiktok_insights::errors::DataSetError;
//!
//! let err = DataSetError::UnknownDataset("followers".to_string());
//! assert!(err.is_client_error());
//! ```

use thiserror::Error;

/// Data set operation errors
#[derive(Error, Debug)]
pub enum DataSetError {
    /// Requested data set name is not one of the known data sets
    #[error("Dataset '{0}' not found")]
    UnknownDataset(String),

    /// Query parameters failed validation
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Required column missing from a CSV header
    #[error("Missing column '{column}' in {filename}")]
    MissingColumn { filename: String, column: String },

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

impl DataSetError {
    /// Returns true if the caller can fix the error by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DataSetError::UnknownDataset(_) | DataSetError::InvalidQuery(_)
        )
    }

    /// Returns true for lookups of data sets that do not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataSetError::UnknownDataset(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dataset_is_not_found() {
        let err = DataSetError::UnknownDataset("followers".to_string());
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Dataset 'followers' not found");
    }

    #[test]
    fn test_io_error_is_server_side() {
        let err = DataSetError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(!err.is_client_error());
    }
}
