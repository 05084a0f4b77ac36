//! Error types for index transport operations

use thiserror::Error;

/// Errors that can occur while talking to the search backend
#[derive(Debug, Error)]
pub enum IndexError {
    /// The backend cannot be reached or the session pool is closed
    #[error("Index backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected a request
    #[error("Index request failed: {0}")]
    Request(String),

    /// A named index does not exist
    #[error("Index not found: {0}")]
    NotFound(String),

    /// A document body could not be serialized or parsed
    #[error("Document serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::Unavailable("connection refused".to_string());
        assert!(format!("{}", err).contains("connection refused"));

        let err = IndexError::NotFound("vigil-1-0".to_string());
        assert!(format!("{}", err).contains("vigil-1-0"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: IndexError = json_err.into();
        assert!(matches!(err, IndexError::Serialization(_)));
    }
}
