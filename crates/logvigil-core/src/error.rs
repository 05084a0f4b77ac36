//! Error types for the logvigil core domain

use thiserror::Error;

/// Errors raised when decoding a pointer from its portable form
#[derive(Debug, Error)]
pub enum PointerError {
    #[error("Malformed pointer: {0}")]
    Malformed(String),
}

/// Errors raised by sniffer/log-source collaborator lookups
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup backend unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_error_display() {
        let err = PointerError::Malformed("bad data".to_string());
        assert!(format!("{}", err).contains("Malformed pointer"));
        assert!(format!("{}", err).contains("bad data"));
    }

    #[test]
    fn test_lookup_error_display() {
        let err = LookupError::Unavailable("db down".to_string());
        assert!(format!("{}", err).contains("db down"));
    }
}
