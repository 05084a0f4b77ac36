//! Error types for the event persistence subsystem

use thiserror::Error;

use logvigil_core::{LookupError, PointerError};
use logvigil_index::IndexError;

/// Errors raised while mapping events to or from backend documents.
///
/// Conversion failures are distinct from backend connectivity failures:
/// a [`ConvertError`] means the value or stored document itself is the
/// problem and retrying will not help.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A fixed attribute is missing from a stored document
    #[error("Missing document field: {0}")]
    MissingField(String),

    /// A document field holds a value of the wrong shape
    #[error("Invalid value in field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// No codec is registered for a field value tag
    #[error("No codec registered for tag '{0}'")]
    UnknownTag(String),

    /// A stored pointer could not be decoded
    #[error(transparent)]
    Pointer(#[from] PointerError),
}

impl ConvertError {
    /// Shorthand for an invalid-value error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type of the persistence façade
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Collaborator lookup error: {0}")]
    Lookup(#[from] LookupError),
}
