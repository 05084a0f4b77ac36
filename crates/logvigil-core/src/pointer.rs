//! Log position pointers
//!
//! A [`LogPointer`] marks a position inside a log stream. Pointers are
//! opaque to the persistence layer: they are carried along with log entries,
//! serialized into a portable form, and restored without loss. The portable
//! form is a compact JSON object so that pointers persisted by older
//! versions stay readable.

use serde::{Deserialize, Serialize};

use crate::error::PointerError;

/// A position marker inside a log stream.
///
/// The `offset` is the byte position the pointer refers to, `size` is the
/// size of the underlying log at the time the pointer was taken (used to
/// detect truncation/rollover by the tailing side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogPointer {
    /// Byte offset into the log stream
    #[serde(rename = "o")]
    pub offset: u64,
    /// Size of the log when the pointer was taken
    #[serde(rename = "s")]
    pub size: u64,
}

impl LogPointer {
    /// Create a pointer at the given offset for a log of the given size
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Serialize to the canonical portable form.
    ///
    /// The portable form is compact JSON with fixed key order, e.g.
    /// `{"o":0,"s":1}`. Equal pointers always produce identical portable
    /// forms.
    pub fn to_portable(&self) -> String {
        // Field order is fixed by the struct definition, so this is
        // deterministic.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Restore a pointer from its portable form.
    ///
    /// Fails with [`PointerError::Malformed`] on anything that
    /// [`to_portable`](Self::to_portable) could not have produced.
    pub fn from_portable(portable: &str) -> Result<Self, PointerError> {
        serde_json::from_str(portable)
            .map_err(|e| PointerError::Malformed(format!("{portable:?}: {e}")))
    }
}

impl std::fmt::Display for LogPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.offset, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portable_round_trip() {
        let pointer = LogPointer::new(42, 1024);
        let portable = pointer.to_portable();
        let restored = LogPointer::from_portable(&portable).unwrap();
        assert_eq!(pointer, restored);
        // Canonical form is stable across round trips
        assert_eq!(portable, restored.to_portable());
    }

    #[test]
    fn test_portable_form_is_compact() {
        let pointer = LogPointer::new(0, 1);
        assert_eq!(pointer.to_portable(), r#"{"o":0,"s":1}"#);
    }

    #[test]
    fn test_malformed_portable_form() {
        assert!(matches!(
            LogPointer::from_portable("not json"),
            Err(PointerError::Malformed(_))
        ));
        assert!(matches!(
            LogPointer::from_portable(r#"{"o":1}"#),
            Err(PointerError::Malformed(_))
        ));
        assert!(matches!(
            LogPointer::from_portable(r#"{"o":"x","s":"y"}"#),
            Err(PointerError::Malformed(_))
        ));
    }

    #[test]
    fn test_equal_pointers_equal_portable_forms() {
        let a = LogPointer::new(7, 9);
        let b = LogPointer::new(7, 9);
        assert_eq!(a.to_portable(), b.to_portable());
    }
}
