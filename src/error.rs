//! Error types for genebits.
//!
//! Every fallible operation in the crate returns [`Result`], backed by a single
//! `thiserror` enum. Nothing in the crate panics on caller input.

use thiserror::Error;

/// The main error type for gene bit-set operations.
#[derive(Error, Debug)]
pub enum GeneBitsError {
    /// Gene id outside `[0, capacity]`
    #[error("Gene id {id} out of range: capacity is {capacity}")]
    IdOutOfRange {
        /// The id that was addressed
        id: usize,
        /// Maximum representable id
        capacity: usize,
    },

    /// Operand word counts are incompatible
    #[error("Capacity mismatch: operation needs {required} words, only {available} available")]
    CapacityMismatch {
        /// Words required by the operation
        required: usize,
        /// Words the operand actually has
        available: usize,
    },

    /// A name or slot index did not resolve
    #[error("Bit set not found: {0}")]
    NotFound(String),

    /// A prefix query matched more than one named set
    #[error("Ambiguous bit set name '{query}': {matches} sets match")]
    AmbiguousName {
        /// The prefix that was looked up
        query: String,
        /// Number of occupied slots whose name starts with the query
        matches: usize,
    },

    /// No empty registry slot remains
    #[error("Too many named bit sets: registry holds at most {max}")]
    RegistryFull {
        /// Registry capacity
        max: usize,
    },

    /// Attempt to remove or rename a built-in set
    #[error("Can't modify built-in bit set [{index}] '{name}'")]
    ProtectedSlot {
        /// 1-based slot index
        index: usize,
        /// Name held by the slot
        name: String,
    },

    /// The addressed slot holds no set
    #[error("Registry slot {0} is empty")]
    EmptySlot(usize),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl GeneBitsError {
    /// True for both "no match" and "ambiguous match".
    ///
    /// Callers that want the legacy behaviour, where an ambiguous prefix is
    /// reported exactly like a missing name, can branch on this instead of
    /// matching the two variants.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            GeneBitsError::NotFound(_) | GeneBitsError::AmbiguousName { .. }
        )
    }
}

/// A specialized `Result` type for genebits operations.
pub type Result<T> = std::result::Result<T, GeneBitsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeneBitsError::IdOutOfRange {
            id: 200,
            capacity: 127,
        };
        assert_eq!(err.to_string(), "Gene id 200 out of range: capacity is 127");

        let err = GeneBitsError::RegistryFull { max: 300 };
        assert_eq!(
            err.to_string(),
            "Too many named bit sets: registry holds at most 300"
        );
    }

    #[test]
    fn test_lookup_failure() {
        assert!(GeneBitsError::NotFound("x".into()).is_lookup_failure());
        assert!(GeneBitsError::AmbiguousName {
            query: "a".into(),
            matches: 2
        }
        .is_lookup_failure());
        assert!(!GeneBitsError::EmptySlot(3).is_lookup_failure());
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<usize> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}
