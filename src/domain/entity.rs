//! Domain Layer - Core Entity Trait
//!
//! The basic contract for keyed records, plus the error type shared by
//! every layer of the client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

/// Common result type for note operations
pub type NoteResult<T> = Result<T, NoteError>;

/// Client-level errors
///
/// `Conflict` covers update/delete of an id the backend does not know.
/// Callers surface it exactly like `Network`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum NoteError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl NoteError {
    /// Validation failures happen before any backend call
    pub fn is_validation(&self) -> bool {
        matches!(self, NoteError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NoteError::Conflict("note 7 does not exist".to_string());
        assert_eq!(err.to_string(), "Conflict: note 7 does not exist");
        assert!(!err.is_validation());
        assert!(NoteError::Validation("too short".to_string()).is_validation());
    }
}
