//! # Store Errors
//!
//! Failure modes of the entity store. Uniqueness violations surface as
//! typed duplicates, never panics, so callers can map them to
//! user-visible outcomes.

use thiserror::Error;

use crate::model::EntityKind;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated
    #[error("duplicate {kind}: {constraint}")]
    Duplicate {
        kind: EntityKind,
        constraint: String,
    },

    /// Referenced entity does not exist
    #[error("{kind} not found")]
    NotFound { kind: EntityKind },

    /// Underlying storage failed (lock poisoned, I/O)
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn duplicate(kind: EntityKind, constraint: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            constraint: constraint.into(),
        }
    }

    pub fn not_found(kind: EntityKind) -> Self {
        Self::NotFound { kind }
    }
}
