//! # Service Errors
//!
//! Caller-visible outcomes of the mutation pipeline. Every variant maps
//! to an HTTP status code so the presentation layer can answer without
//! inspecting the error further. Audit write failures are deliberately
//! absent here: they never reach the caller.

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-visible service errors
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Access policy denied the operation
    #[error("Not authorized to perform this operation")]
    Unauthorized,

    /// Missing or malformed input field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Domain rule broken (out-of-range score, wrong status, ...)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Uniqueness constraint violated
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal failure (storage, hashing)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 403,
            ServiceError::InvalidInput(_) => 400,
            ServiceError::ConstraintViolation(_) => 422,
            ServiceError::DuplicateEntity(_) => 409,
            ServiceError::NotFound(_) => 404,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { kind, constraint } => {
                ServiceError::DuplicateEntity(format!("{} ({})", kind, constraint))
            }
            StoreError::NotFound { kind } => ServiceError::NotFound(kind.to_string()),
            StoreError::Storage(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ServiceError::Unauthorized,
            AuthError::WeakPassword(msg) => ServiceError::InvalidInput(msg),
            AuthError::ProgramRequired => {
                ServiceError::InvalidInput("instructors must be assigned a program".to_string())
            }
            AuthError::HashingFailed => {
                ServiceError::Internal("password hashing failed".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ServiceError::Unauthorized.status_code(), 403);
        assert_eq!(ServiceError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(
            ServiceError::ConstraintViolation("x".into()).status_code(),
            422
        );
        assert_eq!(ServiceError::DuplicateEntity("x".into()).status_code(), 409);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_store_duplicate_maps_to_duplicate_entity() {
        let err: ServiceError =
            StoreError::duplicate(EntityKind::Student, "matricula A001").into();
        assert!(matches!(err, ServiceError::DuplicateEntity(_)));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_storage_failure_is_internal() {
        let err: ServiceError = StoreError::Storage("lock poisoned".into()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(!err.is_client_error());
    }
}
