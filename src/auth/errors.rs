//! # Auth Errors
//!
//! Error types for accounts and credentials.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Account and credential errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Generic credential failure (never leaks whether the email exists)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Instructor account registered without a program
    #[error("Instructors must be assigned a program")]
    ProgramRequired,

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 401,
            AuthError::WeakPassword(_) => 400,
            AuthError::ProgramRequired => 400,
            AuthError::HashingFailed => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
