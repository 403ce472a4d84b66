//! # Accounts
//!
//! Acting identities for every core operation. Role and owning program
//! are set at registration and rarely change afterwards; the access
//! policy derives everything from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::crypto::{hash_password, validate_password, verify_password, PasswordPolicy};
use super::errors::{AuthError, AuthResult};
use crate::model::Snapshot;

/// Account role. Administrators are unrestricted; instructors are scoped
/// to their assigned program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Instructor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Instructor => "instructor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Role::Administrator),
            "instructor" => Ok(Role::Instructor),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// An account that can act on the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,

    /// Unique, lowercased email address
    pub email: String,

    pub display_name: String,

    /// Argon2id hash, never plaintext
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password_hash: String,

    pub role: Role,

    /// Owning program; required for instructors, ignored for
    /// administrators.
    pub program_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create an account with a freshly hashed password.
    ///
    /// Instructors must carry a program; administrators never do (any
    /// supplied program is discarded).
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        password: &str,
        role: Role,
        program_id: Option<Uuid>,
        policy: &PasswordPolicy,
    ) -> AuthResult<Self> {
        validate_password(password, policy)?;

        let program_id = match role {
            Role::Administrator => None,
            Role::Instructor => Some(program_id.ok_or(AuthError::ProgramRequired)?),
        };

        Ok(Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: display_name.into(),
            password_hash: hash_password(password)?,
            role,
            program_id,
            created_at: Utc::now(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }

    /// Verify a password against this account's stored hash
    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("role", self.role)
            .field_opt("program_id", self.program_id.as_ref())
    }
}
