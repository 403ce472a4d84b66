//! # Authentication & Authorization
//!
//! Account identities, credential hashing, scope resolution and the
//! role-based access policy. Session and cookie transport live outside
//! the core; every operation receives its acting account explicitly.

mod account;
mod crypto;
mod errors;
mod policy;
mod scope;

pub use account::{Account, Role};
pub use crypto::{hash_password, validate_password, verify_password, PasswordPolicy};
pub use errors::{AuthError, AuthResult};
pub use policy::{AccessKind, AccessPolicy};
pub use scope::{resolve_scope, Scope};
