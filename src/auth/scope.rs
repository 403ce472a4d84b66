//! Scope resolution
//!
//! Computes the program an acting account is restricted to. Pure
//! function of account state; no side effects, no storage access.

use uuid::Uuid;

use super::account::{Account, Role};

/// The program an account is restricted to. `None` means unrestricted
/// (administrators) or no assignment (instructors without a program, who
/// then only reach shared courses).
pub type Scope = Option<Uuid>;

/// Resolve the acting account's scope.
///
/// Administrators are never restricted. Instructors inherit their
/// assigned program; an instructor with a dangling or missing program
/// resolves to no scope.
pub fn resolve_scope(account: &Account) -> Scope {
    match account.role {
        Role::Administrator => None,
        Role::Instructor => account.program_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::crypto::PasswordPolicy;

    #[test]
    fn test_admin_is_unrestricted() {
        let admin = Account::new(
            "root@school.edu",
            "Admin",
            "password123",
            Role::Administrator,
            None,
            &PasswordPolicy::default(),
        )
        .unwrap();

        assert_eq!(resolve_scope(&admin), None);
    }

    #[test]
    fn test_instructor_scoped_to_program() {
        let program_id = Uuid::new_v4();
        let instructor = Account::new(
            "t@school.edu",
            "T",
            "password123",
            Role::Instructor,
            Some(program_id),
            &PasswordPolicy::default(),
        )
        .unwrap();

        assert_eq!(resolve_scope(&instructor), Some(program_id));
    }
}
