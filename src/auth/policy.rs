//! # Access Policy
//!
//! Role- and scope-based allow/deny decisions for every entity kind.
//!
//! ## Invariants
//! - POLICY-1: Deny by default; every allowed combination is explicit.
//! - POLICY-2: Administrators are unrestricted.
//! - POLICY-3: Instructors reach Students, Courses, Grades and
//!   RiskFactors only inside their scope; courses with no program are
//!   shared with every instructor.
//! - POLICY-4: Program, Account and audit-trail records are
//!   administrator-only.

use uuid::Uuid;

use super::account::{Account, Role};
use super::scope::resolve_scope;
use crate::model::EntityKind;

/// Kind of access being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
        }
    }
}

/// The access policy. Stateless; every decision is a pure function of
/// the acting account and the target.
pub struct AccessPolicy;

impl AccessPolicy {
    /// Decide whether `account` may perform `access` on an entity of
    /// `kind` owned by `target_program`.
    ///
    /// `target_program` is the program the target entity belongs to:
    /// always present for students (and the grades/risk factors hanging
    /// off them), optional for courses (a `None` course is shared).
    pub fn can_access(
        account: &Account,
        access: AccessKind,
        kind: EntityKind,
        target_program: Option<Uuid>,
    ) -> bool {
        match account.role {
            Role::Administrator => true,
            Role::Instructor => {
                let _ = access; // instructors get read and write symmetrically
                let scope = resolve_scope(account);
                match kind {
                    EntityKind::Program | EntityKind::Account | EntityKind::AuditTrail => false,
                    EntityKind::Course => match target_program {
                        // Shared courses are open to every instructor.
                        None => true,
                        Some(p) => scope == Some(p),
                    },
                    EntityKind::Student | EntityKind::Grade | EntityKind::RiskFactor => {
                        match target_program {
                            Some(p) => scope == Some(p),
                            None => false,
                        }
                    }
                }
            }
        }
    }

    /// Decide whether `account` may move a student from one program to
    /// another. Instructors may only move students within their own
    /// program; administrators are unrestricted.
    pub fn can_reassign_student(account: &Account, from: Uuid, to: Uuid) -> bool {
        match account.role {
            Role::Administrator => true,
            Role::Instructor => {
                let scope = resolve_scope(account);
                scope == Some(from) && scope == Some(to)
            }
        }
    }
}
