//! # Mutation Pipeline
//!
//! One service per entity kind, each operation shaped the same way:
//! authorize, normalize, validate, apply, audit. Authorization goes
//! through [`AccessPolicy`] with the acting account passed explicitly;
//! there is no ambient actor state. The audit step is best-effort and
//! can never fail the primary mutation.
//!
//! ## Invariants
//! - SVC-1: Every denial surfaces as `ServiceError::Unauthorized`, never
//!   a panic or a silent no-op.
//! - SVC-2: No state change on any error return.
//! - SVC-3: Every successful create/update/delete emits one audit record
//!   (best-effort).

pub mod accounts;
pub mod audit_trail;
pub mod courses;
pub mod errors;
pub mod grades;
pub mod programs;
pub mod risk_factors;
pub mod students;

use std::sync::Arc;
use uuid::Uuid;

use crate::audit::{AuditLog, AuditRecorder};
use crate::auth::{AccessKind, AccessPolicy, Account, PasswordPolicy};
use crate::model::EntityKind;
use crate::observability::Logger;
use crate::store::EntityStore;

pub use accounts::{AccountService, RegisterAccountRequest, UpdateAccountRequest};
pub use audit_trail::AuditTrailService;
pub use courses::{CourseService, CreateCourseRequest, UpdateCourseRequest};
pub use errors::{ServiceError, ServiceResult};
pub use grades::{CreateGradeRequest, GradeService, UpdateGradeRequest};
pub use programs::{CreateProgramRequest, ProgramService, UpdateProgramRequest};
pub use risk_factors::{
    CreateRiskFactorRequest, RiskFactorService, UpdateRiskFactorRequest,
};
pub use students::{
    CreateStudentRequest, FollowUp, StudentService, StudentUpdateOutcome, UpdateStudentRequest,
};

/// Entry point bundling every per-entity service over one store and one
/// audit log.
pub struct Core {
    pub programs: ProgramService,
    pub students: StudentService,
    pub courses: CourseService,
    pub grades: GradeService,
    pub risk_factors: RiskFactorService,
    pub accounts: AccountService,
    pub audit_trail: AuditTrailService,

    store: Arc<dyn EntityStore>,
}

impl Core {
    pub fn new(
        store: Arc<dyn EntityStore>,
        audit_log: Arc<dyn AuditLog>,
        password_policy: PasswordPolicy,
    ) -> Self {
        let recorder = AuditRecorder::new(audit_log.clone());
        Self {
            programs: ProgramService::new(store.clone(), recorder.clone()),
            students: StudentService::new(store.clone(), recorder.clone()),
            courses: CourseService::new(store.clone(), recorder.clone()),
            grades: GradeService::new(store.clone(), recorder.clone()),
            risk_factors: RiskFactorService::new(store.clone(), recorder.clone()),
            accounts: AccountService::new(store.clone(), recorder, password_policy),
            audit_trail: AuditTrailService::new(audit_log),
            store,
        }
    }

    /// The underlying entity store, for read-side collaborators
    /// (reporting, bulk import).
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }
}

/// Authorize `actor` for `access` on an entity of `kind` owned by
/// `target_program`, logging the denial before returning it.
pub(crate) fn authorize(
    actor: &Account,
    access: AccessKind,
    kind: EntityKind,
    target_program: Option<Uuid>,
) -> ServiceResult<()> {
    if AccessPolicy::can_access(actor, access, kind, target_program) {
        Ok(())
    } else {
        Logger::warn(
            "access_denied",
            &[
                ("access", access.as_str()),
                ("actor", actor.email.as_str()),
                ("entity_kind", kind.as_str()),
            ],
        );
        Err(ServiceError::Unauthorized)
    }
}

/// Trim a required string field, rejecting empty values.
pub(crate) fn required(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional string field, mapping empty values to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check a percentage field is in [0, 100].
pub(crate) fn check_percent(field: &str, value: f64) -> ServiceResult<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::ConstraintViolation(format!(
            "{} must be between 0 and 100",
            field
        )))
    }
}
