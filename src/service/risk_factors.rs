//! Risk factor operations.
//!
//! Risk factors exist only for Dropout students; that status is checked
//! on create, edit and delete. At most one factor per (student, term,
//! category).

use std::sync::Arc;

use uuid::Uuid;

use crate::audit::{AuditAction, AuditRecord, AuditRecorder};
use crate::auth::{AccessKind, Account};
use crate::model::{EntityKind, RiskCategory, RiskFactor, Student, StudentStatus};
use crate::store::EntityStore;

use super::errors::{ServiceError, ServiceResult};
use super::{authorize, required};

#[derive(Debug, Clone)]
pub struct CreateRiskFactorRequest {
    pub student_id: Uuid,
    /// Parsed during normalization; unknown values are `InvalidInput`.
    pub category: String,
    pub value: String,
    pub term: String,
}

#[derive(Debug, Clone)]
pub struct UpdateRiskFactorRequest {
    pub category: String,
    pub value: String,
    pub term: String,
}

pub struct RiskFactorService {
    store: Arc<dyn EntityStore>,
    recorder: AuditRecorder,
}

impl RiskFactorService {
    pub fn new(store: Arc<dyn EntityStore>, recorder: AuditRecorder) -> Self {
        Self { store, recorder }
    }

    pub fn create(
        &self,
        actor: &Account,
        req: CreateRiskFactorRequest,
    ) -> ServiceResult<RiskFactor> {
        let student = self.student(req.student_id)?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::RiskFactor,
            Some(student.program_id),
        )?;
        check_dropout(&student)?;

        let factor = RiskFactor {
            id: Uuid::new_v4(),
            student_id: student.id,
            category: parse_category(&req.category)?,
            value: required("value", &req.value)?,
            term: required("term", &req.term)?,
        };
        self.store.insert_risk_factor(factor.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Create, EntityKind::RiskFactor)
                .with_actor(actor)
                .with_entity_id(factor.id)
                .with_description(describe(&factor, &student, "recorded"))
                .with_after(factor.snapshot()),
        );
        Ok(factor)
    }

    pub fn get(&self, actor: &Account, id: Uuid) -> ServiceResult<RiskFactor> {
        let factor = self.factor(id)?;
        let student = self.student(factor.student_id)?;
        authorize(
            actor,
            AccessKind::Read,
            EntityKind::RiskFactor,
            Some(student.program_id),
        )?;
        Ok(factor)
    }

    /// Factors of one student, newest term first.
    pub fn for_student(&self, actor: &Account, student_id: Uuid) -> ServiceResult<Vec<RiskFactor>> {
        let student = self.student(student_id)?;
        authorize(
            actor,
            AccessKind::Read,
            EntityKind::RiskFactor,
            Some(student.program_id),
        )?;
        Ok(self.store.risk_factors_for_student(student_id)?)
    }

    pub fn update(
        &self,
        actor: &Account,
        id: Uuid,
        req: UpdateRiskFactorRequest,
    ) -> ServiceResult<RiskFactor> {
        let before = self.factor(id)?;
        let student = self.student(before.student_id)?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::RiskFactor,
            Some(student.program_id),
        )?;
        check_dropout(&student)?;

        let mut factor = before.clone();
        factor.category = parse_category(&req.category)?;
        factor.value = required("value", &req.value)?;
        factor.term = required("term", &req.term)?;
        self.store.update_risk_factor(factor.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Update, EntityKind::RiskFactor)
                .with_actor(actor)
                .with_entity_id(factor.id)
                .with_description(describe(&factor, &student, "updated"))
                .with_before(before.snapshot())
                .with_after(factor.snapshot()),
        );
        Ok(factor)
    }

    pub fn delete(&self, actor: &Account, id: Uuid) -> ServiceResult<()> {
        let before = self.factor(id)?;
        let student = self.student(before.student_id)?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::RiskFactor,
            Some(student.program_id),
        )?;
        check_dropout(&student)?;

        self.store.delete_risk_factor(id)?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Delete, EntityKind::RiskFactor)
                .with_actor(actor)
                .with_entity_id(id)
                .with_description(describe(&before, &student, "deleted"))
                .with_before(before.snapshot()),
        );
        Ok(())
    }

    fn factor(&self, id: Uuid) -> ServiceResult<RiskFactor> {
        self.store
            .risk_factor(id)?
            .ok_or_else(|| ServiceError::NotFound("RiskFactor".to_string()))
    }

    fn student(&self, id: Uuid) -> ServiceResult<Student> {
        self.store
            .student(id)?
            .ok_or_else(|| ServiceError::NotFound("Student".to_string()))
    }
}

fn parse_category(raw: &str) -> ServiceResult<RiskCategory> {
    raw.trim().parse().map_err(ServiceError::InvalidInput)
}

fn check_dropout(student: &Student) -> ServiceResult<()> {
    if student.status == StudentStatus::Dropout {
        Ok(())
    } else {
        Err(ServiceError::ConstraintViolation(
            "risk factors are only available for Dropout students".to_string(),
        ))
    }
}

fn describe(factor: &RiskFactor, student: &Student, verb: &str) -> String {
    format!(
        "Risk factor {}: {} for {} ({})",
        verb,
        factor.category,
        student.full_name(),
        factor.term
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use crate::auth::{PasswordPolicy, Role};
    use crate::model::Program;
    use crate::store::MemoryStore;
    use chrono::Utc;

    struct Fixture {
        service: RiskFactorService,
        store: Arc<MemoryStore>,
        student: Student,
    }

    fn fixture(status: StudentStatus) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let program = Program::new("Systems Eng", None);
        store.insert_program(program.clone()).unwrap();

        let student = Student {
            id: Uuid::new_v4(),
            matricula: "A001".to_string(),
            paternal_surname: "Rivera".to_string(),
            maternal_surname: "Luna".to_string(),
            first_names: "Ana".to_string(),
            gender: None,
            modality: None,
            program_id: program.id,
            semester: 3,
            status,
            created_at: Utc::now(),
        };
        store.insert_student(student.clone()).unwrap();

        Fixture {
            service: RiskFactorService::new(
                store.clone(),
                AuditRecorder::new(Arc::new(MemoryAuditLog::new())),
            ),
            store,
            student,
        }
    }

    fn admin() -> Account {
        Account::new(
            "root@school.edu",
            "Root",
            "Sup3rSecret",
            Role::Administrator,
            None,
            &PasswordPolicy::default(),
        )
        .unwrap()
    }

    fn request(student_id: Uuid) -> CreateRiskFactorRequest {
        CreateRiskFactorRequest {
            student_id,
            category: "Academic".to_string(),
            value: "Repeated failures".to_string(),
            term: "2025-1".to_string(),
        }
    }

    #[test]
    fn test_factor_requires_dropout_status() {
        let fx = fixture(StudentStatus::Active);
        let err = fx
            .service
            .create(&admin(), request(fx.student.id))
            .unwrap_err();
        assert!(matches!(err, ServiceError::ConstraintViolation(_)));
    }

    #[test]
    fn test_duplicate_category_term_rejected() {
        let fx = fixture(StudentStatus::Dropout);
        let actor = admin();
        fx.service.create(&actor, request(fx.student.id)).unwrap();
        let err = fx
            .service
            .create(&actor, request(fx.student.id))
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntity(_)));
    }

    #[test]
    fn test_same_category_other_term_allowed() {
        let fx = fixture(StudentStatus::Dropout);
        let actor = admin();
        fx.service.create(&actor, request(fx.student.id)).unwrap();

        let mut req = request(fx.student.id);
        req.term = "2025-2".to_string();
        assert!(fx.service.create(&actor, req).is_ok());
        assert_eq!(
            fx.store
                .risk_factors_for_student(fx.student.id)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_unknown_category_is_invalid_input() {
        let fx = fixture(StudentStatus::Dropout);
        let mut req = request(fx.student.id);
        req.category = "Weather".to_string();
        let err = fx.service.create(&admin(), req).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
