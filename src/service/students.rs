//! Student operations.
//!
//! Instructors operate only on students of their own program; moving a
//! student between programs additionally requires both source and
//! destination to be in scope. Setting status to Dropout while the
//! student has no risk factors yields an advisory follow-up signal; the
//! record persists either way.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditRecord, AuditRecorder};
use crate::auth::{AccessKind, AccessPolicy, Account};
use crate::model::{EntityKind, Student, StudentStatus};
use crate::store::EntityStore;

use super::errors::{ServiceError, ServiceResult};
use super::{authorize, optional, required};

#[derive(Debug, Clone)]
pub struct CreateStudentRequest {
    pub matricula: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub first_names: String,
    pub gender: Option<String>,
    pub modality: Option<String>,
    pub program_id: Uuid,
    pub semester: u8,
    /// Parsed during normalization; unknown values are `InvalidInput`.
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct UpdateStudentRequest {
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub first_names: String,
    pub gender: Option<String>,
    pub modality: Option<String>,
    pub program_id: Uuid,
    pub semester: u8,
    pub status: String,
}

/// Advisory routing signal for the caller; never blocks the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// The student is a Dropout with no recorded risk factors; the
    /// caller should prompt for at least one.
    RiskFactorRequired,
}

#[derive(Debug, Clone)]
pub struct StudentUpdateOutcome {
    pub student: Student,
    pub follow_up: Option<FollowUp>,
}

pub struct StudentService {
    store: Arc<dyn EntityStore>,
    recorder: AuditRecorder,
}

impl StudentService {
    pub fn new(store: Arc<dyn EntityStore>, recorder: AuditRecorder) -> Self {
        Self { store, recorder }
    }

    pub fn create(&self, actor: &Account, req: CreateStudentRequest) -> ServiceResult<Student> {
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::Student,
            Some(req.program_id),
        )?;

        let status = parse_status(&req.status)?;
        if self.store.program(req.program_id)?.is_none() {
            return Err(ServiceError::NotFound("Program".to_string()));
        }

        let student = Student {
            id: Uuid::new_v4(),
            matricula: required("matricula", &req.matricula)?,
            paternal_surname: required("paternal_surname", &req.paternal_surname)?,
            maternal_surname: required("maternal_surname", &req.maternal_surname)?,
            first_names: required("first_names", &req.first_names)?,
            gender: optional(req.gender.as_deref()),
            modality: optional(req.modality.as_deref()),
            program_id: req.program_id,
            semester: req.semester,
            status,
            created_at: Utc::now(),
        };
        self.store.insert_student(student.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Create, EntityKind::Student)
                .with_actor(actor)
                .with_entity_id(student.id)
                .with_description(describe(&student, "created"))
                .with_after(student.snapshot()),
        );
        Ok(student)
    }

    pub fn get(&self, actor: &Account, id: Uuid) -> ServiceResult<Student> {
        let student = self
            .store
            .student(id)?
            .ok_or_else(|| ServiceError::NotFound("Student".to_string()))?;
        authorize(
            actor,
            AccessKind::Read,
            EntityKind::Student,
            Some(student.program_id),
        )?;
        Ok(student)
    }

    /// List students the actor may read. Instructors see only their own
    /// program; administrators see everything.
    pub fn list(&self, actor: &Account) -> ServiceResult<Vec<Student>> {
        let mut students = self.store.list_students()?;
        students.retain(|s| {
            AccessPolicy::can_access(
                actor,
                AccessKind::Read,
                EntityKind::Student,
                Some(s.program_id),
            )
        });
        Ok(students)
    }

    pub fn update(
        &self,
        actor: &Account,
        id: Uuid,
        req: UpdateStudentRequest,
    ) -> ServiceResult<StudentUpdateOutcome> {
        let before = self
            .store
            .student(id)?
            .ok_or_else(|| ServiceError::NotFound("Student".to_string()))?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::Student,
            Some(before.program_id),
        )?;

        if req.program_id != before.program_id {
            if !AccessPolicy::can_reassign_student(actor, before.program_id, req.program_id) {
                return Err(ServiceError::Unauthorized);
            }
            if self.store.program(req.program_id)?.is_none() {
                return Err(ServiceError::NotFound("Program".to_string()));
            }
        }

        let status = parse_status(&req.status)?;

        let mut student = before.clone();
        student.paternal_surname = required("paternal_surname", &req.paternal_surname)?;
        student.maternal_surname = required("maternal_surname", &req.maternal_surname)?;
        student.first_names = required("first_names", &req.first_names)?;
        student.gender = optional(req.gender.as_deref());
        student.modality = optional(req.modality.as_deref());
        student.program_id = req.program_id;
        student.semester = req.semester;
        student.status = status;
        self.store.update_student(student.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Update, EntityKind::Student)
                .with_actor(actor)
                .with_entity_id(student.id)
                .with_description(describe(&student, "updated"))
                .with_before(before.snapshot())
                .with_after(student.snapshot()),
        );

        let follow_up = if student.status == StudentStatus::Dropout
            && self.store.risk_factors_for_student(student.id)?.is_empty()
        {
            Some(FollowUp::RiskFactorRequired)
        } else {
            None
        };
        Ok(StudentUpdateOutcome { student, follow_up })
    }

    /// Delete a student; its grades and risk factors go with it.
    pub fn delete(&self, actor: &Account, id: Uuid) -> ServiceResult<()> {
        let before = self
            .store
            .student(id)?
            .ok_or_else(|| ServiceError::NotFound("Student".to_string()))?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::Student,
            Some(before.program_id),
        )?;

        self.store.delete_student(id)?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Delete, EntityKind::Student)
                .with_actor(actor)
                .with_entity_id(id)
                .with_description(describe(&before, "deleted"))
                .with_before(before.snapshot()),
        );
        Ok(())
    }
}

fn parse_status(raw: &str) -> ServiceResult<StudentStatus> {
    raw.trim().parse().map_err(ServiceError::InvalidInput)
}

fn describe(student: &Student, verb: &str) -> String {
    format!(
        "Student {}: {} (matricula {})",
        verb,
        student.full_name(),
        student.matricula
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use crate::auth::{PasswordPolicy, Role};
    use crate::model::Program;
    use crate::store::MemoryStore;

    struct Fixture {
        service: StudentService,
        store: Arc<MemoryStore>,
        log: Arc<MemoryAuditLog>,
        program: Program,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let log = Arc::new(MemoryAuditLog::new());
        let program = Program::new("Systems Eng", Some("SE".to_string()));
        store.insert_program(program.clone()).unwrap();
        Fixture {
            service: StudentService::new(store.clone(), AuditRecorder::new(log.clone())),
            store,
            log,
            program,
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

    fn instructor(program_id: Uuid) -> Account {
        Account::new(
            "prof@school.edu",
            "Prof",
            "Sup3rSecret",
            Role::Instructor,
            Some(program_id),
            &PasswordPolicy::default(),
        )
        .unwrap()
    }

    fn create_request(program_id: Uuid) -> CreateStudentRequest {
        CreateStudentRequest {
            matricula: "A001".to_string(),
            paternal_surname: "Rivera".to_string(),
            maternal_surname: "Luna".to_string(),
            first_names: "Ana".to_string(),
            gender: None,
            modality: None,
            program_id,
            semester: 3,
            status: "Active".to_string(),
        }
    }

    #[test]
    fn test_instructor_creates_in_own_program() {
        let fx = fixture();
        let actor = instructor(fx.program.id);
        let student = fx.service.create(&actor, create_request(fx.program.id)).unwrap();
        assert_eq!(student.matricula, "A001");
        assert_eq!(fx.log.len(), 1);
    }

    #[test]
    fn test_instructor_denied_outside_scope() {
        let fx = fixture();
        let other = Program::new("Industrial Eng", None);
        fx.store.insert_program(other.clone()).unwrap();

        let actor = instructor(other.id);
        let err = fx
            .service
            .create(&actor, create_request(fx.program.id))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        assert!(fx.log.is_empty());
    }

    #[test]
    fn test_duplicate_matricula_rejected() {
        let fx = fixture();
        let actor = admin();
        fx.service.create(&actor, create_request(fx.program.id)).unwrap();
        let err = fx
            .service
            .create(&actor, create_request(fx.program.id))
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntity(_)));
    }

    #[test]
    fn test_unknown_status_is_invalid_input() {
        let fx = fixture();
        let mut req = create_request(fx.program.id);
        req.status = "Enrolled".to_string();
        let err = fx.service.create(&admin(), req).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn test_dropout_without_factors_signals_follow_up() {
        let fx = fixture();
        let actor = admin();
        let student = fx.service.create(&actor, create_request(fx.program.id)).unwrap();

        let outcome = fx
            .service
            .update(
                &actor,
                student.id,
                UpdateStudentRequest {
                    paternal_surname: student.paternal_surname.clone(),
                    maternal_surname: student.maternal_surname.clone(),
                    first_names: student.first_names.clone(),
                    gender: None,
                    modality: None,
                    program_id: student.program_id,
                    semester: student.semester,
                    status: "Dropout".to_string(),
                },
            )
            .unwrap();

        assert_eq!(outcome.student.status, StudentStatus::Dropout);
        assert_eq!(outcome.follow_up, Some(FollowUp::RiskFactorRequired));
    }

    #[test]
    fn test_instructor_cannot_move_student_out_of_program() {
        let fx = fixture();
        let other = Program::new("Industrial Eng", None);
        fx.store.insert_program(other.clone()).unwrap();

        let actor = instructor(fx.program.id);
        let student = fx.service.create(&actor, create_request(fx.program.id)).unwrap();

        let err = fx
            .service
            .update(
                &actor,
                student.id,
                UpdateStudentRequest {
                    paternal_surname: student.paternal_surname.clone(),
                    maternal_surname: student.maternal_surname.clone(),
                    first_names: student.first_names.clone(),
                    gender: None,
                    modality: None,
                    program_id: other.id,
                    semester: student.semester,
                    status: "Active".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
    }

    #[test]
    fn test_list_is_scoped_for_instructors() {
        let fx = fixture();
        let other = Program::new("Industrial Eng", None);
        fx.store.insert_program(other.clone()).unwrap();

        let actor = admin();
        fx.service.create(&actor, create_request(fx.program.id)).unwrap();
        let mut req = create_request(other.id);
        req.matricula = "B001".to_string();
        fx.service.create(&actor, req).unwrap();

        let scoped = fx.service.list(&instructor(fx.program.id)).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].matricula, "A001");

        assert_eq!(fx.service.list(&actor).unwrap().len(), 2);
    }
}
