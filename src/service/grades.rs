//! Grade operations.
//!
//! A grade ties a student to a course for one term. Score and
//! attendance are percentages; the course must belong to the student's
//! program or be shared. At most one grade per (student, course, term).

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::audit::{AuditAction, AuditRecord, AuditRecorder};
use crate::auth::{AccessKind, AccessPolicy, Account};
use crate::model::{Course, EntityKind, Grade, Student};
use crate::store::EntityStore;

use super::errors::{ServiceError, ServiceResult};
use super::{authorize, check_percent, required};

#[derive(Debug, Clone)]
pub struct CreateGradeRequest {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub score: f64,
    pub attendance: f64,
    pub term: String,
}

/// Student and course are fixed at creation; only the measured fields
/// and the term can change.
#[derive(Debug, Clone)]
pub struct UpdateGradeRequest {
    pub score: f64,
    pub attendance: f64,
    pub term: String,
}

pub struct GradeService {
    store: Arc<dyn EntityStore>,
    recorder: AuditRecorder,
}

impl GradeService {
    pub fn new(store: Arc<dyn EntityStore>, recorder: AuditRecorder) -> Self {
        Self { store, recorder }
    }

    pub fn create(&self, actor: &Account, req: CreateGradeRequest) -> ServiceResult<Grade> {
        let student = self.student(req.student_id)?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::Grade,
            Some(student.program_id),
        )?;

        let term = required("term", &req.term)?;
        check_percent("score", req.score)?;
        check_percent("attendance", req.attendance)?;

        let course = self.course(req.course_id)?;
        check_course_program(&course, &student)?;

        let grade = Grade {
            id: Uuid::new_v4(),
            student_id: student.id,
            course_id: course.id,
            score: req.score,
            attendance: req.attendance,
            term,
        };
        self.store.insert_grade(grade.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Create, EntityKind::Grade)
                .with_actor(actor)
                .with_entity_id(grade.id)
                .with_description(describe(&grade, &student, &course, "recorded"))
                .with_after(grade.snapshot()),
        );
        Ok(grade)
    }

    pub fn get(&self, actor: &Account, id: Uuid) -> ServiceResult<Grade> {
        let grade = self.grade(id)?;
        let student = self.student(grade.student_id)?;
        authorize(
            actor,
            AccessKind::Read,
            EntityKind::Grade,
            Some(student.program_id),
        )?;
        Ok(grade)
    }

    /// Grades of one student, scope-checked once against the student.
    pub fn for_student(&self, actor: &Account, student_id: Uuid) -> ServiceResult<Vec<Grade>> {
        let student = self.student(student_id)?;
        authorize(
            actor,
            AccessKind::Read,
            EntityKind::Grade,
            Some(student.program_id),
        )?;
        Ok(self.store.grades_for_student(student_id)?)
    }

    /// All grades the actor may read.
    pub fn list(&self, actor: &Account) -> ServiceResult<Vec<Grade>> {
        let programs: HashMap<Uuid, Uuid> = self
            .store
            .list_students()?
            .into_iter()
            .map(|s| (s.id, s.program_id))
            .collect();

        let mut grades = self.store.list_grades()?;
        grades.retain(|g| {
            programs.get(&g.student_id).is_some_and(|program_id| {
                AccessPolicy::can_access(
                    actor,
                    AccessKind::Read,
                    EntityKind::Grade,
                    Some(*program_id),
                )
            })
        });
        Ok(grades)
    }

    pub fn update(
        &self,
        actor: &Account,
        id: Uuid,
        req: UpdateGradeRequest,
    ) -> ServiceResult<Grade> {
        let before = self.grade(id)?;
        let student = self.student(before.student_id)?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::Grade,
            Some(student.program_id),
        )?;

        let term = required("term", &req.term)?;
        check_percent("score", req.score)?;
        check_percent("attendance", req.attendance)?;

        let mut grade = before.clone();
        grade.score = req.score;
        grade.attendance = req.attendance;
        grade.term = term;
        self.store.update_grade(grade.clone())?;

        let course = self.course(grade.course_id)?;
        self.recorder.record(
            AuditRecord::new(AuditAction::Update, EntityKind::Grade)
                .with_actor(actor)
                .with_entity_id(grade.id)
                .with_description(describe(&grade, &student, &course, "updated"))
                .with_before(before.snapshot())
                .with_after(grade.snapshot()),
        );
        Ok(grade)
    }

    pub fn delete(&self, actor: &Account, id: Uuid) -> ServiceResult<()> {
        let before = self.grade(id)?;
        let student = self.student(before.student_id)?;
        authorize(
            actor,
            AccessKind::Write,
            EntityKind::Grade,
            Some(student.program_id),
        )?;

        self.store.delete_grade(id)?;

        let course = self.course(before.course_id)?;
        self.recorder.record(
            AuditRecord::new(AuditAction::Delete, EntityKind::Grade)
                .with_actor(actor)
                .with_entity_id(id)
                .with_description(describe(&before, &student, &course, "deleted"))
                .with_before(before.snapshot()),
        );
        Ok(())
    }

    fn grade(&self, id: Uuid) -> ServiceResult<Grade> {
        self.store
            .grade(id)?
            .ok_or_else(|| ServiceError::NotFound("Grade".to_string()))
    }

    fn student(&self, id: Uuid) -> ServiceResult<Student> {
        self.store
            .student(id)?
            .ok_or_else(|| ServiceError::NotFound("Student".to_string()))
    }

    fn course(&self, id: Uuid) -> ServiceResult<Course> {
        self.store
            .course(id)?
            .ok_or_else(|| ServiceError::NotFound("Course".to_string()))
    }
}

fn check_course_program(course: &Course, student: &Student) -> ServiceResult<()> {
    match course.program_id {
        None => Ok(()),
        Some(p) if p == student.program_id => Ok(()),
        Some(_) => Err(ServiceError::ConstraintViolation(
            "course does not belong to the student's program".to_string(),
        )),
    }
}

fn describe(grade: &Grade, student: &Student, course: &Course, verb: &str) -> String {
    format!(
        "Grade {}: {} in {}, score {} ({})",
        verb,
        student.full_name(),
        course.name,
        grade.score,
        grade.term
    )
}
