//! Course operations.
//!
//! Courses without a program are shared: any instructor may read or
//! edit them. A program-owned course is restricted to instructors of
//! that program, and an instructor may only set a course's program to
//! their own (or clear it).

use std::sync::Arc;

use uuid::Uuid;

use crate::audit::{AuditAction, AuditRecord, AuditRecorder};
use crate::auth::{AccessKind, AccessPolicy, Account};
use crate::model::{Course, EntityKind};
use crate::store::EntityStore;

use super::errors::{ServiceError, ServiceResult};
use super::{authorize, required};

#[derive(Debug, Clone)]
pub struct CreateCourseRequest {
    pub name: String,
    pub semester: u8,
    pub program_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdateCourseRequest {
    pub name: String,
    pub semester: u8,
    pub program_id: Option<Uuid>,
}

pub struct CourseService {
    store: Arc<dyn EntityStore>,
    recorder: AuditRecorder,
}

impl CourseService {
    pub fn new(store: Arc<dyn EntityStore>, recorder: AuditRecorder) -> Self {
        Self { store, recorder }
    }

    pub fn create(&self, actor: &Account, req: CreateCourseRequest) -> ServiceResult<Course> {
        authorize(actor, AccessKind::Write, EntityKind::Course, req.program_id)?;

        let name = required("name", &req.name)?;
        if let Some(program_id) = req.program_id {
            if self.store.program(program_id)?.is_none() {
                return Err(ServiceError::NotFound("Program".to_string()));
            }
        }

        let course = Course {
            id: Uuid::new_v4(),
            name,
            semester: req.semester,
            program_id: req.program_id,
        };
        self.store.insert_course(course.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Create, EntityKind::Course)
                .with_actor(actor)
                .with_entity_id(course.id)
                .with_description(format!("Course created: {}", course.name))
                .with_after(course.snapshot()),
        );
        Ok(course)
    }

    pub fn get(&self, actor: &Account, id: Uuid) -> ServiceResult<Course> {
        let course = self
            .store
            .course(id)?
            .ok_or_else(|| ServiceError::NotFound("Course".to_string()))?;
        authorize(actor, AccessKind::Read, EntityKind::Course, course.program_id)?;
        Ok(course)
    }

    /// List courses the actor may read. Shared courses are visible to
    /// everyone.
    pub fn list(&self, actor: &Account) -> ServiceResult<Vec<Course>> {
        let mut courses = self.store.list_courses()?;
        courses.retain(|c| {
            AccessPolicy::can_access(actor, AccessKind::Read, EntityKind::Course, c.program_id)
        });
        Ok(courses)
    }

    pub fn update(
        &self,
        actor: &Account,
        id: Uuid,
        req: UpdateCourseRequest,
    ) -> ServiceResult<Course> {
        let before = self
            .store
            .course(id)?
            .ok_or_else(|| ServiceError::NotFound("Course".to_string()))?;
        authorize(actor, AccessKind::Write, EntityKind::Course, before.program_id)?;
        // The new owner must also be in scope: own program or shared.
        authorize(actor, AccessKind::Write, EntityKind::Course, req.program_id)?;

        if let Some(program_id) = req.program_id {
            if self.store.program(program_id)?.is_none() {
                return Err(ServiceError::NotFound("Program".to_string()));
            }
        }

        let mut course = before.clone();
        course.name = required("name", &req.name)?;
        course.semester = req.semester;
        course.program_id = req.program_id;
        self.store.update_course(course.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Update, EntityKind::Course)
                .with_actor(actor)
                .with_entity_id(course.id)
                .with_description(format!("Course updated: {}", course.name))
                .with_before(before.snapshot())
                .with_after(course.snapshot()),
        );
        Ok(course)
    }

    /// Delete a course; its grades go with it.
    pub fn delete(&self, actor: &Account, id: Uuid) -> ServiceResult<()> {
        let before = self
            .store
            .course(id)?
            .ok_or_else(|| ServiceError::NotFound("Course".to_string()))?;
        authorize(actor, AccessKind::Write, EntityKind::Course, before.program_id)?;

        self.store.delete_course(id)?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Delete, EntityKind::Course)
                .with_actor(actor)
                .with_entity_id(id)
                .with_description(format!("Course deleted: {}", before.name))
                .with_before(before.snapshot()),
        );
        Ok(())
    }
}
