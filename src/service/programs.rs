//! Program operations. Administrator-only for both reads and writes.

use std::sync::Arc;

use crate::audit::{AuditAction, AuditRecord, AuditRecorder};
use crate::auth::{AccessKind, Account};
use crate::model::{EntityKind, Program};
use crate::store::EntityStore;
use uuid::Uuid;

use super::errors::{ServiceError, ServiceResult};
use super::{authorize, optional, required};

#[derive(Debug, Clone)]
pub struct CreateProgramRequest {
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateProgramRequest {
    pub name: String,
    pub code: Option<String>,
}

pub struct ProgramService {
    store: Arc<dyn EntityStore>,
    recorder: AuditRecorder,
}

impl ProgramService {
    pub fn new(store: Arc<dyn EntityStore>, recorder: AuditRecorder) -> Self {
        Self { store, recorder }
    }

    pub fn create(&self, actor: &Account, req: CreateProgramRequest) -> ServiceResult<Program> {
        authorize(actor, AccessKind::Write, EntityKind::Program, None)?;

        let name = required("name", &req.name)?;
        let code = optional(req.code.as_deref());

        let program = Program::new(name, code);
        self.store.insert_program(program.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Create, EntityKind::Program)
                .with_actor(actor)
                .with_entity_id(program.id)
                .with_description(describe(&program, "created"))
                .with_after(program.snapshot()),
        );
        Ok(program)
    }

    pub fn get(&self, actor: &Account, id: Uuid) -> ServiceResult<Program> {
        authorize(actor, AccessKind::Read, EntityKind::Program, None)?;
        self.store
            .program(id)?
            .ok_or_else(|| ServiceError::NotFound("Program".to_string()))
    }

    pub fn list(&self, actor: &Account) -> ServiceResult<Vec<Program>> {
        authorize(actor, AccessKind::Read, EntityKind::Program, None)?;
        Ok(self.store.list_programs()?)
    }

    pub fn update(
        &self,
        actor: &Account,
        id: Uuid,
        req: UpdateProgramRequest,
    ) -> ServiceResult<Program> {
        authorize(actor, AccessKind::Write, EntityKind::Program, None)?;

        let before = self
            .store
            .program(id)?
            .ok_or_else(|| ServiceError::NotFound("Program".to_string()))?;

        let mut program = before.clone();
        program.name = required("name", &req.name)?;
        program.code = optional(req.code.as_deref());
        self.store.update_program(program.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Update, EntityKind::Program)
                .with_actor(actor)
                .with_entity_id(program.id)
                .with_description(describe(&program, "updated"))
                .with_before(before.snapshot())
                .with_after(program.snapshot()),
        );
        Ok(program)
    }

    /// Delete a program. Its courses are detached, not removed.
    pub fn delete(&self, actor: &Account, id: Uuid) -> ServiceResult<()> {
        authorize(actor, AccessKind::Write, EntityKind::Program, None)?;

        let before = self
            .store
            .program(id)?
            .ok_or_else(|| ServiceError::NotFound("Program".to_string()))?;
        self.store.delete_program(id)?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Delete, EntityKind::Program)
                .with_actor(actor)
                .with_entity_id(id)
                .with_description(describe(&before, "deleted"))
                .with_before(before.snapshot()),
        );
        Ok(())
    }
}

fn describe(program: &Program, verb: &str) -> String {
    match &program.code {
        Some(code) => format!("Program {}: {} (code {})", verb, program.name, code),
        None => format!("Program {}: {}", verb, program.name),
    }
}
