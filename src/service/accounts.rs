//! Account operations.
//!
//! Registration runs pre-authentication and is audited under the
//! "system" actor. Everything else on accounts is administrator-only.
//! Authentication failures are deliberately uniform: the caller learns
//! nothing about whether the email exists.

use std::sync::Arc;

use uuid::Uuid;

use crate::audit::{AuditAction, AuditRecord, AuditRecorder};
use crate::auth::{AccessKind, Account, PasswordPolicy, Role};
use crate::model::EntityKind;
use crate::store::EntityStore;

use super::errors::{ServiceError, ServiceResult};
use super::{authorize, required};

#[derive(Debug, Clone)]
pub struct RegisterAccountRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    /// Parsed during normalization; unknown values are `InvalidInput`.
    pub role: String,
    pub program_id: Option<Uuid>,
}

/// Role and program changes; password changes are out of scope here.
#[derive(Debug, Clone)]
pub struct UpdateAccountRequest {
    pub display_name: String,
    pub role: String,
    pub program_id: Option<Uuid>,
}

pub struct AccountService {
    store: Arc<dyn EntityStore>,
    recorder: AuditRecorder,
    password_policy: PasswordPolicy,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        recorder: AuditRecorder,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            recorder,
            password_policy,
        }
    }

    /// Register a new account. Runs without an acting account.
    pub fn register(&self, req: RegisterAccountRequest) -> ServiceResult<Account> {
        let email = required("email", &req.email)?.to_lowercase();
        let display_name = required("display_name", &req.display_name)?;
        let role = parse_role(&req.role)?;

        if role == Role::Instructor {
            let program_id = req
                .program_id
                .ok_or_else(|| ServiceError::from(crate::auth::AuthError::ProgramRequired))?;
            if self.store.program(program_id)?.is_none() {
                return Err(ServiceError::NotFound("Program".to_string()));
            }
        }

        let account = Account::new(
            email,
            display_name,
            &req.password,
            role,
            req.program_id,
            &self.password_policy,
        )?;
        self.store.insert_account(account.clone())?;

        // No actor yet; the record carries the "system" actor name.
        self.recorder.record(
            AuditRecord::new(AuditAction::Create, EntityKind::Account)
                .with_entity_id(account.id)
                .with_description(describe(&account, "registered"))
                .with_after(account.snapshot()),
        );
        Ok(account)
    }

    /// Verify credentials and return the account. Any failure is a
    /// uniform `Unauthorized`.
    pub fn authenticate(&self, email: &str, password: &str) -> ServiceResult<Account> {
        let email = email.trim().to_lowercase();
        let account = self
            .store
            .account_by_email(&email)?
            .ok_or(ServiceError::Unauthorized)?;

        match account.verify_password(password) {
            Ok(true) => Ok(account),
            Ok(false) => Err(ServiceError::Unauthorized),
            Err(err) => Err(err.into()),
        }
    }

    pub fn get(&self, actor: &Account, id: Uuid) -> ServiceResult<Account> {
        authorize(actor, AccessKind::Read, EntityKind::Account, None)?;
        self.store
            .account(id)?
            .ok_or_else(|| ServiceError::NotFound("Account".to_string()))
    }

    pub fn list(&self, actor: &Account) -> ServiceResult<Vec<Account>> {
        authorize(actor, AccessKind::Read, EntityKind::Account, None)?;
        Ok(self.store.list_accounts()?)
    }

    pub fn update(
        &self,
        actor: &Account,
        id: Uuid,
        req: UpdateAccountRequest,
    ) -> ServiceResult<Account> {
        authorize(actor, AccessKind::Write, EntityKind::Account, None)?;

        let before = self
            .store
            .account(id)?
            .ok_or_else(|| ServiceError::NotFound("Account".to_string()))?;

        let role = parse_role(&req.role)?;
        let program_id = match role {
            Role::Administrator => None,
            Role::Instructor => {
                let program_id = req
                    .program_id
                    .ok_or_else(|| ServiceError::from(crate::auth::AuthError::ProgramRequired))?;
                if self.store.program(program_id)?.is_none() {
                    return Err(ServiceError::NotFound("Program".to_string()));
                }
                Some(program_id)
            }
        };

        let mut account = before.clone();
        account.display_name = required("display_name", &req.display_name)?;
        account.role = role;
        account.program_id = program_id;
        self.store.update_account(account.clone())?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Update, EntityKind::Account)
                .with_actor(actor)
                .with_entity_id(account.id)
                .with_description(describe(&account, "updated"))
                .with_before(before.snapshot())
                .with_after(account.snapshot()),
        );
        Ok(account)
    }

    pub fn delete(&self, actor: &Account, id: Uuid) -> ServiceResult<()> {
        authorize(actor, AccessKind::Write, EntityKind::Account, None)?;

        let before = self
            .store
            .account(id)?
            .ok_or_else(|| ServiceError::NotFound("Account".to_string()))?;
        self.store.delete_account(id)?;

        self.recorder.record(
            AuditRecord::new(AuditAction::Delete, EntityKind::Account)
                .with_actor(actor)
                .with_entity_id(id)
                .with_description(describe(&before, "deleted"))
                .with_before(before.snapshot()),
        );
        Ok(())
    }
}

fn parse_role(raw: &str) -> ServiceResult<Role> {
    raw.trim().parse().map_err(ServiceError::InvalidInput)
}

fn describe(account: &Account, verb: &str) -> String {
    format!("Account {}: {} ({})", verb, account.email, account.role)
}
