//! Runtime configuration
//!
//! Defaults run everything in memory; setting an audit log path turns
//! on durable JSON-lines auditing.

use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::{AuditLog, AuditResult, FileAuditLog, MemoryAuditLog};
use crate::auth::PasswordPolicy;

#[derive(Debug, Clone, Default)]
pub struct RegistraConfig {
    /// Where to persist audit records. `None` keeps them in memory.
    pub audit_log_path: Option<PathBuf>,
    pub password_policy: PasswordPolicy,
}

impl RegistraConfig {
    /// Config with a durable audit log at `path`.
    pub fn with_audit_file(path: impl Into<PathBuf>) -> Self {
        Self {
            audit_log_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Open the configured audit log.
    pub fn open_audit_log(&self) -> AuditResult<Arc<dyn AuditLog>> {
        match &self.audit_log_path {
            Some(path) => Ok(Arc::new(FileAuditLog::open(path)?)),
            None => Ok(Arc::new(MemoryAuditLog::new())),
        }
    }
}
