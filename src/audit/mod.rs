//! Audit subsystem
//!
//! Every mutation is recorded with before/after snapshots so that an
//! administrator can reconstruct who changed what. Recording is
//! best-effort: a failed append is logged and dropped, it never fails
//! the mutation that triggered it.

pub mod errors;
pub mod log;
pub mod record;

use std::sync::Arc;

pub use errors::{AuditError, AuditResult};
pub use log::{AuditLog, FileAuditLog, MemoryAuditLog};
pub use record::{AuditAction, AuditQuery, AuditRecord};

use crate::observability::Logger;

/// Best-effort writer in front of an [`AuditLog`].
#[derive(Clone)]
pub struct AuditRecorder {
    log: Arc<dyn AuditLog>,
}

impl AuditRecorder {
    pub fn new(log: Arc<dyn AuditLog>) -> Self {
        Self { log }
    }

    /// Append a record, swallowing any failure.
    pub fn record(&self, record: AuditRecord) {
        if let Err(err) = self.log.append(&record) {
            Logger::error(
                "audit_write_failed",
                &[
                    ("action", record.action.as_str()),
                    ("entity_kind", record.entity_kind.as_str()),
                    ("error", &err.to_string()),
                ],
            );
        }
    }

    /// The underlying log, for read-side queries.
    pub fn log(&self) -> &Arc<dyn AuditLog> {
        &self.log
    }
}
