//! Read side of the audit log. The log itself is a dumb store; the
//! administrator-only restriction lives here.

use std::sync::Arc;

use crate::audit::{AuditLog, AuditQuery, AuditRecord};
use crate::auth::{AccessKind, Account};
use crate::model::EntityKind;

use super::errors::{ServiceError, ServiceResult};
use super::authorize;

pub struct AuditTrailService {
    log: Arc<dyn AuditLog>,
}

impl AuditTrailService {
    pub fn new(log: Arc<dyn AuditLog>) -> Self {
        Self { log }
    }

    /// Query audit records, newest first. Administrator-only.
    pub fn query(&self, actor: &Account, filter: &AuditQuery) -> ServiceResult<Vec<AuditRecord>> {
        authorize(actor, AccessKind::Read, EntityKind::AuditTrail, None)?;
        self.log
            .query(filter)
            .map_err(|err| ServiceError::Internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, MemoryAuditLog};
    use crate::auth::{PasswordPolicy, Role};
    use uuid::Uuid;

    #[test]
    fn test_instructor_cannot_read_trail() {
        let log = Arc::new(MemoryAuditLog::new());
        log.append(&AuditRecord::new(AuditAction::Create, EntityKind::Student))
            .unwrap();
        let service = AuditTrailService::new(log);

        let instructor = Account::new(
            "prof@school.edu",
            "Prof",
            "Sup3rSecret",
            Role::Instructor,
            Some(Uuid::new_v4()),
            &PasswordPolicy::default(),
        )
        .unwrap();
        assert!(matches!(
            service.query(&instructor, &AuditQuery::default()),
            Err(ServiceError::Unauthorized)
        ));

        let admin = Account::new(
            "root@school.edu",
            "Root",
            "Sup3rSecret",
            Role::Administrator,
            None,
            &PasswordPolicy::default(),
        )
        .unwrap();
        assert_eq!(service.query(&admin, &AuditQuery::default()).unwrap().len(), 1);
    }
}
