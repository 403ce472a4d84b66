//! Audit records
//!
//! One immutable entry per mutation: who, what, the human-readable why,
//! and before/after snapshots. Records are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::auth::Account;
use crate::model::{EntityKind, Snapshot};

/// Mutation kind captured by an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single append-only audit entry.
///
/// The actor's display name is cached at write time so the record stays
/// meaningful if the account is deleted later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,

    /// Acting account, if any (None for pre-auth operations such as
    /// registration, or once the account has been deleted).
    pub actor_id: Option<Uuid>,

    /// Actor display name cached at write time; "system" when no actor.
    pub actor_name: String,

    pub action: AuditAction,
    pub entity_kind: EntityKind,
    pub entity_id: Option<Uuid>,

    /// Human-readable summary of the change.
    pub description: String,

    /// Entity state before the mutation (UPDATE/DELETE).
    pub before: Option<Snapshot>,

    /// Entity state after the mutation (CREATE/UPDATE).
    pub after: Option<Snapshot>,

    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(action: AuditAction, entity_kind: EntityKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: None,
            actor_name: "system".to_string(),
            action,
            entity_kind,
            entity_id: None,
            description: String::new(),
            before: None,
            after: None,
            recorded_at: Utc::now(),
        }
    }

    /// Cache the acting account's id and display name.
    pub fn with_actor(mut self, actor: &Account) -> Self {
        self.actor_id = Some(actor.id);
        self.actor_name = actor.display_name.clone();
        self
    }

    pub fn with_entity_id(mut self, id: Uuid) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_before(mut self, snapshot: Snapshot) -> Self {
        self.before = Some(snapshot);
        self
    }

    pub fn with_after(mut self, snapshot: Snapshot) -> Self {
        self.after = Some(snapshot);
        self
    }
}

/// Filter for reading back the audit trail.
#[derive(Debug, Clone)]
pub struct AuditQuery {
    pub entity_kind: Option<EntityKind>,
    pub entity_id: Option<Uuid>,

    /// Maximum number of records returned, newest first.
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            entity_kind: None,
            entity_id: None,
            limit: 500,
        }
    }
}

impl AuditQuery {
    pub fn for_entity(kind: EntityKind, id: Uuid) -> Self {
        Self {
            entity_kind: Some(kind),
            entity_id: Some(id),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether a record passes this filter.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(kind) = self.entity_kind {
            if record.entity_kind != kind {
                return false;
            }
        }
        if let Some(id) = self.entity_id {
            if record.entity_id != Some(id) {
                return false;
            }
        }
        true
    }
}
