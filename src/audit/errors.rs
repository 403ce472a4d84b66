use thiserror::Error;

/// Errors from the audit log stores.
///
/// These never surface to callers of the mutation pipeline; the
/// recorder swallows them after logging so an audit failure can never
/// veto a successful mutation.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audit storage error: {0}")]
    Storage(String),
}

pub type AuditResult<T> = Result<T, AuditError>;
