//! Audit log stores
//!
//! Append-only persistence for audit records: an in-memory store for
//! tests and a durable JSON-lines file store. Both are dumb stores; the
//! administrator-only read restriction is enforced by the caller.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::errors::{AuditError, AuditResult};
use super::record::{AuditQuery, AuditRecord};

/// Append-only audit log.
pub trait AuditLog: Send + Sync {
    /// Append a record. The record must be durable when this returns.
    fn append(&self, record: &AuditRecord) -> AuditResult<()>;

    /// Read back records matching the filter, newest first, capped at
    /// `filter.limit`.
    fn query(&self, filter: &AuditQuery) -> AuditResult<Vec<AuditRecord>>;
}

/// In-memory audit log for tests.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        self.records
            .lock()
            .map_err(|_| AuditError::Storage("lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }

    fn query(&self, filter: &AuditQuery) -> AuditResult<Vec<AuditRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AuditError::Storage("lock poisoned".to_string()))?;
        Ok(records
            .iter()
            .rev() // append order: newest last
            .filter(|r| filter.matches(r))
            .take(filter.limit)
            .cloned()
            .collect())
    }
}

/// File-based audit log: one JSON record per line, flushed and synced
/// on every append.
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileAuditLog {
    /// Open or create an audit log file.
    pub fn open(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        let json = serde_json::to_string(record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AuditError::Storage("lock poisoned".to_string()))?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    fn query(&self, filter: &AuditQuery) -> AuditResult<Vec<AuditRecord>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut records: Vec<AuditRecord> = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord = serde_json::from_str(&line)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }

        records.reverse();
        records.truncate(filter.limit);
        Ok(records)
    }
}
