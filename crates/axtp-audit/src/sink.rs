//! Audit mirrors: the sink trait and a JSON-lines file implementation.
//!
//! The in-memory [`AuditLog`](crate::AuditLog) is authoritative. A sink
//! receives a copy of every entry after it has been appended; sink failures
//! are reported to the log, which warns and carries on.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::AuditEntry;

/// Errors that can occur while mirroring audit entries.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for audit mirror backends.
pub trait AuditSink: Send + Sync {
    /// Persist one entry. Called in log order.
    fn write(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Appends entries as JSON lines to a file.
///
/// ```text
/// {"sequence":0,"timestamp":"...","operation":"deposit",...}
/// {"sequence":1,"timestamp":"...","operation":"retrieve",...}
/// ```
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Create a sink writing to `path`.
    /// Creates the parent directory if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Create a sink for a fresh log, truncating any existing file.
    ///
    /// A new [`AuditLog`](crate::AuditLog) restarts at sequence 0, so its
    /// mirror must not continue a previous run's chain.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let sink = Self::new(path)?;
        fs::File::create(&sink.path)?;
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every mirrored entry, in file order.
    pub fn load(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let contents = fs::read_to_string(&self.path)?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AuditError::from))
            .collect()
    }
}

impl AuditSink for JsonlAuditSink {
    fn write(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        tracing::debug!(
            sequence = entry.sequence,
            path = %self.path.display(),
            "Audit entry mirrored"
        );

        Ok(())
    }
}
