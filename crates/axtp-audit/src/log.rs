//! The append-only audit log.

use std::fmt;

use axtp_core::RecordId;
use chrono::Utc;

use crate::sink::AuditSink;
use crate::{AuditEntry, Operation};

/// Strictly append-only sequence of [`AuditEntry`] values.
///
/// There is no way to update, remove or reorder an entry: the only
/// mutating operation is [`AuditLog::append`].
#[derive(Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    sink: Option<Box<dyn AuditSink>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that mirrors every appended entry to `sink`.
    pub fn with_sink(sink: Box<dyn AuditSink>) -> Self {
        Self {
            entries: Vec::new(),
            sink: Some(sink),
        }
    }

    /// Append an entry and return it.
    ///
    /// Never fails: the in-memory append always happens, and a sink error
    /// is only logged.
    pub fn append(
        &mut self,
        operation: Operation,
        actor: &str,
        record_ids: Vec<RecordId>,
        outcome: impl Into<String>,
    ) -> &AuditEntry {
        let mut entry = AuditEntry {
            sequence: self.entries.len() as u64,
            timestamp: Utc::now(),
            operation,
            actor: actor.to_string(),
            record_ids,
            outcome: outcome.into(),
            prev_hash: self.entries.last().map(|e| e.entry_hash.clone()),
            entry_hash: String::new(),
        };
        entry.entry_hash = entry.compute_hash();

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.write(&entry) {
                tracing::warn!(
                    sequence = entry.sequence,
                    operation = %entry.operation,
                    error = %e,
                    "Failed to mirror audit entry"
                );
            }
        }

        tracing::debug!(
            sequence = entry.sequence,
            operation = %entry.operation,
            actor = %entry.actor,
            outcome = %entry.outcome,
            "Audit entry appended"
        );

        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    /// Entries for one operation kind, in log order.
    pub fn by_operation(&self, operation: Operation) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(move |e| e.operation == operation)
    }

    /// Check sequence numbers, per-entry hashes and the links between them.
    pub fn verify_chain(&self) -> bool {
        let mut prev: Option<&str> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.sequence != i as u64
                || entry.prev_hash.as_deref() != prev
                || !entry.verify_integrity()
            {
                return false;
            }
            prev = Some(&entry.entry_hash);
        }
        true
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("entries", &self.entries.len())
            .field("mirrored", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::AuditError;

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn write(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
            Err(AuditError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn populated_log() -> AuditLog {
        let mut log = AuditLog::new();
        let a = RecordId::new();
        let b = RecordId::new();
        log.append(Operation::Deposit, "agent-a", vec![a], "accepted");
        log.append(Operation::Deposit, "agent-b", vec![b], "accepted");
        log.append(Operation::Validate, "agent-b", vec![a], "confirm: works");
        log
    }

    #[test]
    fn entries_are_chained() {
        let log = populated_log();
        assert_eq!(log.len(), 3);
        assert!(log.entries()[0].prev_hash.is_none());
        assert_eq!(
            log.entries()[1].prev_hash.as_deref(),
            Some(log.entries()[0].entry_hash.as_str())
        );
        assert!(log.verify_chain());
    }

    #[test]
    fn tampering_breaks_the_chain() {
        let log = populated_log();
        let mut entries = log.entries().to_vec();
        entries[1].outcome = "rejected".to_string();

        let tampered = AuditLog {
            entries,
            sink: None,
        };
        assert!(!tampered.verify_chain());
    }

    #[test]
    fn sink_failure_does_not_block_append() {
        let mut log = AuditLog::with_sink(Box::new(FailingSink));
        log.append(Operation::Evict, crate::SYSTEM_ACTOR, vec![], "capacity limit reached");
        assert_eq!(log.len(), 1);
        assert!(log.verify_chain());
    }

    #[test]
    fn filters_by_operation() {
        let log = populated_log();
        assert_eq!(log.by_operation(Operation::Deposit).count(), 2);
        assert_eq!(log.by_operation(Operation::Evict).count(), 0);
    }
}
