//! BLAKE3 content hashing for the audit chain.
//!
//! Computes a deterministic hash of all entry fields (excluding the
//! entry_hash itself) so that any modification is detectable. Including
//! `prev_hash` links each entry to its predecessor.

use serde::Serialize;

use crate::AuditEntry;

/// Hashable representation of an AuditEntry (excludes entry_hash).
#[derive(Serialize)]
struct HashableEntry<'a> {
    sequence: u64,
    timestamp: &'a chrono::DateTime<chrono::Utc>,
    operation: &'a crate::Operation,
    actor: &'a str,
    record_ids: &'a [axtp_core::RecordId],
    outcome: &'a str,
    prev_hash: &'a Option<String>,
}

/// Compute the BLAKE3 hash of an audit entry's content.
///
/// Serializes all fields except `entry_hash` to canonical JSON,
/// then hashes the bytes with BLAKE3. Returns the hex-encoded hash.
pub fn compute_entry_hash(entry: &AuditEntry) -> String {
    let hashable = HashableEntry {
        sequence: entry.sequence,
        timestamp: &entry.timestamp,
        operation: &entry.operation,
        actor: &entry.actor,
        record_ids: &entry.record_ids,
        outcome: &entry.outcome,
        prev_hash: &entry.prev_hash,
    };

    let json = serde_json::to_vec(&hashable).expect("Audit entry serialization should not fail");
    blake3::hash(&json).to_hex().to_string()
}
