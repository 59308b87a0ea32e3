//! axtp-audit: Append-only, tamper-evident trail of pool operations.
//!
//! Every pool operation that changes state (or is refused) leaves one
//! [`AuditEntry`]. Entries are chained with BLAKE3: each one hashes its own
//! content together with the previous entry's hash, so any rewrite of
//! history is detectable with [`AuditLog::verify_chain`].

pub mod hash;
pub mod log;
pub mod sink;

pub use log::AuditLog;
pub use sink::{AuditError, AuditSink, JsonlAuditSink};

use std::fmt;

use axtp_core::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Core Types ───────────────────────────────────────────────────

/// Actor recorded for operations the pool performs on its own behalf.
pub const SYSTEM_ACTOR: &str = "system";

/// The pool operation an entry describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Deposit,
    Retrieve,
    Validate,
    Evict,
    Feedback,
    Refresh,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Retrieve => "retrieve",
            Self::Validate => "validate",
            Self::Evict => "evict",
            Self::Feedback => "feedback",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable line of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    /// Acting agent or validator id, or [`SYSTEM_ACTOR`].
    pub actor: String,
    /// Records the operation touched.
    pub record_ids: Vec<RecordId>,
    /// Human-readable result, e.g. "accepted" or "returned 3 results".
    pub outcome: String,
    /// Hash of the previous entry; `None` for the first entry.
    pub prev_hash: Option<String>,
    /// BLAKE3 hash (hex) of this entry's content and `prev_hash`.
    pub entry_hash: String,
}

impl AuditEntry {
    /// Recompute the hash of this entry's content.
    pub fn compute_hash(&self) -> String {
        hash::compute_entry_hash(self)
    }

    /// Whether the stored hash matches the content.
    pub fn verify_integrity(&self) -> bool {
        self.entry_hash == self.compute_hash()
    }
}
