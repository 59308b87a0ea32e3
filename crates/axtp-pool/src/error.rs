//! Error types for the axtp-pool crate.

use axtp_core::{OperationStatus, RecordId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Record rejected: {reason}")]
    Rejected { reason: String },

    #[error("Experience record not found: {0}")]
    NotFound(RecordId),

    #[error("Self-validation not permitted: {validator_id} produced record {record_id}")]
    SelfValidation {
        record_id: RecordId,
        validator_id: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Trust configuration error: {0}")]
    Trust(#[from] axtp_trust::TrustError),

    #[error("Audit error: {0}")]
    Audit(#[from] axtp_audit::AuditError),
}

impl PoolError {
    /// The discriminated status reported to callers.
    ///
    /// Admission and policy refusals are `rejected`; everything else,
    /// including unknown record ids, is an `error`.
    pub fn status(&self) -> OperationStatus {
        match self {
            Self::Rejected { .. } | Self::SelfValidation { .. } => OperationStatus::Rejected,
            Self::NotFound(_) | Self::Config(_) | Self::Trust(_) | Self::Audit(_) => {
                OperationStatus::Error
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;
