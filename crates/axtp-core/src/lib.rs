//! axtp-core: Shared types and error handling for the AXTP experience pool.
//!
//! This crate provides the foundational types used across all AXTP components:
//! - Experience records (context, execution trace, outcome, learnings, trust state)
//! - Closed status enums and the validation state machine
//! - An incremental record builder for agent code
//! - Common error types

pub mod builder;
pub mod error;
pub mod record;
pub mod types;

pub use builder::RecordBuilder;
pub use error::CoreError;
pub use record::{
    ErrorDetails, ExecutionTrace, ExperienceRecord, Learnings, OutcomeDetails, Pattern, Pivot, Step,
    TaskContext, TrustState,
};
pub use types::{
    ConflictResolution, OperationStatus, OutcomeStatus, PoolId, RecordId, ValidationStatus,
    ValidationType,
};
