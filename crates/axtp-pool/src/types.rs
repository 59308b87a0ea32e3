//! Request and result types for pool operations.
//!
//! Every result is a plain serializable value; the pool never chooses a
//! wire format for them.

use std::collections::{BTreeMap, BTreeSet};

use axtp_core::{
    ConflictResolution, ExperienceRecord, OperationStatus, OutcomeStatus, Pattern, PoolId,
    RecordId, ValidationStatus, ValidationType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller id recorded when none is supplied.
pub const ANONYMOUS_CALLER: &str = "anonymous";

/// Trust/freshness blend used when a query gives none (or a non-finite one).
pub const DEFAULT_RECENCY_WEIGHT: f64 = 0.5;

/// Receipt for an accepted deposit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepositReceipt {
    pub status: OperationStatus,
    pub record_id: RecordId,
    pub pool_id: PoolId,
    pub confidence_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Retrieval query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveQuery {
    /// Task type to match exactly or as a dotted prefix.
    pub task_type: Option<String>,
    /// Confidence floor; the pool's threshold when `None`.
    pub min_confidence: Option<f64>,
    pub max_results: usize,
    /// Blend between trust (0.0) and freshness (1.0) when ranking. Clamped
    /// to `[0, 1]`; NaN or infinite values fall back to the default.
    pub recency_weight: f64,
    pub outcome_filter: Option<OutcomeStatus>,
    pub caller_id: String,
}

impl Default for RetrieveQuery {
    fn default() -> Self {
        Self {
            task_type: None,
            min_confidence: None,
            max_results: 10,
            recency_weight: DEFAULT_RECENCY_WEIGHT,
            outcome_filter: None,
            caller_id: ANONYMOUS_CALLER.to_string(),
        }
    }
}

impl RetrieveQuery {
    /// Query for everything under `task_type`, issued by `caller_id`.
    pub fn for_task(task_type: &str, caller_id: &str) -> Self {
        Self {
            task_type: Some(task_type.to_string()),
            caller_id: caller_id.to_string(),
            ..Default::default()
        }
    }
}

/// The consumer-facing subset of a record's learnings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningsView {
    pub effective_patterns: Vec<Pattern>,
    pub antipatterns: Vec<Pattern>,
    pub recommendations: Vec<String>,
}

/// One ranked retrieval result.
///
/// Deliberately omits the execution trace and trust bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedExperience {
    pub record_id: RecordId,
    pub relevance_score: f64,
    pub confidence_score: f64,
    pub task_type: String,
    pub outcome_status: OutcomeStatus,
    pub result_summary: String,
    pub learnings: LearningsView,
}

impl RetrievedExperience {
    pub(crate) fn project(record: &ExperienceRecord, relevance_score: f64) -> Self {
        Self {
            record_id: record.id,
            relevance_score,
            confidence_score: record.trust.confidence_score,
            task_type: record.task_type.clone(),
            outcome_status: record.outcome_status,
            result_summary: record.outcome.result_summary.clone(),
            learnings: LearningsView {
                effective_patterns: record.learnings.effective_patterns.clone(),
                antipatterns: record.learnings.antipatterns.clone(),
                recommendations: record.learnings.recommendations.clone(),
            },
        }
    }
}

/// Result of an accepted validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationOutcome {
    pub status: OperationStatus,
    pub record_id: RecordId,
    pub validation_type: ValidationType,
    pub previous_status: ValidationStatus,
    pub validation_status: ValidationStatus,
    pub new_confidence: f64,
    pub validator_count: usize,
}

/// Result of recording downstream feedback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackReceipt {
    pub status: OperationStatus,
    pub record_id: RecordId,
    pub new_confidence: f64,
    pub feedback_count: usize,
}

/// Read-only snapshot of pool health.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolStats {
    pub pool_id: PoolId,
    pub pool_name: String,
    pub scope: String,
    pub validation_required: bool,
    pub conflict_resolution: ConflictResolution,
    pub max_records: usize,
    pub total_xrs: usize,
    pub contributing_agents: usize,
    pub avg_confidence: f64,
    pub task_types: BTreeSet<String>,
    pub outcome_distribution: BTreeMap<OutcomeStatus, usize>,
    pub validation_distribution: BTreeMap<ValidationStatus, usize>,
    pub audit_entries: usize,
    /// Creation timestamp of the most recently inserted record.
    pub last_updated: Option<String>,
}
