//! The experience record: one agent's account of executing one task.

use serde::{Deserialize, Serialize};

use crate::types::{OutcomeStatus, RecordId, ValidationStatus};

/// Format version stamped on every record.
pub const RECORD_VERSION: &str = "0.1.0";

/// Confidence assigned to a record before the pool has scored it.
pub const INITIAL_CONFIDENCE: f64 = 0.5;

/// Why and where the task was run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskContext {
    pub objective: String,
    /// Free-form description of the runtime (framework, model, tools).
    pub environment: serde_json::Value,
    /// What started the task (e.g. "user_request", "schedule").
    pub trigger: String,
    /// Record this one builds on, if any.
    pub parent_id: Option<RecordId>,
}

impl Default for TaskContext {
    fn default() -> Self {
        Self {
            objective: String::new(),
            environment: serde_json::Value::Null,
            trigger: "user_request".to_string(),
            parent_id: None,
        }
    }
}

/// A single step in an agent's execution trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    pub step_index: u32,
    pub action: String,
    pub reasoning: String,
    pub tool_used: Option<String>,
    pub input_summary: String,
    pub output_summary: String,
    pub duration_ms: u64,
    pub success: bool,
}

/// A point where the agent abandoned one approach for another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pivot {
    pub from_step: u32,
    pub to_step: u32,
    pub reason: String,
}

/// What the agent did, step by step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionTrace {
    pub steps: Vec<Step>,
    pub pivots: Vec<Pivot>,
    pub total_duration_ms: u64,
    pub retries: u32,
}

/// Failure details attached to an unsuccessful outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetails {
    pub error_type: String,
    pub error_message: String,
    pub recovery_attempted: bool,
    pub recovery_successful: bool,
}

/// Narrative side of the outcome. The classifying status lives on the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutcomeDetails {
    pub result_summary: String,
    pub error: Option<ErrorDetails>,
    /// Producer's own quality estimate (0.0 – 1.0).
    pub quality_self_assessment: f64,
}

/// An effective pattern or antipattern learned during execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    pub pattern_id: String,
    pub description: String,
    pub applicability: String,
    pub confidence: f64,
    /// Antipatterns only: when the mistake tends to happen.
    pub trigger_conditions: String,
    /// Antipatterns only: what to do instead.
    pub alternative: String,
}

impl Pattern {
    pub fn new(pattern_id: &str, description: &str) -> Self {
        Self {
            pattern_id: pattern_id.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }
}

/// Knowledge distilled from the run, the part consumers care about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Learnings {
    pub effective_patterns: Vec<Pattern>,
    pub antipatterns: Vec<Pattern>,
    pub environmental_notes: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Trust bookkeeping. Written only by the pool and its trust engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrustState {
    pub confidence_score: f64,
    pub validation_status: ValidationStatus,
    /// Append-only; the same validator may appear more than once.
    pub validator_ids: Vec<String>,
}

impl Default for TrustState {
    fn default() -> Self {
        Self {
            confidence_score: INITIAL_CONFIDENCE,
            validation_status: ValidationStatus::Pending,
            validator_ids: Vec::new(),
        }
    }
}

impl TrustState {
    /// Number of distinct validator ids.
    pub fn distinct_validators(&self) -> usize {
        let mut seen: Vec<&str> = self.validator_ids.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

/// A structured account of one agent's execution of a task.
///
/// Everything except `trust` is immutable by convention once the record
/// has been deposited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperienceRecord {
    pub id: RecordId,
    pub version: String,
    /// Producing agent.
    pub agent_id: String,
    /// Hierarchical dotted task type, e.g. `api.integration.stripe.subscriptions`.
    pub task_type: String,
    pub outcome_status: OutcomeStatus,
    /// RFC 3339 creation time. Kept as supplied; unparseable values are
    /// tolerated by scoring.
    pub timestamp: String,
    pub context: TaskContext,
    pub execution: ExecutionTrace,
    pub outcome: OutcomeDetails,
    pub learnings: Learnings,
    pub trust: TrustState,
}

impl ExperienceRecord {
    /// A bare record stamped with a fresh id and the current time.
    pub fn new(agent_id: &str, task_type: &str, outcome_status: OutcomeStatus) -> Self {
        Self {
            id: RecordId::new(),
            version: RECORD_VERSION.to_string(),
            agent_id: agent_id.to_string(),
            task_type: task_type.to_string(),
            outcome_status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            context: TaskContext::default(),
            execution: ExecutionTrace::default(),
            outcome: OutcomeDetails::default(),
            learnings: Learnings::default(),
            trust: TrustState::default(),
        }
    }

    /// Whether this record falls under `task_type` in the dotted hierarchy.
    ///
    /// `api.integration.stripe` covers itself and
    /// `api.integration.stripe.subscriptions`, but not `api.integration.stripey`.
    pub fn matches_task_type(&self, task_type: &str) -> bool {
        match self.task_type.strip_prefix(task_type) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_pending() {
        let xr = ExperienceRecord::new("agent-a", "x.y", OutcomeStatus::Success);
        assert_eq!(xr.version, RECORD_VERSION);
        assert_eq!(xr.trust.validation_status, ValidationStatus::Pending);
        assert_eq!(xr.trust.confidence_score, INITIAL_CONFIDENCE);
        assert!(chrono::DateTime::parse_from_rfc3339(&xr.timestamp).is_ok());
    }

    #[test]
    fn task_type_hierarchy() {
        let xr = ExperienceRecord::new(
            "a",
            "api.integration.stripe.subscriptions",
            OutcomeStatus::Success,
        );
        assert!(xr.matches_task_type("api.integration.stripe.subscriptions"));
        assert!(xr.matches_task_type("api.integration.stripe"));
        assert!(xr.matches_task_type("api"));
        assert!(!xr.matches_task_type("api.integration.str"));
        assert!(!xr.matches_task_type("api.integration.stripe.subscriptions.trial"));
    }

    #[test]
    fn distinct_validators_ignores_repeats() {
        let trust = TrustState {
            validator_ids: vec!["b".into(), "c".into(), "b".into()],
            ..Default::default()
        };
        assert_eq!(trust.distinct_validators(), 2);
    }

    #[test]
    fn record_json_keeps_status_tags() {
        let xr = ExperienceRecord::new("a", "x", OutcomeStatus::Aborted);
        let json = serde_json::to_string(&xr).unwrap();
        assert!(json.contains("\"outcome_status\":\"aborted\""));
        assert!(json.contains("\"validation_status\":\"pending\""));
    }
}
