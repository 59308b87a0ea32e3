//! Builder for experience records.
//!
//! Used by agent code to record an execution incrementally and hand the
//! finished record to a pool:
//!
//! ```
//! # use axtp_core::{OutcomeStatus, RecordBuilder};
//! let mut builder = RecordBuilder::new(
//!     "agent-alpha",
//!     "api.integration.stripe.subscriptions",
//!     OutcomeStatus::Success,
//! );
//! builder.set_objective("Integrate Stripe API for subscription billing");
//! builder.add_step("Retrieved Stripe API docs", "Need current API surface", Some("http_client"), 1200, true);
//! builder.add_step("Used explicit Product->Price->Subscription chain", "More reliable", None, 4200, true);
//! builder.add_recommendation("Create the Product before the Price.");
//! let xr = builder.finish();
//! assert_eq!(xr.execution.steps.len(), 2);
//! assert_eq!(xr.execution.total_duration_ms, 5400);
//! ```

use crate::record::{ErrorDetails, ExperienceRecord, Pattern, Pivot, Step};
use crate::types::{OutcomeStatus, RecordId};

/// Records a task execution step by step.
pub struct RecordBuilder {
    record: ExperienceRecord,
}

impl RecordBuilder {
    /// Start a new record for `agent_id`'s run of `task_type`.
    pub fn new(agent_id: &str, task_type: &str, outcome_status: OutcomeStatus) -> Self {
        Self {
            record: ExperienceRecord::new(agent_id, task_type, outcome_status),
        }
    }

    /// The record ID (available before the record is finished).
    pub fn id(&self) -> RecordId {
        self.record.id
    }

    pub fn set_objective(&mut self, objective: &str) {
        self.record.context.objective = objective.to_string();
    }

    pub fn set_environment(&mut self, environment: serde_json::Value) {
        self.record.context.environment = environment;
    }

    pub fn set_trigger(&mut self, trigger: &str) {
        self.record.context.trigger = trigger.to_string();
    }

    pub fn set_parent(&mut self, parent: RecordId) {
        self.record.context.parent_id = Some(parent);
    }

    /// Override the creation timestamp (RFC 3339), e.g. when importing old runs.
    pub fn set_timestamp(&mut self, timestamp: &str) {
        self.record.timestamp = timestamp.to_string();
    }

    /// Append an execution step. Indexes are assigned in call order.
    pub fn add_step(
        &mut self,
        action: &str,
        reasoning: &str,
        tool_used: Option<&str>,
        duration_ms: u64,
        success: bool,
    ) {
        let step_index = self.record.execution.steps.len() as u32;
        self.record.execution.steps.push(Step {
            step_index,
            action: action.to_string(),
            reasoning: reasoning.to_string(),
            tool_used: tool_used.map(str::to_string),
            input_summary: String::new(),
            output_summary: String::new(),
            duration_ms,
            success,
        });
    }

    /// Append a fully specified step, keeping its own summaries.
    pub fn push_step(&mut self, step: Step) {
        self.record.execution.steps.push(step);
    }

    pub fn add_pivot(&mut self, from_step: u32, to_step: u32, reason: &str) {
        self.record.execution.pivots.push(Pivot {
            from_step,
            to_step,
            reason: reason.to_string(),
        });
    }

    pub fn set_retries(&mut self, retries: u32) {
        self.record.execution.retries = retries;
    }

    pub fn set_total_duration_ms(&mut self, total_duration_ms: u64) {
        self.record.execution.total_duration_ms = total_duration_ms;
    }

    pub fn set_result_summary(&mut self, summary: &str) {
        self.record.outcome.result_summary = summary.to_string();
    }

    pub fn set_error(&mut self, error: ErrorDetails) {
        self.record.outcome.error = Some(error);
    }

    pub fn set_quality_self_assessment(&mut self, quality: f64) {
        self.record.outcome.quality_self_assessment = quality.clamp(0.0, 1.0);
    }

    pub fn add_pattern(&mut self, pattern: Pattern) {
        self.record.learnings.effective_patterns.push(pattern);
    }

    pub fn add_antipattern(&mut self, antipattern: Pattern) {
        self.record.learnings.antipatterns.push(antipattern);
    }

    pub fn add_environmental_note(&mut self, note: &str) {
        self.record.learnings.environmental_notes.push(note.to_string());
    }

    pub fn add_recommendation(&mut self, recommendation: &str) {
        self.record.learnings.recommendations.push(recommendation.to_string());
    }

    /// Finish the record. Total duration defaults to the sum of step durations
    /// when it was not set explicitly.
    pub fn finish(mut self) -> ExperienceRecord {
        if self.record.execution.total_duration_ms == 0 {
            self.record.execution.total_duration_ms = self
                .record
                .execution
                .steps
                .iter()
                .map(|s| s.duration_ms)
                .sum();
        }
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_indexed_in_order() {
        let mut b = RecordBuilder::new("a", "x.y", OutcomeStatus::PartialSuccess);
        b.add_step("first", "because", None, 10, true);
        b.add_step("second", "retry", Some("code_executor"), 20, false);
        b.add_pivot(0, 1, "first approach failed");
        let xr = b.finish();

        assert_eq!(xr.execution.steps[0].step_index, 0);
        assert_eq!(xr.execution.steps[1].step_index, 1);
        assert_eq!(
            xr.execution.steps[1].tool_used.as_deref(),
            Some("code_executor")
        );
        assert_eq!(xr.execution.pivots.len(), 1);
        assert_eq!(xr.execution.total_duration_ms, 30);
    }

    #[test]
    fn explicit_total_duration_is_kept() {
        let mut b = RecordBuilder::new("a", "x", OutcomeStatus::Success);
        b.add_step("only", "", None, 10, true);
        b.set_total_duration_ms(500);
        assert_eq!(b.finish().execution.total_duration_ms, 500);
    }

    #[test]
    fn id_is_stable_across_finish() {
        let b = RecordBuilder::new("a", "x", OutcomeStatus::Success);
        let id = b.id();
        assert_eq!(b.finish().id, id);
    }

    #[test]
    fn quality_is_clamped() {
        let mut b = RecordBuilder::new("a", "x", OutcomeStatus::Success);
        b.set_quality_self_assessment(1.7);
        assert_eq!(b.finish().outcome.quality_self_assessment, 1.0);
    }
}
