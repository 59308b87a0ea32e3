//! Trust scoring engine.
//!
//! Formula: `trust = Σ(weight_i × signal_i)` over reputation, validation,
//! outcome, recency and consistency, each signal in `[0, 1]`.
//! Clamped to `[0, 1]` and rounded to 4 decimal places.

use std::collections::HashMap;

use axtp_core::{ExperienceRecord, RecordId, ValidationStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::TrustConfig;
use crate::error::Result;
use crate::round4;

/// Reputation of an agent the engine has never adjusted.
pub const DEFAULT_REPUTATION: f64 = 0.5;

/// Score used whenever a signal has no evidence either way.
pub const NEUTRAL_SCORE: f64 = 0.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// The five signals behind a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrustBreakdown {
    pub reputation: f64,
    pub validation: f64,
    pub outcome: f64,
    pub recency: f64,
    pub consistency: f64,
    /// Weighted, clamped and rounded total.
    pub composite: f64,
}

/// Computes trust scores and owns the state they depend on.
#[derive(Debug, Clone)]
pub struct TrustEngine {
    config: TrustConfig,
    reputations: HashMap<String, f64>,
    feedback: HashMap<RecordId, Vec<bool>>,
}

impl Default for TrustEngine {
    fn default() -> Self {
        Self {
            config: TrustConfig::default(),
            reputations: HashMap::new(),
            feedback: HashMap::new(),
        }
    }
}

impl TrustEngine {
    /// Build an engine, rejecting invalid weights or decay rate.
    pub fn new(config: TrustConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    // ── Reputation ───────────────────────────────────────────────

    pub fn reputation(&self, agent_id: &str) -> f64 {
        self.reputations
            .get(agent_id)
            .copied()
            .unwrap_or(DEFAULT_REPUTATION)
    }

    /// Add `delta` to an agent's reputation, clamped to `[0, 1]`.
    /// Returns the new value.
    pub fn adjust_reputation(&mut self, agent_id: &str, delta: f64) -> f64 {
        let updated = (self.reputation(agent_id) + delta).clamp(0.0, 1.0);
        self.reputations.insert(agent_id.to_string(), updated);

        tracing::debug!(agent_id, delta, reputation = updated, "Reputation adjusted");
        updated
    }

    // ── Feedback ─────────────────────────────────────────────────

    /// Record whether a record helped a downstream consumer.
    /// Returns the number of feedback entries now held for the record.
    pub fn record_feedback(&mut self, record_id: RecordId, was_helpful: bool) -> usize {
        let history = self.feedback.entry(record_id).or_default();
        history.push(was_helpful);
        history.len()
    }

    pub fn feedback_count(&self, record_id: RecordId) -> usize {
        self.feedback.get(&record_id).map_or(0, Vec::len)
    }

    // ── Signals ──────────────────────────────────────────────────

    /// Exponential age decay, `exp(-λ × age_days)`, against the current time.
    pub fn recency(&self, timestamp: &str) -> f64 {
        self.recency_at(timestamp, Utc::now())
    }

    /// Age decay measured at `now`.
    ///
    /// Always in `(0, 1]`. Unparseable or empty timestamps score a neutral
    /// 0.5. Timestamps in the future count as age zero, and ages old enough
    /// to underflow `exp` bottom out at `f64::MIN_POSITIVE`.
    pub fn recency_at(&self, timestamp: &str, now: DateTime<Utc>) -> f64 {
        let created = match DateTime::parse_from_rfc3339(timestamp) {
            Ok(t) => t.with_timezone(&Utc),
            Err(_) => return NEUTRAL_SCORE,
        };
        let age_secs = (now - created).num_milliseconds() as f64 / 1000.0;
        let age_days = (age_secs / SECONDS_PER_DAY).max(0.0);
        (-self.config.decay_rate * age_days)
            .exp()
            .max(f64::MIN_POSITIVE)
    }

    /// Peer-validation signal.
    ///
    /// Each validator entry moves a validated record toward 1 and a disputed
    /// record toward 0; pending records sit at 0.5.
    pub fn validation_score(&self, record: &ExperienceRecord) -> f64 {
        let count = record.trust.validator_ids.len() as f64;
        match record.trust.validation_status {
            ValidationStatus::Validated => (0.7 + 0.1 * count).min(1.0),
            ValidationStatus::Disputed => (0.3 - 0.1 * count).max(0.0),
            ValidationStatus::Pending => NEUTRAL_SCORE,
        }
    }

    /// Fraction of downstream feedback that was positive; 0.5 without any.
    pub fn outcome_score(&self, record_id: RecordId) -> f64 {
        match self.feedback.get(&record_id) {
            Some(history) if !history.is_empty() => {
                let helpful = history.iter().filter(|&&h| h).count();
                helpful as f64 / history.len() as f64
            }
            _ => NEUTRAL_SCORE,
        }
    }

    /// Agreement of the record's outcome with other records of its task type.
    pub fn consistency<'a, I>(&self, record: &ExperienceRecord, pool: I) -> f64
    where
        I: IntoIterator<Item = &'a ExperienceRecord>,
    {
        let (peers, agreeing) = pool
            .into_iter()
            .filter(|other| other.task_type == record.task_type && other.id != record.id)
            .fold((0usize, 0usize), |(peers, agreeing), other| {
                let agrees = other.outcome_status == record.outcome_status;
                (peers + 1, agreeing + usize::from(agrees))
            });

        if peers == 0 {
            NEUTRAL_SCORE
        } else {
            agreeing as f64 / peers as f64
        }
    }

    // ── Composite ────────────────────────────────────────────────

    /// All five signals plus the composite, measured now.
    pub fn breakdown<'a, I>(&self, record: &ExperienceRecord, pool: I) -> TrustBreakdown
    where
        I: IntoIterator<Item = &'a ExperienceRecord>,
    {
        self.breakdown_at(record, pool, Utc::now())
    }

    /// All five signals plus the composite, with recency measured at `now`.
    pub fn breakdown_at<'a, I>(
        &self,
        record: &ExperienceRecord,
        pool: I,
        now: DateTime<Utc>,
    ) -> TrustBreakdown
    where
        I: IntoIterator<Item = &'a ExperienceRecord>,
    {
        let reputation = self.reputation(&record.agent_id).clamp(0.0, 1.0);
        let validation = self.validation_score(record).clamp(0.0, 1.0);
        let outcome = self.outcome_score(record.id).clamp(0.0, 1.0);
        let recency = self.recency_at(&record.timestamp, now).clamp(0.0, 1.0);
        let consistency = self.consistency(record, pool).clamp(0.0, 1.0);

        let w = &self.config.weights;
        let raw = w.reputation * reputation
            + w.validation * validation
            + w.outcome * outcome
            + w.recency * recency
            + w.consistency * consistency;

        TrustBreakdown {
            reputation,
            validation,
            outcome,
            recency,
            consistency,
            composite: round4(raw.clamp(0.0, 1.0)),
        }
    }

    /// Composite trust score in `[0, 1]`, rounded to 4 decimal places.
    pub fn composite_score<'a, I>(&self, record: &ExperienceRecord, pool: I) -> f64
    where
        I: IntoIterator<Item = &'a ExperienceRecord>,
    {
        self.breakdown(record, pool).composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrustWeights;
    use axtp_core::OutcomeStatus;
    use chrono::Duration;

    fn record(agent: &str, task_type: &str, outcome: OutcomeStatus) -> ExperienceRecord {
        ExperienceRecord::new(agent, task_type, outcome)
    }

    fn no_peers() -> &'static [ExperienceRecord] {
        &[]
    }

    fn with_validators(status: ValidationStatus, n: usize) -> ExperienceRecord {
        let mut xr = record("a", "x", OutcomeStatus::Success);
        xr.trust.validation_status = status;
        xr.trust.validator_ids = (0..n).map(|i| format!("v{i}")).collect();
        xr
    }

    #[test]
    fn test_unknown_agent_has_default_reputation() {
        let engine = TrustEngine::default();
        assert_eq!(engine.reputation("nobody"), DEFAULT_REPUTATION);
    }

    #[test]
    fn test_reputation_is_additive_and_clamped() {
        let mut engine = TrustEngine::default();
        assert!((engine.adjust_reputation("a", 0.05) - 0.55).abs() < 1e-12);
        assert!((engine.adjust_reputation("a", 0.05) - 0.60).abs() < 1e-12);
        assert_eq!(engine.adjust_reputation("a", 5.0), 1.0);
        assert_eq!(engine.adjust_reputation("b", -5.0), 0.0);
    }

    #[test]
    fn test_recency_decay() {
        let engine = TrustEngine::default();
        let now = Utc::now();

        let fresh = engine.recency_at(&now.to_rfc3339(), now);
        assert!((fresh - 1.0).abs() < 1e-12);

        let hundred_days = (now - Duration::days(100)).to_rfc3339();
        let expected = (-0.01f64 * 100.0).exp();
        assert!((engine.recency_at(&hundred_days, now) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_recency_fail_soft() {
        let engine = TrustEngine::default();
        assert_eq!(engine.recency("yesterday-ish"), NEUTRAL_SCORE);
        assert_eq!(engine.recency(""), NEUTRAL_SCORE);
        // Naive timestamps carry no offset and cannot be placed in time.
        assert_eq!(engine.recency("2026-01-01T00:00:00"), NEUTRAL_SCORE);
    }

    #[test]
    fn test_ancient_timestamp_stays_positive() {
        let engine = TrustEngine::default();
        let ancient = engine.recency("0001-01-01T00:00:00Z");
        assert!(ancient > 0.0);
        assert_eq!(ancient, f64::MIN_POSITIVE);
    }

    #[test]
    fn test_future_timestamp_capped_at_one() {
        let engine = TrustEngine::default();
        let now = Utc::now();
        let future = (now + Duration::days(30)).to_rfc3339();
        assert_eq!(engine.recency_at(&future, now), 1.0);
    }

    #[test]
    fn test_validation_score_by_status() {
        let engine = TrustEngine::default();
        assert_eq!(
            engine.validation_score(&with_validators(ValidationStatus::Pending, 3)),
            0.5
        );
        assert!(
            (engine.validation_score(&with_validators(ValidationStatus::Validated, 2)) - 0.9).abs()
                < 1e-12
        );
        assert!(
            (engine.validation_score(&with_validators(ValidationStatus::Disputed, 1)) - 0.2).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_validation_score_monotonic() {
        let engine = TrustEngine::default();
        let mut prev_validated = f64::MIN;
        let mut prev_disputed = f64::MAX;
        for n in 0..8 {
            let v = engine.validation_score(&with_validators(ValidationStatus::Validated, n));
            let d = engine.validation_score(&with_validators(ValidationStatus::Disputed, n));
            assert!(v >= prev_validated && v <= 1.0);
            assert!(d <= prev_disputed && d >= 0.0);
            prev_validated = v;
            prev_disputed = d;
        }
    }

    #[test]
    fn test_outcome_score_neutral_without_feedback() {
        let mut engine = TrustEngine::default();
        let id = RecordId::new();
        assert_eq!(engine.outcome_score(id), NEUTRAL_SCORE);

        engine.record_feedback(id, true);
        engine.record_feedback(id, true);
        engine.record_feedback(id, false);
        assert_eq!(engine.feedback_count(id), 3);
        assert!((engine.outcome_score(id) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_against_peers() {
        let engine = TrustEngine::default();
        let subject = record("a", "x.y", OutcomeStatus::Success);
        let pool = vec![
            subject.clone(),
            record("b", "x.y", OutcomeStatus::Success),
            record("c", "x.y", OutcomeStatus::Failure),
            record("d", "x.y", OutcomeStatus::Success),
            record("e", "x.y.z", OutcomeStatus::Failure),
        ];
        assert!((engine.consistency(&subject, &pool) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_without_peers() {
        let engine = TrustEngine::default();
        let subject = record("a", "x.y", OutcomeStatus::Success);
        let pool = vec![subject.clone(), record("b", "other", OutcomeStatus::Success)];
        assert_eq!(engine.consistency(&subject, &pool), NEUTRAL_SCORE);
        assert_eq!(engine.consistency(&subject, no_peers()), NEUTRAL_SCORE);
    }

    #[test]
    fn test_composite_known_record() {
        let engine = TrustEngine::default();
        let now = Utc::now();
        let mut xr = record("a", "x", OutcomeStatus::Success);
        xr.timestamp = now.to_rfc3339();

        let b = engine.breakdown_at(&xr, no_peers(), now);

        // 0.30×0.5 + 0.25×0.5 + 0.25×0.5 + 0.10×1.0 + 0.10×0.5 = 0.55
        assert_eq!(b.composite, 0.55);
        assert_eq!(b.recency, 1.0);
    }

    #[test]
    fn test_composite_is_rounded_and_bounded() {
        let mut engine = TrustEngine::new(TrustConfig {
            weights: TrustWeights {
                reputation: 1.0,
                validation: 0.0,
                outcome: 0.0,
                recency: 0.0,
                consistency: 0.0,
            },
            decay_rate: 0.0,
        })
        .unwrap();
        engine.adjust_reputation("a", 0.123456);

        let xr = record("a", "x", OutcomeStatus::Success);
        assert_eq!(engine.composite_score(&xr, no_peers()), 0.6235);

        engine.adjust_reputation("a", 10.0);
        assert_eq!(engine.composite_score(&xr, no_peers()), 1.0);
    }

    #[test]
    fn test_composite_in_unit_interval_for_extremes() {
        let mut engine = TrustEngine::default();
        let mut xr = with_validators(ValidationStatus::Disputed, 9);
        xr.timestamp = "1970-01-01T00:00:00Z".to_string();
        engine.adjust_reputation("a", -1.0);
        engine.record_feedback(xr.id, false);
        let peer = record("b", "x", OutcomeStatus::Failure);

        let low = engine.composite_score(&xr, std::iter::once(&peer));
        assert!((0.0..=1.0).contains(&low));

        let mut best = with_validators(ValidationStatus::Validated, 9);
        engine.adjust_reputation("a", 2.0);
        engine.record_feedback(best.id, true);
        best.timestamp = Utc::now().to_rfc3339();
        let high = engine.composite_score(&best, no_peers());
        assert!((0.0..=1.0).contains(&high));
        assert!(high > low);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = TrustConfig {
            decay_rate: -1.0,
            ..Default::default()
        };
        assert!(TrustEngine::new(config).is_err());
    }
}
