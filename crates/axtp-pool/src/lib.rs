//! axtp-pool: Governed experience pool for autonomous agents.
//!
//! Agents deposit experience records after finishing a task and retrieve
//! trust-ranked prior experience before starting a similar one. The pool
//! admits records, recomputes their trust through a [`TrustEngine`],
//! applies peer validations, evicts the least trusted record at capacity,
//! and leaves an audit entry for every operation.

pub mod config;
pub mod demo;
pub mod error;
pub mod eviction;
pub mod shared;
pub mod simulate;
pub mod types;

pub use config::PoolConfig;
pub use error::PoolError;
pub use shared::SharedPool;
pub use types::{
    DepositReceipt, FeedbackReceipt, PoolStats, RetrieveQuery, RetrievedExperience,
    ValidationOutcome,
};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use axtp_audit::{AuditLog, AuditSink, JsonlAuditSink, Operation, SYSTEM_ACTOR};
use axtp_core::{
    ExperienceRecord, OperationStatus, OutcomeStatus, PoolId, RecordId, TrustState,
    ValidationStatus, ValidationType,
};
use axtp_trust::{round4, TrustEngine};
use chrono::Utc;

use crate::error::Result;
use crate::types::{ANONYMOUS_CALLER, DEFAULT_RECENCY_WEIGHT};

/// Validator entries needed before a confirmation promotes a record.
pub const VALIDATION_THRESHOLD: usize = 2;

/// Evidence text kept in the audit log, in characters.
const EVIDENCE_EXCERPT_CHARS: usize = 100;

/// A bounded, audited collection of experience records.
///
/// Mutating operations take `&mut self`; wrap the pool in a
/// [`SharedPool`] to serve concurrent agents.
#[derive(Debug)]
pub struct ExperiencePool {
    pool_id: PoolId,
    config: PoolConfig,
    records: HashMap<RecordId, ExperienceRecord>,
    /// Record ids in insertion order.
    order: Vec<RecordId>,
    audit: AuditLog,
    trust: TrustEngine,
}

impl ExperiencePool {
    /// Build a pool, mirroring its audit log to `config.audit_path` if set.
    /// An existing file at that path is truncated.
    pub fn new(config: PoolConfig) -> Result<Self> {
        let audit = match &config.audit_path {
            Some(path) => AuditLog::with_sink(Box::new(JsonlAuditSink::create(path)?)),
            None => AuditLog::new(),
        };
        Self::build(config, audit)
    }

    /// Build a pool that mirrors its audit log to a custom sink.
    pub fn with_audit_sink(config: PoolConfig, sink: Box<dyn AuditSink>) -> Result<Self> {
        Self::build(config, AuditLog::with_sink(sink))
    }

    fn build(config: PoolConfig, audit: AuditLog) -> Result<Self> {
        config.validate()?;
        let trust = TrustEngine::new(config.trust)?;
        let pool_id = PoolId::new();

        tracing::info!(
            pool_id = %pool_id,
            pool_name = %config.pool_name,
            scope = %config.scope,
            max_records = config.max_records,
            "Experience pool created"
        );

        Ok(Self {
            pool_id,
            config,
            records: HashMap::new(),
            order: Vec::new(),
            audit,
            trust,
        })
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn get(&self, record_id: RecordId) -> Option<&ExperienceRecord> {
        self.records.get(&record_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only view of the audit trail.
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Read-only view of the trust engine (reputations, feedback, weights).
    pub fn trust_engine(&self) -> &TrustEngine {
        &self.trust
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &ExperienceRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    // ── Deposit ──────────────────────────────────────────────────

    /// Admit a record into the pool.
    ///
    /// The record's trust fields are reset and its confidence is scored
    /// against the pool as it stood before this deposit. At capacity the
    /// least trusted record is evicted first.
    pub fn deposit(&mut self, mut record: ExperienceRecord) -> Result<DepositReceipt> {
        if let Some(reason) = self.admission_failure(&record) {
            let actor = actor_or_anonymous(&record.agent_id);
            tracing::warn!(record_id = %record.id, agent_id = %actor, %reason, "Deposit rejected");
            self.audit.append(
                Operation::Deposit,
                actor,
                vec![record.id],
                format!("rejected: {reason}"),
            );
            return Err(PoolError::Rejected { reason });
        }

        record.trust = TrustState::default();

        if self.records.len() >= self.config.max_records {
            self.evict_one();
        }

        record.trust.confidence_score = self.trust.composite_score(&record, self.records.values());

        let record_id = record.id;
        let confidence_score = record.trust.confidence_score;
        let agent_id = record.agent_id.clone();
        let task_type = record.task_type.clone();

        self.records.insert(record_id, record);
        self.order.push(record_id);
        self.audit
            .append(Operation::Deposit, &agent_id, vec![record_id], "accepted");

        tracing::info!(
            record_id = %record_id,
            agent_id = %agent_id,
            task_type = %task_type,
            confidence = confidence_score,
            "Experience record deposited"
        );

        Ok(DepositReceipt {
            status: OperationStatus::Accepted,
            record_id,
            pool_id: self.pool_id,
            confidence_score,
            timestamp: Utc::now(),
        })
    }

    fn admission_failure(&self, record: &ExperienceRecord) -> Option<String> {
        if record.agent_id.is_empty() || record.task_type.is_empty() {
            return Some("Missing required fields (agent_id, task_type)".to_string());
        }
        if self.records.contains_key(&record.id) {
            return Some(format!("Record {} is already pooled", record.id));
        }
        None
    }

    /// Remove the least trusted, oldest record and log it.
    fn evict_one(&mut self) -> Option<RecordId> {
        let victim = eviction::select_victim(self.records())?;
        self.records.remove(&victim);
        self.order.retain(|id| *id != victim);
        self.audit.append(
            Operation::Evict,
            SYSTEM_ACTOR,
            vec![victim],
            "capacity limit reached",
        );

        tracing::info!(record_id = %victim, "Experience record evicted at capacity");
        Some(victim)
    }

    // ── Retrieve ─────────────────────────────────────────────────

    /// Trust-ranked retrieval.
    ///
    /// Filters by task type (exact or dotted prefix) and outcome, refreshes
    /// every surviving candidate's stored confidence, drops those below the
    /// confidence floor, then ranks by
    /// `(1 - recency_weight) × confidence + recency_weight × recency`.
    pub fn retrieve(&mut self, query: &RetrieveQuery) -> Vec<RetrievedExperience> {
        let min_confidence = query
            .min_confidence
            .filter(|m| !m.is_nan())
            .unwrap_or(self.config.min_confidence_threshold);
        let recency_weight = sanitize_recency_weight(query.recency_weight);
        let task_type = query.task_type.as_deref().filter(|t| !t.is_empty());
        let now = Utc::now();

        let candidates: Vec<RecordId> = self
            .records()
            .filter(|xr| task_type.map_or(true, |t| xr.matches_task_type(t)))
            .filter(|xr| query.outcome_filter.map_or(true, |o| xr.outcome_status == o))
            .map(|xr| xr.id)
            .collect();

        let rescored: Vec<(RecordId, f64)> = candidates
            .iter()
            .filter_map(|id| self.records.get(id))
            .map(|xr| {
                let score = self.trust.breakdown_at(xr, self.records.values(), now).composite;
                (xr.id, score)
            })
            .collect();
        for (id, score) in &rescored {
            if let Some(xr) = self.records.get_mut(id) {
                xr.trust.confidence_score = *score;
            }
        }

        let mut ranked: Vec<(f64, &ExperienceRecord)> = rescored
            .iter()
            .filter(|(_, score)| *score >= min_confidence)
            .filter_map(|(id, score)| {
                let xr = self.records.get(id)?;
                let recency = self.trust.recency_at(&xr.timestamp, now);
                Some(((1.0 - recency_weight) * score + recency_weight * recency, xr))
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked.truncate(query.max_results);

        let results: Vec<RetrievedExperience> = ranked
            .into_iter()
            .map(|(relevance, xr)| RetrievedExperience::project(xr, round4(relevance)))
            .collect();

        let caller = actor_or_anonymous(&query.caller_id);
        self.audit.append(
            Operation::Retrieve,
            caller,
            results.iter().map(|r| r.record_id).collect(),
            format!("returned {} results", results.len()),
        );

        tracing::info!(
            caller_id = %caller,
            task_type = task_type.unwrap_or("*"),
            candidates = candidates.len(),
            returned = results.len(),
            "Experience pool queried"
        );

        results
    }

    // ── Validate ─────────────────────────────────────────────────

    /// Apply a peer validation to a record.
    ///
    /// Fails when the record is unknown or the validator produced it; a
    /// refused validation leaves the record untouched.
    pub fn validate(
        &mut self,
        record_id: RecordId,
        validator_id: &str,
        validation_type: ValidationType,
        evidence: &str,
    ) -> Result<ValidationOutcome> {
        let Some(record) = self.records.get_mut(&record_id) else {
            self.audit.append(
                Operation::Validate,
                actor_or_anonymous(validator_id),
                vec![record_id],
                "error: record not found",
            );
            return Err(PoolError::NotFound(record_id));
        };

        if record.agent_id == validator_id {
            tracing::warn!(record_id = %record_id, validator_id, "Self-validation refused");
            self.audit.append(
                Operation::Validate,
                validator_id,
                vec![record_id],
                "rejected: self-validation not permitted",
            );
            return Err(PoolError::SelfValidation {
                record_id,
                validator_id: validator_id.to_string(),
            });
        }

        record.trust.validator_ids.push(validator_id.to_string());
        let counted = if self.config.distinct_validators {
            record.trust.distinct_validators()
        } else {
            record.trust.validator_ids.len()
        };
        let previous_status = record.trust.validation_status;
        let validation_status =
            previous_status.transition(validation_type, counted >= VALIDATION_THRESHOLD);
        record.trust.validation_status = validation_status;
        let validator_count = record.trust.validator_ids.len();
        let producer = record.agent_id.clone();

        let delta = validation_type.reputation_delta();
        if delta != 0.0 {
            self.trust.adjust_reputation(&producer, delta);
        }

        let new_confidence = self
            .rescore(record_id)
            .ok_or(PoolError::NotFound(record_id))?;

        self.audit.append(
            Operation::Validate,
            validator_id,
            vec![record_id],
            format!(
                "{validation_type}: {}",
                evidence_excerpt(evidence, EVIDENCE_EXCERPT_CHARS)
            ),
        );

        tracing::info!(
            record_id = %record_id,
            validator_id,
            validation_type = %validation_type,
            from = %previous_status,
            to = %validation_status,
            confidence = new_confidence,
            "Experience record validated"
        );

        Ok(ValidationOutcome {
            status: OperationStatus::Accepted,
            record_id,
            validation_type,
            previous_status,
            validation_status,
            new_confidence,
            validator_count,
        })
    }

    // ── Feedback ─────────────────────────────────────────────────

    /// Record whether a record helped a downstream consumer and rescore it.
    pub fn record_feedback(
        &mut self,
        record_id: RecordId,
        was_helpful: bool,
        reporter_id: &str,
    ) -> Result<FeedbackReceipt> {
        let reporter = actor_or_anonymous(reporter_id);
        if !self.records.contains_key(&record_id) {
            self.audit.append(
                Operation::Feedback,
                reporter,
                vec![record_id],
                "error: record not found",
            );
            return Err(PoolError::NotFound(record_id));
        }

        let feedback_count = self.trust.record_feedback(record_id, was_helpful);
        let new_confidence = self
            .rescore(record_id)
            .ok_or(PoolError::NotFound(record_id))?;

        let verdict = if was_helpful { "helpful" } else { "not helpful" };
        self.audit
            .append(Operation::Feedback, reporter, vec![record_id], verdict);

        tracing::debug!(
            record_id = %record_id,
            reporter_id = %reporter,
            was_helpful,
            feedback_count,
            confidence = new_confidence,
            "Outcome feedback recorded"
        );

        Ok(FeedbackReceipt {
            status: OperationStatus::Accepted,
            record_id,
            new_confidence,
            feedback_count,
        })
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Recompute and store every record's confidence. Returns the count.
    pub fn refresh_scores(&mut self, actor: &str) -> usize {
        let now = Utc::now();
        let rescored: Vec<(RecordId, f64)> = self
            .records
            .values()
            .map(|xr| {
                let score = self.trust.breakdown_at(xr, self.records.values(), now).composite;
                (xr.id, score)
            })
            .collect();

        for (id, score) in &rescored {
            if let Some(xr) = self.records.get_mut(id) {
                xr.trust.confidence_score = *score;
            }
        }

        let refreshed = rescored.len();
        self.audit.append(
            Operation::Refresh,
            actor_or_anonymous(actor),
            Vec::new(),
            format!("refreshed {refreshed} records"),
        );

        tracing::debug!(refreshed, "Pool scores refreshed");
        refreshed
    }

    /// Recompute and store one record's confidence.
    fn rescore(&mut self, record_id: RecordId) -> Option<f64> {
        let record = self.records.get(&record_id)?;
        let score = self.trust.composite_score(record, self.records.values());
        self.records.get_mut(&record_id)?.trust.confidence_score = score;
        Some(score)
    }

    // ── Inspect ──────────────────────────────────────────────────

    /// Aggregate health snapshot. Never mutates the pool.
    pub fn inspect(&self) -> PoolStats {
        let total = self.records.len();

        let contributing_agents = self
            .records
            .values()
            .map(|xr| xr.agent_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let avg_confidence = if total == 0 {
            0.0
        } else {
            let sum: f64 = self
                .records
                .values()
                .map(|xr| xr.trust.confidence_score)
                .sum();
            round4(sum / total as f64)
        };

        let task_types: BTreeSet<String> = self
            .records
            .values()
            .map(|xr| xr.task_type.clone())
            .collect();

        let mut outcome_distribution: BTreeMap<OutcomeStatus, usize> =
            OutcomeStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut validation_distribution: BTreeMap<ValidationStatus, usize> =
            ValidationStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for xr in self.records.values() {
            *outcome_distribution.entry(xr.outcome_status).or_default() += 1;
            *validation_distribution
                .entry(xr.trust.validation_status)
                .or_default() += 1;
        }

        let last_updated = self
            .order
            .last()
            .and_then(|id| self.records.get(id))
            .map(|xr| xr.timestamp.clone());

        PoolStats {
            pool_id: self.pool_id,
            pool_name: self.config.pool_name.clone(),
            scope: self.config.scope.clone(),
            validation_required: self.config.validation_required,
            conflict_resolution: self.config.conflict_resolution,
            max_records: self.config.max_records,
            total_xrs: total,
            contributing_agents,
            avg_confidence,
            task_types,
            outcome_distribution,
            validation_distribution,
            audit_entries: self.audit.len(),
            last_updated,
        }
    }
}

fn sanitize_recency_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.clamp(0.0, 1.0)
    } else {
        DEFAULT_RECENCY_WEIGHT
    }
}

fn actor_or_anonymous(actor: &str) -> &str {
    if actor.is_empty() {
        ANONYMOUS_CALLER
    } else {
        actor
    }
}

/// First `max_chars` characters of `evidence`, cut on a char boundary.
fn evidence_excerpt(evidence: &str, max_chars: usize) -> &str {
    match evidence.char_indices().nth(max_chars) {
        Some((end, _)) => &evidence[..end],
        None => evidence,
    }
}
