//! Async handle for sharing one pool between many agent tasks.
//!
//! Every operation takes the lock for its whole duration, so operations are
//! linearizable: a retrieve either sees a concurrent deposit in full or not
//! at all, and audit sequence numbers follow lock order.

use std::sync::Arc;

use axtp_core::{ExperienceRecord, RecordId, ValidationType};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::types::{
    DepositReceipt, FeedbackReceipt, PoolStats, RetrieveQuery, RetrievedExperience,
    ValidationOutcome,
};
use crate::{ExperiencePool, PoolConfig};

/// Cloneable handle to an [`ExperiencePool`] behind a tokio mutex.
#[derive(Debug, Clone)]
pub struct SharedPool {
    inner: Arc<Mutex<ExperiencePool>>,
}

impl SharedPool {
    pub fn new(pool: ExperiencePool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Build the pool from `config` and wrap it.
    pub fn from_config(config: PoolConfig) -> Result<Self> {
        Ok(Self::new(ExperiencePool::new(config)?))
    }

    pub async fn deposit(&self, record: ExperienceRecord) -> Result<DepositReceipt> {
        self.inner.lock().await.deposit(record)
    }

    pub async fn retrieve(&self, query: &RetrieveQuery) -> Vec<RetrievedExperience> {
        self.inner.lock().await.retrieve(query)
    }

    pub async fn validate(
        &self,
        record_id: RecordId,
        validator_id: &str,
        validation_type: ValidationType,
        evidence: &str,
    ) -> Result<ValidationOutcome> {
        self.inner
            .lock()
            .await
            .validate(record_id, validator_id, validation_type, evidence)
    }

    pub async fn record_feedback(
        &self,
        record_id: RecordId,
        was_helpful: bool,
        reporter_id: &str,
    ) -> Result<FeedbackReceipt> {
        self.inner
            .lock()
            .await
            .record_feedback(record_id, was_helpful, reporter_id)
    }

    pub async fn refresh_scores(&self, actor: &str) -> usize {
        self.inner.lock().await.refresh_scores(actor)
    }

    pub async fn inspect(&self) -> PoolStats {
        self.inner.lock().await.inspect()
    }

    /// Run a read-only closure against the pool under the lock.
    pub async fn with_pool<T>(&self, f: impl FnOnce(&ExperiencePool) -> T) -> T {
        let pool = self.inner.lock().await;
        f(&pool)
    }
}
