//! Governance configuration for an experience pool.

use axtp_core::ConflictResolution;
use axtp_trust::TrustConfig;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};

/// Top-level pool configuration.
///
/// Loaded from the `axtp.toml` `[pool]` section or `AXTP_POOL__`
/// environment variables. Immutable once the pool is built.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Human-readable pool name.
    #[serde(default = "default_pool_name")]
    pub pool_name: String,

    /// Visibility label (e.g. "global", "organization", "team").
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Whether consumers are expected to favor validated records.
    #[serde(default = "default_true")]
    pub validation_required: bool,

    /// Confidence floor applied by retrieval when the caller gives none.
    #[serde(default = "default_min_confidence")]
    pub min_confidence_threshold: f64,

    /// Arbitration policy tag for conflicting records.
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,

    /// Maximum number of records held; deposits beyond it evict.
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Require distinct validator ids before a record becomes validated.
    #[serde(default = "default_true")]
    pub distinct_validators: bool,

    /// Optional JSON-lines file that mirrors the audit log.
    #[serde(default)]
    pub audit_path: Option<String>,

    /// Trust scoring weights and decay.
    #[serde(default)]
    pub trust: TrustConfig,
}

fn default_pool_name() -> String {
    "default".to_string()
}

fn default_scope() -> String {
    "global".to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_confidence() -> f64 {
    0.3
}

fn default_max_records() -> usize {
    10_000
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_name: default_pool_name(),
            scope: default_scope(),
            validation_required: default_true(),
            min_confidence_threshold: default_min_confidence(),
            conflict_resolution: ConflictResolution::default(),
            max_records: default_max_records(),
            distinct_validators: default_true(),
            audit_path: None,
            trust: TrustConfig::default(),
        }
    }
}

impl PoolConfig {
    /// Shorthand for a named pool with default governance.
    pub fn named(pool_name: &str) -> Self {
        Self {
            pool_name: pool_name.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(PoolError::Config("max_records must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence_threshold) {
            return Err(PoolError::Config(format!(
                "min_confidence_threshold must be within [0, 1], got {}",
                self.min_confidence_threshold
            )));
        }
        self.trust.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();
        assert_eq!(config.pool_name, "default");
        assert_eq!(config.scope, "global");
        assert!(config.validation_required);
        assert_eq!(config.min_confidence_threshold, 0.3);
        assert_eq!(config.conflict_resolution, ConflictResolution::LatestWins);
        assert_eq!(config.max_records, 10_000);
        assert!(config.distinct_validators);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = PoolConfig {
            max_records: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PoolError::Config(_))));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let config = PoolConfig {
            min_confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PoolError::Config(_))));

        let config = PoolConfig {
            min_confidence_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: PoolConfig = serde_json::from_str(
            r#"{"pool_name": "API Integrations", "conflict_resolution": "admin_review", "max_records": 50}"#,
        )
        .unwrap();
        assert_eq!(config.pool_name, "API Integrations");
        assert_eq!(config.conflict_resolution, ConflictResolution::AdminReview);
        assert_eq!(config.max_records, 50);
        assert_eq!(config.scope, "global");
        assert_eq!(config.trust, TrustConfig::default());
    }
}
