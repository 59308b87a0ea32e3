//! Trust scoring configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};

/// Tolerance when checking that the weights sum to 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative weight of each trust signal. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    #[serde(default = "default_reputation")]
    pub reputation: f64,
    #[serde(default = "default_validation")]
    pub validation: f64,
    #[serde(default = "default_outcome")]
    pub outcome: f64,
    #[serde(default = "default_recency")]
    pub recency: f64,
    #[serde(default = "default_consistency")]
    pub consistency: f64,
}

fn default_reputation() -> f64 {
    0.30
}

fn default_validation() -> f64 {
    0.25
}

fn default_outcome() -> f64 {
    0.25
}

fn default_recency() -> f64 {
    0.10
}

fn default_consistency() -> f64 {
    0.10
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            reputation: default_reputation(),
            validation: default_validation(),
            outcome: default_outcome(),
            recency: default_recency(),
            consistency: default_consistency(),
        }
    }
}

impl TrustWeights {
    pub fn sum(&self) -> f64 {
        self.reputation + self.validation + self.outcome + self.recency + self.consistency
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("reputation", self.reputation),
            ("validation", self.validation),
            ("outcome", self.outcome),
            ("recency", self.recency),
            ("consistency", self.consistency),
        ]
    }
}

/// Scoring configuration, fixed when the engine is built.
///
/// Loaded from the `[pool.trust]` section of `axtp.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustConfig {
    #[serde(default)]
    pub weights: TrustWeights,

    /// Exponential decay per day of age (default 0.01).
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
}

fn default_decay_rate() -> f64 {
    0.01
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            weights: TrustWeights::default(),
            decay_rate: default_decay_rate(),
        }
    }
}

impl TrustConfig {
    /// Reject weights that are negative, non-finite or do not sum to 1,
    /// and decay rates that are negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        for (signal, value) in self.weights.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(TrustError::InvalidWeight { signal, value });
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(TrustError::WeightSum { sum });
        }

        if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
            return Err(TrustError::InvalidDecayRate(self.decay_rate));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrustConfig::default();
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(config.decay_rate, 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_sum() {
        let config = TrustConfig {
            weights: TrustWeights {
                reputation: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrustError::WeightSum { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let config = TrustConfig {
            weights: TrustWeights {
                reputation: 0.6,
                validation: -0.05,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(TrustError::InvalidWeight {
                signal: "validation",
                value: -0.05
            })
        );
    }

    #[test]
    fn test_rejects_nan_decay() {
        let config = TrustConfig {
            decay_rate: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrustError::InvalidDecayRate(_))
        ));
    }

    #[test]
    fn test_partial_weights_fill_defaults() {
        let config: TrustConfig =
            serde_json::from_str(r#"{"weights": {"recency": 0.10}, "decay_rate": 0.05}"#).unwrap();
        assert_eq!(config.weights, TrustWeights::default());
        assert_eq!(config.decay_rate, 0.05);
    }
}
