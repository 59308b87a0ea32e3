//! Error types for the axtp-trust crate.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TrustError {
    #[error("Invalid weight for {signal}: {value} (must be finite and non-negative)")]
    InvalidWeight { signal: &'static str, value: f64 },

    #[error("Trust weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("Invalid decay rate: {0} (must be finite and non-negative)")]
    InvalidDecayRate(f64),
}

pub type Result<T> = std::result::Result<T, TrustError>;
