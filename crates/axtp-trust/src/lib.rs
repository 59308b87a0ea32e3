//! axtp-trust: Composite trust scoring for experience records.
//!
//! A record's confidence is a weighted blend of five signals:
//! producer reputation, peer validation, downstream outcome feedback,
//! recency, and consistency with peer records of the same task type.
//! The [`TrustEngine`] owns the mutable inputs to that blend (agent
//! reputations and feedback history); everything else is read from the
//! record and the pool it lives in.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{TrustConfig, TrustWeights};
pub use engine::{TrustBreakdown, TrustEngine};
pub use error::TrustError;

/// Round to 4 decimal places so scores compare deterministically.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
