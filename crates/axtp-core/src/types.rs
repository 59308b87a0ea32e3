//! Identifiers and closed status enums shared by every AXTP component.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ── Identifiers ──────────────────────────────────────────────────

/// Unique identifier for an experience record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CoreError::InvalidRecordId(s.to_string()))
    }
}

/// Unique identifier for an experience pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PoolId(pub Uuid);

impl PoolId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Status Enums ─────────────────────────────────────────────────

/// How the producing agent's task ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    PartialSuccess,
    Failure,
    Aborted,
}

impl OutcomeStatus {
    pub const ALL: [OutcomeStatus; 4] = [
        Self::Success,
        Self::PartialSuccess,
        Self::Failure,
        Self::Aborted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialSuccess => "partial_success",
            Self::Failure => "failure",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "outcome status",
                value: s.to_string(),
            })
    }
}

/// Peer-validation state of a record.
///
/// `Pending` is initial. Neither `Validated` nor `Disputed` is terminal, but
/// only a dispute moves a record between them: a disputed record is never
/// promoted back automatically.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Validated,
    Disputed,
}

impl ValidationStatus {
    pub const ALL: [ValidationStatus; 3] = [Self::Pending, Self::Validated, Self::Disputed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Disputed => "disputed",
        }
    }

    /// Next status after a validation action.
    ///
    /// `threshold_met` says whether the record carries enough validators
    /// (counting the one being applied) to be promoted by a confirmation.
    pub fn transition(self, action: ValidationType, threshold_met: bool) -> ValidationStatus {
        match (self, action) {
            (_, ValidationType::Dispute) => Self::Disputed,
            (Self::Pending, ValidationType::Confirm) if threshold_met => Self::Validated,
            (current, ValidationType::Confirm) => current,
            (current, ValidationType::Amend) => current,
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of peer validation being applied to a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    Confirm,
    Dispute,
    /// Annotation only; never changes status.
    Amend,
}

impl ValidationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Dispute => "dispute",
            Self::Amend => "amend",
        }
    }

    /// Reputation adjustment applied to the producing agent.
    pub fn reputation_delta(&self) -> f64 {
        match self {
            Self::Confirm => 0.05,
            Self::Dispute => -0.05,
            Self::Amend => 0.0,
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm" => Ok(Self::Confirm),
            "dispute" => Ok(Self::Dispute),
            "amend" => Ok(Self::Amend),
            _ => Err(CoreError::UnknownVariant {
                kind: "validation type",
                value: s.to_string(),
            }),
        }
    }
}

/// Arbitration policy tag for conflicting records.
///
/// Carried in pool configuration and reported by inspection; no operation
/// arbitrates on it yet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    #[default]
    LatestWins,
    Consensus,
    AdminReview,
}

/// Discriminated result of a pool operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Accepted,
    Rejected,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_status_serializes_snake_case() {
        let json = serde_json::to_string(&OutcomeStatus::PartialSuccess).unwrap();
        assert_eq!(json, "\"partial_success\"");
        assert_eq!(
            "partial_success".parse::<OutcomeStatus>().unwrap(),
            OutcomeStatus::PartialSuccess
        );
        assert!("partial".parse::<OutcomeStatus>().is_err());
    }

    #[test]
    fn confirm_promotes_pending_only_at_threshold() {
        let s = ValidationStatus::Pending;
        assert_eq!(
            s.transition(ValidationType::Confirm, false),
            ValidationStatus::Pending
        );
        assert_eq!(
            s.transition(ValidationType::Confirm, true),
            ValidationStatus::Validated
        );
    }

    #[test]
    fn dispute_wins_from_every_state() {
        for s in ValidationStatus::ALL {
            assert_eq!(
                s.transition(ValidationType::Dispute, false),
                ValidationStatus::Disputed
            );
        }
    }

    #[test]
    fn disputed_is_not_promoted_by_confirm() {
        assert_eq!(
            ValidationStatus::Disputed.transition(ValidationType::Confirm, true),
            ValidationStatus::Disputed
        );
    }

    #[test]
    fn amend_never_changes_status() {
        for s in ValidationStatus::ALL {
            assert_eq!(s.transition(ValidationType::Amend, true), s);
        }
    }

    #[test]
    fn record_id_parses_uuid() {
        let id = RecordId::new();
        assert_eq!(id.to_string().parse::<RecordId>().unwrap(), id);
        assert_eq!(
            "not-a-uuid".parse::<RecordId>(),
            Err(CoreError::InvalidRecordId("not-a-uuid".to_string()))
        );
    }
}
