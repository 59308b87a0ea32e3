use thiserror::Error;

/// Errors raised while interpreting AXTP core values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),
}
