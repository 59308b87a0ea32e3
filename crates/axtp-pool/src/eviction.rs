//! Capacity eviction policy.
//!
//! The victim is the record with the smallest `(confidence_score, timestamp)`:
//! least trusted first, oldest as tie-break. Timestamps compare as instants;
//! unparseable ones order before every parseable one, then by raw text.

use std::cmp::Ordering;

use axtp_core::{ExperienceRecord, RecordId};
use chrono::{DateTime, Utc};

/// Pick the record to evict. Among exact ties the first one yielded wins.
pub fn select_victim<'a, I>(records: I) -> Option<RecordId>
where
    I: IntoIterator<Item = &'a ExperienceRecord>,
{
    records.into_iter().min_by(|a, b| eviction_order(a, b)).map(|xr| xr.id)
}

fn eviction_order(a: &ExperienceRecord, b: &ExperienceRecord) -> Ordering {
    a.trust
        .confidence_score
        .total_cmp(&b.trust.confidence_score)
        .then_with(|| parse_timestamp(a).cmp(&parse_timestamp(b)))
        .then_with(|| a.timestamp.cmp(&b.timestamp))
}

fn parse_timestamp(xr: &ExperienceRecord) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&xr.timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
