//! Best-effort schema inference over a batch. Only the first record decides
//! which fields are numeric or temporal; later records are not consulted.

use serde::{Deserialize, Serialize};

use crate::record::Record;

const TIME_NAME_HINTS: [&str; 3] = ["time", "date", "timestamp"];

/// Fields whose value on the first record is a number, in field order.
pub fn numeric_fields(batch: &[Record]) -> Vec<String> {
    match batch.first() {
        Some(first) => first
            .iter()
            .filter(|(_, v)| v.is_number())
            .map(|(k, _)| k.clone())
            .collect(),
        None => Vec::new(),
    }
}

pub fn is_time_field_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    TIME_NAME_HINTS.iter().any(|hint| lower.contains(hint))
}

pub fn infer_time_field(batch: &[Record]) -> Option<String> {
    batch.first()?.keys().find(|k| is_time_field_name(k)).cloned()
}

pub fn infer_value_field(batch: &[Record]) -> Option<String> {
    numeric_fields(batch).into_iter().next()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendFields {
    pub time_field: String,
    pub value_field: String,
}

/// Picks the time axis and the measured value for trend analysis.
pub fn infer_trend_fields(batch: &[Record]) -> Option<TrendFields> {
    Some(TrendFields {
        time_field: infer_time_field(batch)?,
        value_field: infer_value_field(batch)?,
    })
}
