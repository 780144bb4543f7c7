use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::correlation::{compute_correlations, CorrelationEdge};
use crate::record::{scalar_key, Record, Tally};
use crate::schema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFrequencies {
    pub field: String,
    pub values: Vec<ValueCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    pub total_records: usize,
    pub unique_fields: usize,
    pub strong_correlations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub frequent_items: Vec<FieldFrequencies>,
    pub correlations: Vec<CorrelationEdge>,
    pub summary: PatternSummary,
}

/// Value tallies per field, fields in first-seen order across the batch.
pub fn frequent_items(batch: &[Record], top_n: usize) -> Vec<FieldFrequencies> {
    let mut order: Vec<String> = Vec::new();
    let mut tallies: std::collections::HashMap<String, Tally> = std::collections::HashMap::new();
    for rec in batch {
        for (field, value) in rec {
            let tally = tallies.entry(field.clone()).or_insert_with(|| {
                order.push(field.clone());
                Tally::new()
            });
            tally.add(&scalar_key(value));
        }
    }
    order
        .into_iter()
        .map(|field| {
            let values = tallies
                .get(&field)
                .map(|t| t.top(top_n))
                .unwrap_or_default()
                .into_iter()
                .map(|(value, count)| ValueCount { value, count })
                .collect();
            FieldFrequencies { field, values }
        })
        .collect()
}

pub fn analyze_patterns(batch: &[Record], cfg: &AnalysisConfig) -> PatternAnalysis {
    let frequent = frequent_items(batch, cfg.top_values_per_field);
    let correlations = if batch.len() > 1 {
        let fields = schema::numeric_fields(batch);
        compute_correlations(batch, &fields, cfg.strong_correlation)
    } else {
        Vec::new()
    };
    let summary = PatternSummary {
        total_records: batch.len(),
        unique_fields: frequent.len(),
        strong_correlations: correlations.len(),
    };
    debug!(records = summary.total_records, fields = summary.unique_fields, correlations = summary.strong_correlations, "pattern analysis complete");
    PatternAnalysis { frequent_items: frequent, correlations, summary }
}
