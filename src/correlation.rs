use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::record::{numeric_series, Record};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationEdge {
    pub field_a: String,
    pub field_b: String,
    pub coefficient: f64,
}

/// Pearson coefficient between two fields. Each field is filtered to its own
/// numeric values, so a field with gaps yields a length mismatch and thus 0.
pub fn field_correlation(batch: &[Record], a: &str, b: &str) -> f64 {
    let xs: Vec<f64> = numeric_series(batch, a).into_iter().map(|(_, x)| x).collect();
    let ys: Vec<f64> = numeric_series(batch, b).into_iter().map(|(_, y)| y).collect();
    stats::pearson(&xs, &ys)
}

/// Every ordered pair of distinct fields with |r| above `min_strength`.
/// (A, B) and (B, A) are both reported.
pub fn compute_correlations(batch: &[Record], fields: &[String], min_strength: f64) -> Vec<CorrelationEdge> {
    iproduct!(fields.iter(), fields.iter())
        .filter(|(a, b)| a != b)
        .filter_map(|(a, b)| {
            let coefficient = field_correlation(batch, a, b);
            (coefficient.abs() > min_strength).then(|| CorrelationEdge {
                field_a: a.clone(),
                field_b: b.clone(),
                coefficient,
            })
        })
        .collect()
}
