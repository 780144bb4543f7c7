use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::record::{numeric_series, Record};
use crate::{schema, stats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlier {
    pub field: String,
    pub value: f64,
    /// Position of the originating record in the batch.
    pub index: usize,
    pub z_score: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalySummary {
    pub total_records: usize,
    pub outliers_found: usize,
    pub fields_analyzed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAnalysis {
    pub outliers: Vec<Outlier>,
    pub summary: AnomalySummary,
}

/// Values of one series whose z-score exceeds `threshold`. A constant series
/// (zero stddev) never produces outliers.
pub fn sigma_outliers(field: &str, series: &[(usize, f64)], threshold: f64) -> Vec<Outlier> {
    let values: Vec<f64> = series.iter().map(|(_, x)| *x).collect();
    let std = stats::stddev(&values);
    if std == 0.0 || !std.is_finite() {
        return Vec::new();
    }
    let mean = stats::mean(&values);
    series
        .iter()
        .filter_map(|&(index, value)| {
            let z_score = ((value - mean) / std).abs();
            (z_score > threshold).then(|| Outlier {
                field: field.to_string(),
                value,
                index,
                z_score,
                description: format!("unusual value in field {field}: {value}"),
            })
        })
        .collect()
}

pub fn detect_anomalies(batch: &[Record], cfg: &AnalysisConfig) -> AnomalyAnalysis {
    let fields = schema::numeric_fields(batch);
    let mut outliers = Vec::new();
    for field in &fields {
        let series = numeric_series(batch, field);
        outliers.extend(sigma_outliers(field, &series, cfg.outlier_z_score));
    }
    let summary = AnomalySummary {
        total_records: batch.len(),
        outliers_found: outliers.len(),
        fields_analyzed: fields.len(),
    };
    debug!(fields = summary.fields_analyzed, outliers = summary.outliers_found, "anomaly detection complete");
    AnomalyAnalysis { outliers, summary }
}
