use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

pub const TOP_VALUES_PER_FIELD: usize = 5;
pub const STRONG_CORRELATION: f64 = 0.5;
pub const CLUSTER_COUNT: usize = 3;
pub const OUTLIER_Z_SCORE: f64 = 3.0;
pub const LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;
pub const MEDIUM_THREAT_LIMIT: usize = 2;
pub const SUSPICIOUS_CONNECTION_COUNT: usize = 100;
pub const PORT_SCAN_COUNT: usize = 50;
pub const DDOS_PACKET_COUNT: usize = 1000;
pub const ERROR_RATE_ALERT: f64 = 0.03;
pub const EMIT_INTERVAL_SECS: u64 = 5;

/// Every tunable threshold used by the analyzers. Missing keys in a config
/// file fall back to the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_values_per_field: usize,
    pub strong_correlation: f64,
    pub cluster_count: usize,
    /// Fixed seed for centroid sampling; `None` draws from OS entropy.
    pub cluster_seed: Option<u64>,
    pub outlier_z_score: f64,
    pub large_file_bytes: u64,
    pub medium_threat_limit: usize,
    pub suspicious_connection_count: usize,
    pub port_scan_count: usize,
    pub ddos_packet_count: usize,
    pub error_rate_alert: f64,
    pub emit_interval_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_values_per_field: TOP_VALUES_PER_FIELD,
            strong_correlation: STRONG_CORRELATION,
            cluster_count: CLUSTER_COUNT,
            cluster_seed: None,
            outlier_z_score: OUTLIER_Z_SCORE,
            large_file_bytes: LARGE_FILE_BYTES,
            medium_threat_limit: MEDIUM_THREAT_LIMIT,
            suspicious_connection_count: SUSPICIOUS_CONNECTION_COUNT,
            port_scan_count: PORT_SCAN_COUNT,
            ddos_packet_count: DDOS_PACKET_COUNT,
            error_rate_alert: ERROR_RATE_ALERT,
            emit_interval_secs: EMIT_INTERVAL_SECS,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
