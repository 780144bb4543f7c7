//! Content-based threat scoring for uploaded files.

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

pub type RiskLevel = Severity;

pub const SUSPICIOUS_EXTENSIONS: [&str; 6] = [".exe", ".bat", ".cmd", ".scr", ".pif", ".com"];

struct ThreatPattern {
    name: &'static str,
    severity: Severity,
    regex: Regex,
}

static THREAT_PATTERNS: Lazy<Vec<ThreatPattern>> = Lazy::new(|| {
    let table: [(&str, &str, Severity); 10] = [
        (r"eval\s*\(", "JavaScript Code Injection", Severity::High),
        (r"(?i)<script.*?>.*?</script>", "XSS Script Tag", Severity::High),
        (r"document\.write\s*\(", "DOM Manipulation", Severity::Medium),
        (r"innerHTML\s*=", "InnerHTML Assignment", Severity::Medium),
        (r"onload\s*=", "Event Handler Injection", Severity::Medium),
        (r"onclick\s*=", "Click Event Injection", Severity::Medium),
        (r"(?i)javascript:", "JavaScript Protocol", Severity::High),
        (r"data:text/html", "Data URI HTML", Severity::High),
        (r"base64", "Base64 Encoding", Severity::Low),
        (r"\\x[0-9a-fA-F]{2}", "Hex Encoding", Severity::Medium),
    ];
    table
        .into_iter()
        .map(|(re, name, severity)| ThreatPattern { name, severity, regex: Regex::new(re).unwrap() })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatFinding {
    pub name: String,
    pub severity: Severity,
    pub count: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatReport {
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub hash: String,
    pub scan_timestamp: String,
    pub threats: Vec<ThreatFinding>,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Lower-cased extension including the dot, or an empty string.
pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// One finding per pattern that matches at least once, in table order.
pub fn match_content(bytes: &[u8]) -> Vec<ThreatFinding> {
    THREAT_PATTERNS
        .iter()
        .filter_map(|p| {
            let count = p.regex.find_iter(bytes).count();
            (count > 0).then(|| ThreatFinding {
                name: p.name.to_string(),
                severity: p.severity,
                count,
                description: format!("{} pattern detected {} time(s)", p.name, count),
            })
        })
        .collect()
}

pub fn risk_level(threats: &[ThreatFinding], medium_limit: usize) -> RiskLevel {
    let high = threats.iter().filter(|t| t.severity == Severity::High).count();
    let medium = threats.iter().filter(|t| t.severity == Severity::Medium).count();
    if high > 0 {
        Severity::High
    } else if medium > medium_limit {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn recommendations(risk: RiskLevel) -> Vec<String> {
    let advice: &[&str] = match risk {
        Severity::High => &[
            "Quarantine the file",
            "Run a full antivirus scan",
            "Test the file in an isolated environment",
        ],
        Severity::Medium => &["Review the file carefully", "Test the file in a sandbox"],
        Severity::Low => &["File appears safe"],
    };
    advice.iter().map(|s| s.to_string()).collect()
}

/// Scans raw bytes. Content that is not UTF-8 is still matched byte-wise and
/// is additionally reported as a non-text finding.
pub fn scan_bytes(file_name: &str, bytes: &[u8], cfg: &AnalysisConfig) -> ThreatReport {
    let file_size = bytes.len() as u64;
    let file_type = file_extension(file_name);
    let mut threats = match_content(bytes);

    if std::str::from_utf8(bytes).is_err() {
        warn!(file = file_name, "content is not valid UTF-8; matched at byte level");
        threats.push(ThreatFinding {
            name: "Non-Text Content".to_string(),
            severity: Severity::Low,
            count: 1,
            description: "File is not valid UTF-8 text; patterns were matched on raw bytes".to_string(),
        });
    }
    if file_size > cfg.large_file_bytes {
        threats.push(ThreatFinding {
            name: "Large File Size".to_string(),
            severity: Severity::Low,
            count: 1,
            description: format!("File is larger than {} bytes", cfg.large_file_bytes),
        });
    }
    if SUSPICIOUS_EXTENSIONS.contains(&file_type.as_str()) {
        threats.push(ThreatFinding {
            name: "Suspicious File Extension".to_string(),
            severity: Severity::High,
            count: 1,
            description: format!("Suspicious file extension: {file_type}"),
        });
    }

    let risk = risk_level(&threats, cfg.medium_threat_limit);
    debug!(file = file_name, threats = threats.len(), ?risk, "threat scan complete");
    ThreatReport {
        file_name: file_name.to_string(),
        file_size,
        file_type,
        hash: sha256_hex(bytes),
        scan_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        threats,
        risk_level: risk,
        recommendations: recommendations(risk),
    }
}
