use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::Result;
use crate::parser;

pub const SUSPICIOUS_KEYWORDS: [&str; 8] = [
    "sql injection",
    "xss",
    "csrf",
    "brute force",
    "ddos",
    "unauthorized access",
    "failed login",
    "suspicious activity",
];

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").unwrap()
});

static RE_TIME_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}|\d{2}:\d{2}:\d{2}").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Error,
    Warning,
    Info,
}

/// A parsed entry together with everything derived from its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub raw: Value,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_token: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousHit {
    pub pattern: String,
    pub log: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogAnalysis {
    pub total_entries: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    #[serde(rename = "uniqueIPs")]
    pub unique_ips: Vec<String>,
    pub time_distribution: BTreeMap<String, usize>,
    pub suspicious_patterns: Vec<SuspiciousHit>,
}

/// First match wins: error markers outrank warning markers.
pub fn classify_level(lower: &str) -> LogLevel {
    if lower.contains("error") || lower.contains("hata") {
        LogLevel::Error
    } else if lower.contains("warning") || lower.contains("uyarı") {
        LogLevel::Warning
    } else {
        LogLevel::Info
    }
}

pub fn extract_ipv4(text: &str) -> Option<String> {
    RE_IPV4.find(text).map(|m| m.as_str().to_string())
}

/// First `YYYY-MM-DD` or `HH:MM:SS` token.
pub fn extract_time_token(text: &str) -> Option<String> {
    RE_TIME_TOKEN.find(text).map(|m| m.as_str().to_string())
}

pub fn matched_keywords(lower: &str) -> Vec<String> {
    SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .map(|k| k.to_string())
        .collect()
}

/// Scans the lower-cased JSON rendering of the entry.
pub fn inspect_entry(raw: &Value) -> LogEntry {
    let lower = raw.to_string().to_lowercase();
    LogEntry {
        raw: raw.clone(),
        level: classify_level(&lower),
        ip: extract_ipv4(&lower),
        time_token: extract_time_token(&lower),
        keywords: matched_keywords(&lower),
    }
}

pub fn analyze_logs(entries: &[Value]) -> LogAnalysis {
    let mut out = LogAnalysis { total_entries: entries.len(), ..Default::default() };
    let mut seen_ips: HashSet<String> = HashSet::new();
    for raw in entries {
        let entry = inspect_entry(raw);
        match entry.level {
            LogLevel::Error => out.error_count += 1,
            LogLevel::Warning => out.warning_count += 1,
            LogLevel::Info => out.info_count += 1,
        }
        if let Some(ip) = entry.ip {
            if seen_ips.insert(ip.clone()) {
                out.unique_ips.push(ip);
            }
        }
        if let Some(token) = entry.time_token {
            let day: String = token.chars().take(10).collect();
            *out.time_distribution.entry(day).or_insert(0) += 1;
        }
        for pattern in entry.keywords {
            out.suspicious_patterns.push(SuspiciousHit { pattern, log: raw.clone() });
        }
    }
    debug!(entries = out.total_entries, errors = out.error_count, suspicious = out.suspicious_patterns.len(), "log analysis complete");
    out
}

/// Parse an upload by extension, then analyze it. Malformed JSON is an error.
pub fn analyze_upload(filename: &str, bytes: &[u8]) -> Result<LogAnalysis> {
    let entries = parser::parse_upload(filename, bytes)?;
    Ok(analyze_logs(&entries))
}
