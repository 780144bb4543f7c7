use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Csv,
    Json,
    Text,
}

impl LogFormat {
    /// Chosen by file extension; anything that is not `.csv` or `.json` is text.
    pub fn from_filename(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => LogFormat::Csv,
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Turns an uploaded log file into structured entries.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<Vec<Value>> {
    let format = LogFormat::from_filename(filename);
    let entries = match format {
        LogFormat::Csv => parse_csv(bytes)?,
        LogFormat::Json => parse_json(bytes)?,
        LogFormat::Text => parse_text(bytes),
    };
    debug!(file = filename, ?format, entries = entries.len(), "parsed log upload");
    Ok(entries)
}

/// Header row names the fields; short rows get empty strings for the rest.
/// Cells are decoded lossily, so legacy encodings never fail the upload.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<Value>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let mut out = Vec::new();
    for row in rdr.byte_records() {
        let row = row?;
        let mut obj = Map::new();
        for (i, h) in headers.iter().enumerate() {
            let cell = row.get(i).map(String::from_utf8_lossy).unwrap_or_default();
            obj.insert(h.clone(), Value::String(cell.into_owned()));
        }
        out.push(Value::Object(obj));
    }
    Ok(out)
}

/// The whole stream must be one JSON document. An array yields one entry per
/// element; any other value is a single entry.
pub fn parse_json(bytes: &[u8]) -> Result<Vec<Value>> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}

pub fn parse_text(bytes: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut obj = Map::new();
            obj.insert("message".to_string(), Value::String(line.to_string()));
            Value::Object(obj)
        })
        .collect()
}
