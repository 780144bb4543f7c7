//! Report artifacts on disk, named `{kind}_{millis}.{json|csv}`.

use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: String,
    pub name: String,
    pub format: ReportFormat,
    pub size: u64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the payload and returns the report id.
    pub fn save<T: Serialize>(&self, kind: &str, payload: &T, format: ReportFormat) -> Result<String> {
        std::fs::create_dir_all(&self.dir)?;
        let value = serde_json::to_value(payload)?;
        let mut millis = Utc::now().timestamp_millis();
        let (id, path) = loop {
            let id = format!("{kind}_{millis}");
            let path = self.dir.join(format!("{id}.{}", format.extension()));
            if !path.exists() { break (id, path); }
            millis += 1;
        };
        let content = match format {
            ReportFormat::Json => serde_json::to_string_pretty(&value)?,
            ReportFormat::Csv => to_csv(kind, &value)?,
        };
        std::fs::write(&path, content)?;
        debug!(id = %id, path = %path.display(), "report saved");
        Ok(id)
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<StoredReport>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut out: Vec<(std::time::SystemTime, StoredReport)> = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(format) = path.extension().and_then(|e| e.to_str()).and_then(ReportFormat::from_extension) else {
                continue;
            };
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let meta = entry.metadata()?;
            let modified = meta.modified()?;
            let created_at = DateTime::<Utc>::from(modified).to_rfc3339_opts(SecondsFormat::Secs, true);
            let name = entry.file_name().to_string_lossy().into_owned();
            out.push((modified, StoredReport { id, name, format, size: meta.len(), created_at }));
        }
        out.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.id.cmp(&a.1.id)));
        Ok(out.into_iter().map(|(_, r)| r).collect())
    }

    /// Path and format of a stored report; JSON is preferred when both exist.
    /// Ids are bare file stems and never address anything outside the store.
    pub fn locate(&self, id: &str) -> Result<(PathBuf, ReportFormat)> {
        if id.is_empty() || id.contains(&['/', '\\'][..]) || id.contains("..") {
            return Err(AnalysisError::Input(format!("invalid report id: {id}")));
        }
        for format in [ReportFormat::Json, ReportFormat::Csv] {
            let path = self.dir.join(format!("{id}.{}", format.extension()));
            if path.is_file() {
                return Ok((path, format));
            }
        }
        Err(AnalysisError::ReportNotFound(id.to_string()))
    }

    /// Contents of a stored report.
    pub fn read(&self, id: &str) -> Result<String> {
        let (path, _) = self.locate(id)?;
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Header row plus the payload's `summary` object as key/value rows.
pub fn to_csv(kind: &str, value: &Value) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    wtr.write_record(["Report Type", "Generated At"])?;
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    wtr.write_record([kind, generated_at.as_str()])?;
    if let Some(Value::Object(summary)) = value.get("summary") {
        wtr.write_record([""])?;
        wtr.write_record(["Summary"])?;
        for (k, v) in summary {
            let cell = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            wtr.write_record([k.as_str(), cell.as_str()])?;
        }
    }
    let bytes = wtr.into_inner().map_err(|e| AnalysisError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
