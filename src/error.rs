use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Rejected before any analyzer runs (missing or non-array batch, missing upload).
    #[error("invalid input: {0}")]
    Input(String),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("report not found: {0}")]
    ReportNotFound(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
