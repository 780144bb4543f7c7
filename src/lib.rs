pub mod error;
pub mod config;
pub mod record;
pub mod stats;
pub mod schema;
pub mod correlation;
pub mod patterns;
pub mod clustering;
pub mod anomaly;
pub mod trend;
pub mod parser;
pub mod logs;
pub mod threat;
pub mod network;
pub mod analyzers;
pub mod stream;
pub mod report;

pub use analyzers::{AnalysisKind, AnalysisOutput, AnalyzerRegistry};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use record::{Batch, Record};
