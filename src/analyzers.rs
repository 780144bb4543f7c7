use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::anomaly::{detect_anomalies, AnomalyAnalysis};
use crate::clustering::{analyze_clusters, ClusterAnalysis};
use crate::config::AnalysisConfig;
use crate::patterns::{analyze_patterns, PatternAnalysis};
use crate::record::Record;
use crate::trend::{analyze_trend, TrendAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Pattern,
    Clustering,
    Anomaly,
    Trend,
    Comprehensive,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Pattern => "pattern",
            AnalysisKind::Clustering => "clustering",
            AnalysisKind::Anomaly => "anomaly",
            AnalysisKind::Trend => "trend",
            AnalysisKind::Comprehensive => "comprehensive",
        }
    }

    /// Unknown or missing selectors mean "run everything".
    pub fn from_selector(selector: Option<&str>) -> Self {
        selector.and_then(|s| s.parse().ok()).unwrap_or(AnalysisKind::Comprehensive)
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pattern" => Ok(AnalysisKind::Pattern),
            "clustering" => Ok(AnalysisKind::Clustering),
            "anomaly" => Ok(AnalysisKind::Anomaly),
            "trend" => Ok(AnalysisKind::Trend),
            "comprehensive" => Ok(AnalysisKind::Comprehensive),
            other => Err(format!("unknown analysis kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveSummary {
    pub total_records: usize,
    pub analysis_types: Vec<AnalysisKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub pattern: PatternAnalysis,
    pub clustering: ClusterAnalysis,
    pub anomaly: AnomalyAnalysis,
    pub trend: TrendAnalysis,
    pub summary: ComprehensiveSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    Comprehensive(Box<ComprehensiveAnalysis>),
    Pattern(PatternAnalysis),
    Clustering(ClusterAnalysis),
    Anomaly(AnomalyAnalysis),
    Trend(TrendAnalysis),
}

impl AnalysisOutput {
    pub fn merge_into(self, results: &mut ComprehensiveAnalysis) {
        match self {
            AnalysisOutput::Pattern(p) => results.pattern = p,
            AnalysisOutput::Clustering(c) => results.clustering = c,
            AnalysisOutput::Anomaly(a) => results.anomaly = a,
            AnalysisOutput::Trend(t) => results.trend = t,
            AnalysisOutput::Comprehensive(all) => *results = *all,
        }
    }
}

/// Trait that every batch analyzer implements
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalysisKind;
    fn analyze(&self, batch: &[Record], cfg: &AnalysisConfig) -> AnalysisOutput;
}

pub struct PatternAnalyzer;
pub struct ClusterAnalyzer;
pub struct AnomalyDetector;
pub struct TrendAnalyzer;

impl Analyzer for PatternAnalyzer {
    fn kind(&self) -> AnalysisKind { AnalysisKind::Pattern }
    fn analyze(&self, batch: &[Record], cfg: &AnalysisConfig) -> AnalysisOutput {
        AnalysisOutput::Pattern(analyze_patterns(batch, cfg))
    }
}

impl Analyzer for ClusterAnalyzer {
    fn kind(&self) -> AnalysisKind { AnalysisKind::Clustering }
    fn analyze(&self, batch: &[Record], cfg: &AnalysisConfig) -> AnalysisOutput {
        AnalysisOutput::Clustering(analyze_clusters(batch, cfg))
    }
}

impl Analyzer for AnomalyDetector {
    fn kind(&self) -> AnalysisKind { AnalysisKind::Anomaly }
    fn analyze(&self, batch: &[Record], cfg: &AnalysisConfig) -> AnalysisOutput {
        AnalysisOutput::Anomaly(detect_anomalies(batch, cfg))
    }
}

impl Analyzer for TrendAnalyzer {
    fn kind(&self) -> AnalysisKind { AnalysisKind::Trend }
    fn analyze(&self, batch: &[Record], _cfg: &AnalysisConfig) -> AnalysisOutput {
        AnalysisOutput::Trend(analyze_trend(batch))
    }
}

/// Holds the batch analyzers and dispatches on the requested kind.
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self {
            analyzers: vec![
                Box::new(PatternAnalyzer),
                Box::new(ClusterAnalyzer),
                Box::new(AnomalyDetector),
                Box::new(TrendAnalyzer),
            ],
        }
    }

    pub fn run(&self, kind: AnalysisKind, batch: &[Record], cfg: &AnalysisConfig) -> AnalysisOutput {
        tracing::info!(kind = kind.as_str(), records = batch.len(), "running analysis");
        if kind == AnalysisKind::Comprehensive {
            return AnalysisOutput::Comprehensive(Box::new(self.run_all(batch, cfg)));
        }
        self.analyzers
            .iter()
            .find(|a| a.kind() == kind)
            .map(|a| a.analyze(batch, cfg))
            .unwrap_or_else(|| AnalysisOutput::Comprehensive(Box::new(self.run_all(batch, cfg))))
    }

    pub fn run_all(&self, batch: &[Record], cfg: &AnalysisConfig) -> ComprehensiveAnalysis {
        let mut results = ComprehensiveAnalysis::default();
        for analyzer in &self.analyzers {
            analyzer.analyze(batch, cfg).merge_into(&mut results);
            results.summary.analysis_types.push(analyzer.kind());
        }
        results.summary.total_records = batch.len();
        results
    }
}
