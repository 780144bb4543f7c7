//! Single-pass nearest-centroid grouping over two numeric fields.
//!
//! Centroids are sampled once from the batch and never moved: there is no
//! Lloyd refinement step, so this is one k-means assignment round, not a
//! converged k-means clustering.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::record::{as_number, Record};
use crate::schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAssignment {
    pub point_index: usize,
    pub cluster_id: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
    pub cluster_id: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub total_records: usize,
    pub number_of_clusters: usize,
    pub clustered_records: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAnalysis {
    pub groups: Vec<ClusterAssignment>,
    pub centroids: Vec<Centroid>,
    pub summary: ClusterSummary,
}

fn point(rec: &Record, fx: &str, fy: &str) -> Option<(f64, f64)> {
    Some((as_number(rec.get(fx)?)?, as_number(rec.get(fy)?)?))
}

/// Index and distance of the closest centroid; the earliest centroid wins ties.
pub fn nearest_centroid(p: (f64, f64), centroids: &[Centroid]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for c in centroids {
        let d = ((p.0 - c.x).powi(2) + (p.1 - c.y).powi(2)).sqrt();
        if best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((c.cluster_id, d));
        }
    }
    best
}

pub fn analyze_clusters_with_rng<R: Rng>(batch: &[Record], cfg: &AnalysisConfig, rng: &mut R) -> ClusterAnalysis {
    let mut out = ClusterAnalysis::default();
    out.summary.total_records = batch.len();

    let fields = schema::numeric_fields(batch);
    if fields.len() < 2 || cfg.cluster_count == 0 {
        return out;
    }
    let (fx, fy) = (&fields[0], &fields[1]);

    // Records lacking either coordinate can neither seed nor join a cluster.
    let points: Vec<(usize, (f64, f64))> = batch
        .iter()
        .enumerate()
        .filter_map(|(i, rec)| point(rec, fx, fy).map(|p| (i, p)))
        .collect();
    if points.is_empty() {
        return out;
    }

    // Sampling with replacement; duplicate centroids are allowed.
    out.centroids = (0..cfg.cluster_count)
        .map(|cluster_id| {
            let (_, (x, y)) = points[rng.gen_range(0..points.len())];
            Centroid { x, y, cluster_id }
        })
        .collect();

    for (idx, p) in &points {
        if let Some((cluster_id, distance)) = nearest_centroid(*p, &out.centroids) {
            out.groups.push(ClusterAssignment { point_index: *idx, cluster_id, distance });
        }
    }

    out.summary.number_of_clusters = out.centroids.len();
    out.summary.clustered_records = out.groups.len();
    debug!(x = %fx, y = %fy, clustered = out.summary.clustered_records, "nearest-centroid grouping complete");
    out
}

/// Uses `cfg.cluster_seed` when set so runs are reproducible.
pub fn analyze_clusters(batch: &[Record], cfg: &AnalysisConfig) -> ClusterAnalysis {
    let mut rng = match cfg.cluster_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    analyze_clusters_with_rng(batch, cfg, &mut rng)
}
