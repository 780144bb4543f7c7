use datalens::clustering::{analyze_clusters, analyze_clusters_with_rng, nearest_centroid, Centroid};
use datalens::config::AnalysisConfig;
use datalens::record::batch_from_value;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

fn sample_batch() -> datalens::Batch {
    batch_from_value(json!([
        {"x": 1.0, "y": 1.0, "tag": "a"},
        {"x": 1.5, "y": 0.5, "tag": "a"},
        {"x": 10.0, "y": 10.0, "tag": "b"},
        {"x": 10.5, "y": 9.0, "tag": "b"},
        {"x": -8.0, "y": 4.0, "tag": "c"},
        {"x": -7.5, "y": 4.5, "tag": "c"}
    ])).unwrap()
}

#[test]
fn fewer_than_two_numeric_fields_yields_empty_result() {
    let batch = batch_from_value(json!([{"x": 1, "label": "a"}, {"x": 2, "label": "b"}])).unwrap();
    let out = analyze_clusters(&batch, &AnalysisConfig::default());
    assert!(out.groups.is_empty());
    assert!(out.centroids.is_empty());
    assert_eq!(out.summary.number_of_clusters, 0);
    assert_eq!(out.summary.clustered_records, 0);
    assert_eq!(out.summary.total_records, 2);

    let empty = analyze_clusters(&[], &AnalysisConfig::default());
    assert_eq!(empty.summary.number_of_clusters, 0);
}

#[test]
fn every_point_goes_to_its_nearest_fixed_centroid() {
    let batch = sample_batch();
    let mut rng = StdRng::seed_from_u64(7);
    let out = analyze_clusters_with_rng(&batch, &AnalysisConfig::default(), &mut rng);
    assert_eq!(out.centroids.len(), 3);
    assert_eq!(out.summary.number_of_clusters, 3);
    assert_eq!(out.summary.clustered_records, batch.len());

    // Centroids are copies of sampled records, never moved afterwards.
    for c in &out.centroids {
        assert!(batch.iter().any(|r| r["x"].as_f64() == Some(c.x) && r["y"].as_f64() == Some(c.y)));
    }
    for g in &out.groups {
        assert!(g.cluster_id < 3);
        let rec = &batch[g.point_index];
        let (x, y) = (rec["x"].as_f64().unwrap(), rec["y"].as_f64().unwrap());
        let best = out
            .centroids
            .iter()
            .map(|c| ((x - c.x).powi(2) + (y - c.y).powi(2)).sqrt())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(g.distance, best);
    }
}

#[test]
fn seeded_config_is_reproducible() {
    let cfg = AnalysisConfig { cluster_seed: Some(42), ..Default::default() };
    let batch = sample_batch();
    assert_eq!(analyze_clusters(&batch, &cfg), analyze_clusters(&batch, &cfg));
}

#[test]
fn first_centroid_wins_ties() {
    let centroids = vec![
        Centroid { x: 0.0, y: 0.0, cluster_id: 0 },
        Centroid { x: 0.0, y: 0.0, cluster_id: 1 },
        Centroid { x: 2.0, y: 0.0, cluster_id: 2 },
    ];
    assert_eq!(nearest_centroid((1.0, 0.0), &centroids), Some((0, 1.0)));
    assert_eq!(nearest_centroid((1.0, 0.0), &[]), None);
}

#[test]
fn records_missing_a_coordinate_are_not_assigned() {
    let batch = batch_from_value(json!([
        {"x": 1, "y": 1},
        {"x": 2},
        {"x": 3, "y": "n/a"},
        {"x": 4, "y": 4}
    ])).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let out = analyze_clusters_with_rng(&batch, &AnalysisConfig::default(), &mut rng);
    assert_eq!(out.summary.total_records, 4);
    assert_eq!(out.summary.clustered_records, 2);
    let idx: Vec<usize> = out.groups.iter().map(|g| g.point_index).collect();
    assert_eq!(idx, vec![0, 3]);
    assert!(out.groups.iter().all(|g| g.distance.is_finite()));
}
