use datalens::config::AnalysisConfig;
use datalens::patterns::{analyze_patterns, frequent_items};
use datalens::record::batch_from_value;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn keeps_top_five_with_stable_ties() {
    let values = ["a", "b", "a", "c", "d", "g", "e", "a", "f", "g"];
    let batch = batch_from_value(json!(values.iter().map(|v| json!({"k": v})).collect::<Vec<_>>())).unwrap();
    let freq = frequent_items(&batch, 5);
    assert_eq!(freq.len(), 1);
    let got: Vec<(&str, usize)> = freq[0].values.iter().map(|vc| (vc.value.as_str(), vc.count)).collect();
    assert_eq!(got, vec![("a", 3), ("g", 2), ("b", 1), ("c", 1), ("d", 1)]);
}

#[test]
fn tallies_every_field_seen_on_any_record() {
    let batch = batch_from_value(json!([
        {"city": "Ankara", "n": 1},
        {"city": "Izmir", "extra": null},
        {"n": 1}
    ])).unwrap();
    let freq = frequent_items(&batch, 5);
    let fields: Vec<&str> = freq.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["city", "n", "extra"]);
    assert_eq!(freq[1].values[0].value, "1");
    assert_eq!(freq[1].values[0].count, 2);
    assert_eq!(freq[2].values[0].value, "null");
}

#[test]
fn reports_both_orderings_of_strong_correlations() {
    let batch = batch_from_value(json!([
        {"x": 1, "y": 2, "z": 5, "label": "p"},
        {"x": 2, "y": 4, "z": 1, "label": "q"},
        {"x": 3, "y": 6, "z": 4, "label": "r"}
    ])).unwrap();
    let out = analyze_patterns(&batch, &AnalysisConfig::default());
    let pairs: Vec<(&str, &str)> = out.correlations.iter().map(|c| (c.field_a.as_str(), c.field_b.as_str())).collect();
    assert_eq!(pairs, vec![("x", "y"), ("y", "x")]);
    assert!(out.correlations.iter().all(|c| (c.coefficient - 1.0).abs() < 1e-12));
    assert_eq!(out.summary.total_records, 3);
    assert_eq!(out.summary.unique_fields, 4);
    assert_eq!(out.summary.strong_correlations, 2);
}

#[test]
fn mismatched_series_do_not_correlate() {
    let batch = batch_from_value(json!([{"x": 1, "y": 1}, {"x": 2, "y": 2}, {"x": 3}])).unwrap();
    let out = analyze_patterns(&batch, &AnalysisConfig::default());
    assert!(out.correlations.is_empty());
}

#[test]
fn single_record_has_no_correlations() {
    let batch = batch_from_value(json!([{"x": 1, "y": 2}])).unwrap();
    let out = analyze_patterns(&batch, &AnalysisConfig::default());
    assert!(out.correlations.is_empty());
    assert_eq!(out.summary.unique_fields, 2);
}

proptest! {
    #[test]
    fn never_more_than_five_values_per_field(vals in prop::collection::vec(0u8..20, 0..200)) {
        let batch = batch_from_value(json!(vals.iter().map(|v| json!({"k": v, "m": v % 7})).collect::<Vec<_>>())).unwrap();
        let out = analyze_patterns(&batch, &AnalysisConfig::default());
        for f in &out.frequent_items {
            prop_assert!(f.values.len() <= 5);
            prop_assert!(f.values.windows(2).all(|w| w[0].count >= w[1].count));
        }
    }
}

#[test]
fn integral_floats_share_a_key_with_integers() {
    let batch = batch_from_value(json!([{"n": 10}, {"n": 10.0}, {"n": 10.5}])).unwrap();
    let freq = frequent_items(&batch, 5);
    let got: Vec<(&str, usize)> = freq[0].values.iter().map(|vc| (vc.value.as_str(), vc.count)).collect();
    assert_eq!(got, vec![("10", 2), ("10.5", 1)]);
}
