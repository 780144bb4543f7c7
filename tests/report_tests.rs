use datalens::error::AnalysisError;
use datalens::report::{ReportFormat, ReportStore};
use serde_json::{json, Value};

#[test]
fn saves_and_locates_json_reports() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path());
    let payload = json!({"summary": {"totalRecords": 3}, "outliers": []});
    let id = store.save("anomaly", &payload, ReportFormat::Json).unwrap();
    assert!(id.starts_with("anomaly_"));

    let (path, format) = store.locate(&id).unwrap();
    assert_eq!(format, ReportFormat::Json);
    let back: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(back, payload);
}

#[test]
fn csv_reports_carry_header_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path());
    let payload = json!({"summary": {"totalRecords": 3, "label": "weekly"}});
    let id = store.save("pattern", &payload, ReportFormat::Csv).unwrap();
    let (path, format) = store.locate(&id).unwrap();
    assert_eq!(format, ReportFormat::Csv);

    let text = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Report Type,Generated At");
    assert!(lines[1].starts_with("pattern,"));
    assert!(lines.contains(&"Summary"));
    assert!(lines.contains(&"totalRecords,3"));
    assert!(lines.contains(&"label,weekly"));
}

#[test]
fn lists_only_report_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path());
    let a = store.save("trend", &json!({"summary": {}}), ReportFormat::Json).unwrap();
    let b = store.save("trend", &json!({"summary": {}}), ReportFormat::Json).unwrap();
    assert_ne!(a, b);
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
    assert!(ids.contains(&a.as_str()) && ids.contains(&b.as_str()));
    assert!(listed.iter().all(|r| r.format == ReportFormat::Json && r.size > 0));
    assert!(listed.iter().all(|r| r.name.ends_with(".json")));
}

#[test]
fn missing_directory_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path().join("not-yet"));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn unknown_report_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path());
    match store.locate("pattern_1") {
        Err(AnalysisError::ReportNotFound(id)) => assert_eq!(id, "pattern_1"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn unwritable_location_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("occupied");
    std::fs::write(&file, "x").unwrap();
    let store = ReportStore::new(file.join("reports"));
    let err = store.save("trend", &json!({}), ReportFormat::Json).unwrap_err();
    assert!(matches!(err, AnalysisError::Io(_)));
}

#[test]
fn ids_cannot_escape_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path().join("reports"));
    std::fs::write(dir.path().join("secret.json"), "{}").unwrap();
    for id in ["../secret", "a/b", "a\\b", ""] {
        assert!(matches!(store.locate(id), Err(AnalysisError::Input(_))), "accepted {id:?}");
    }
}

#[test]
fn reads_back_stored_report() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path());
    let id = store.save("network", &json!({"summary": {"uniquePorts": 2}}), ReportFormat::Json).unwrap();
    let back: Value = serde_json::from_str(&store.read(&id).unwrap()).unwrap();
    assert_eq!(back["summary"]["uniquePorts"], 2);
    assert!(matches!(store.read("network_0"), Err(AnalysisError::ReportNotFound(_))));
}
