use datalens::error::AnalysisError;
use datalens::logs::{analyze_logs, analyze_upload, classify_level, inspect_entry, LogLevel};
use datalens::parser::{parse_csv, parse_upload, LogFormat};
use serde_json::json;

#[test]
fn format_follows_extension() {
    assert_eq!(LogFormat::from_filename("events.CSV"), LogFormat::Csv);
    assert_eq!(LogFormat::from_filename("dump.json"), LogFormat::Json);
    assert_eq!(LogFormat::from_filename("app.log"), LogFormat::Text);
    assert_eq!(LogFormat::from_filename("noext"), LogFormat::Text);
}

#[test]
fn text_upload_reports_keywords_without_errors() {
    let text = "2024-01-01 10:00:00 Failed login attempt from 192.168.1.10\n\
                \n\
                SQL injection detected from 10.0.0.5 at 11:22:33\n   \n";
    let out = analyze_upload("auth.log", text.as_bytes()).unwrap();
    assert_eq!(out.total_entries, 2);
    assert_eq!(out.error_count, 0);
    assert_eq!(out.info_count, 2);

    let patterns: Vec<&str> = out.suspicious_patterns.iter().map(|h| h.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["failed login", "sql injection"]);
    assert_eq!(
        out.suspicious_patterns[0].log,
        json!({"message": "2024-01-01 10:00:00 Failed login attempt from 192.168.1.10"})
    );

    assert_eq!(out.unique_ips, vec!["192.168.1.10", "10.0.0.5"]);
    assert_eq!(out.time_distribution.get("2024-01-01"), Some(&1));
    assert_eq!(out.time_distribution.get("11:22:33"), Some(&1));
}

#[test]
fn error_markers_outrank_warning_markers() {
    assert_eq!(classify_level("error and warning"), LogLevel::Error);
    assert_eq!(classify_level("disk warning"), LogLevel::Warning);
    assert_eq!(classify_level("all good"), LogLevel::Info);
    assert_eq!(inspect_entry(&json!({"message": "Hata oluştu"})).level, LogLevel::Error);
    assert_eq!(inspect_entry(&json!({"message": "Uyarı: disk dolu"})).level, LogLevel::Warning);
}

#[test]
fn field_names_are_scanned_too() {
    // the whole JSON rendering is lower-cased and searched
    let entry = inspect_entry(&json!({"ERROR": false}));
    assert_eq!(entry.level, LogLevel::Error);
}

#[test]
fn every_keyword_on_a_record_is_reported() {
    let entries = vec![
        json!({"message": "DDoS and brute force from 8.8.8.8"}),
        json!({"message": "retry from 8.8.8.8"}),
    ];
    let out = analyze_logs(&entries);
    assert_eq!(out.suspicious_patterns.len(), 2);
    assert_eq!(out.suspicious_patterns[0].pattern, "brute force");
    assert_eq!(out.suspicious_patterns[1].pattern, "ddos");
    assert!(out.suspicious_patterns.iter().all(|h| h.log == entries[0]));
    assert_eq!(out.unique_ips, vec!["8.8.8.8"]);
}

#[test]
fn json_upload_shapes() {
    let arr = br#"[{"msg": "error one"}, {"msg": "ok"}, {"msg": "warning"}]"#;
    let out = analyze_upload("x.json", arr).unwrap();
    assert_eq!((out.total_entries, out.error_count, out.warning_count, out.info_count), (3, 1, 1, 1));

    let single = parse_upload("x.json", br#"{"msg": "one"}"#).unwrap();
    assert_eq!(single, vec![json!({"msg": "one"})]);
}

#[test]
fn malformed_json_is_a_hard_error() {
    let err = analyze_upload("broken.json", b"[{\"msg\": ").unwrap_err();
    assert!(matches!(err, AnalysisError::Json(_)));
}

#[test]
fn csv_short_rows_are_padded() {
    let data = b"time,msg,ip\n2024-02-01,error here,1.2.3.4\n2024-02-02,short\n";
    let rows = parse_csv(data).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], json!({"time": "2024-02-02", "msg": "short", "ip": ""}));

    let out = analyze_upload("events.csv", data).unwrap();
    assert_eq!(out.error_count, 1);
    assert_eq!(out.unique_ips, vec!["1.2.3.4"]);
    assert_eq!(out.time_distribution.len(), 2);
}

#[test]
fn csv_with_legacy_encoding_still_parses() {
    // 0xfd is dotless i in windows-1254
    let data = b"time,msg\n2024-01-01,disk uyar\xfd\n2024-01-02,error on 10.0.0.7\n";
    let out = analyze_upload("events.csv", data).unwrap();
    assert_eq!(out.total_entries, 2);
    assert_eq!(out.error_count, 1);
    assert_eq!(out.unique_ips, vec!["10.0.0.7"]);

    let rows = parse_csv(data).unwrap();
    assert_eq!(rows[0]["msg"], json!("disk uyar\u{fffd}"));
}
