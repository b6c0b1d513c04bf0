//! Unit tests for consensus-core.

use crate::{Oracle, OracleConfig, RoundInput};

fn report() -> crate::RoundReport {
    let input = RoundInput::binary(vec![
        vec![Some(1.0), Some(1.0)],
        vec![Some(1.0), None],
        vec![Some(0.0), Some(0.0)],
    ]);
    Oracle::new(OracleConfig::default())
        .unwrap()
        .resolve(&input)
        .unwrap()
}

#[test]
fn test_report_dimensions() {
    let report = report();
    assert_eq!(report.reporters(), 3);
    assert_eq!(report.decisions(), 2);
    assert_eq!(report.filled.len(), 3);
    assert_eq!(report.config, OracleConfig::default());
}

#[test]
fn test_reporter_summary() {
    let report = report();
    let summary = report.reporter_summary(1).unwrap();
    assert_eq!(summary.reporter, 1);
    assert_eq!(summary.votes_missing, 1);
    assert_eq!(summary.participation, 0.5);
    assert_eq!(summary.smoothed_reputation, report.smoothed_reputation[1]);
    assert!(report.reporter_summary(3).is_none());
}

#[test]
fn test_decision_summary() {
    let report = report();
    let summary = report.decision_summary(0).unwrap();
    assert_eq!(summary.outcome_final, report.decision_outcomes_final[0]);
    assert_eq!(summary.certainty, report.certainty_per_decision[0]);
    assert_eq!(summary.participation, 1.0);
    assert!(report.decision_summary(2).is_none());
}

#[test]
fn test_report_serializes_missing_as_null() {
    let json = serde_json::to_value(report()).unwrap();
    assert_eq!(json["original"][1][1], serde_json::Value::Null);
    assert_eq!(json["sign_choice"].as_str().map(|s| s == "shifted" || s == "reflected"), Some(true));
}

#[test]
fn test_summaries_tolerate_truncated_report() {
    let mut json = serde_json::to_value(report()).unwrap();
    json["row_bonus"] = serde_json::json!([0.5]);
    json["col_bonus"] = serde_json::json!([1.0]);
    let edited: crate::RoundReport = serde_json::from_value(json).unwrap();

    assert!(edited.reporter_summary(0).is_some());
    assert!(edited.reporter_summary(1).is_none());
    assert!(edited.decision_summary(0).is_some());
    assert!(edited.decision_summary(1).is_none());
}
