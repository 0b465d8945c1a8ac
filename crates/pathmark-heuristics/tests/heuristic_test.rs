//! End-to-end tests for the heuristic attribution models.

use pathmark_core::{HeuristicConfig, PathRecord};
use pathmark_heuristics::{HeuristicEngine, HeuristicReport};

fn fit(records: &[PathRecord]) -> HeuristicReport {
    HeuristicEngine::new(HeuristicConfig::default())
        .fit(records)
        .unwrap()
}

#[test]
fn every_rule_distributes_the_full_observed_total() {
    let records = vec![
        PathRecord::new("A > B > C", 2).with_revenue(20.0),
        PathRecord::new("B > A", 1).with_revenue(7.0),
        PathRecord::new("C", 4).with_revenue(13.0),
    ];
    let report = fit(&records);

    let sums = |rows: &[pathmark_heuristics::HeuristicRow]| {
        (
            rows.iter().map(|r| r.first_touch).sum::<f64>(),
            rows.iter().map(|r| r.last_touch).sum::<f64>(),
            rows.iter().map(|r| r.linear_touch).sum::<f64>(),
            rows.iter().map(|r| r.position_based).sum::<f64>(),
        )
    };

    let (first, last, linear, position) = sums(&report.conversions);
    assert!((first - 7.0).abs() < 1e-9);
    assert!((last - 7.0).abs() < 1e-9);
    assert!((linear - 7.0).abs() < 1e-9);
    assert!((position - 7.0).abs() < 1e-9);

    let revenue = report.revenue.unwrap();
    let (first, last, linear, position) = sums(&revenue);
    assert!((first - 40.0).abs() < 1e-9);
    assert!((last - 40.0).abs() < 1e-9);
    assert!((linear - 40.0).abs() < 1e-9);
    assert!((position - 40.0).abs() < 1e-9);
}

#[test]
fn duplicate_paths_aggregate_before_fitting() {
    let split = vec![
        PathRecord::new("A > B", 1),
        PathRecord::new("A > B", 2),
    ];
    let merged = vec![PathRecord::new("A > B", 3)];
    assert_eq!(fit(&split).conversions, fit(&merged).conversions);
}

#[test]
fn channels_report_in_first_seen_order() {
    let records = vec![
        PathRecord::new("Z > M", 1),
        PathRecord::new("M > A", 2),
    ];
    let report = fit(&records);
    let channels: Vec<&str> = report
        .conversions
        .iter()
        .map(|r| r.channel.as_str())
        .collect();
    assert_eq!(channels, ["Z", "M", "A"]);
}

#[test]
fn revenue_table_is_absent_without_revenue_input() {
    let records = vec![PathRecord::new("A > B", 1)];
    assert!(fit(&records).revenue.is_none());
}

#[test]
fn report_serializes_for_downstream_consumers() {
    let records = vec![PathRecord::new("A > B", 1).with_revenue(5.0)];
    let report = fit(&records);
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["conversions"][0]["first_touch"].is_number());
    assert!(json["revenue"].is_array());
}
