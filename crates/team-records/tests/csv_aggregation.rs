//! Integration tests for loading and aggregating team records files.
//!
//! These use the CSV fixtures under `tests/fixtures/` to check the full
//! load → filter → aggregate path.

use approx::assert_relative_eq;
use std::path::Path;
use team_records::{aggregate, AoaFilter, CsvRecordSource, RecordSource};

fn load_fixture(name: &str) -> team_records::RecordSet {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    CsvRecordSource::new()
        .load(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e))
}

/// Test that the sample experiment loads every complete row.
#[test]
fn test_sample_fixture_loads() {
    let set = load_fixture("team_records.csv");

    assert_eq!(set.len(), 12);
    assert_eq!(set.skipped_rows, 0);
    assert_eq!(
        set.records.iter().filter(|r| r.team_aoa.is_none()).count(),
        1
    );
}

/// Test the per-turn means of the sample experiment.
#[test]
fn test_sample_fixture_means() {
    let set = load_fixture("team_records.csv");

    let series = aggregate(&set.records, &AoaFilter::default());

    assert_eq!(series.rows_read, 12);
    assert_eq!(series.rows_excluded, 4);
    assert_eq!(series.len(), 3);

    let turns: Vec<i64> = series.points.iter().map(|p| p.turn_number).collect();
    assert_eq!(turns, vec![1, 2, 3]);

    assert_relative_eq!(series.points[0].mean_team_size, 28.0 / 3.0);
    assert_relative_eq!(series.points[1].mean_team_size, 22.0 / 3.0);
    assert_relative_eq!(series.points[2].mean_team_size, 5.5);
}

/// Test that a file of only excluded rows produces an empty series.
#[test]
fn test_excluded_only_fixture() {
    let set = load_fixture("excluded_only.csv");

    let series = aggregate(&set.records, &AoaFilter::default());

    assert_eq!(set.len(), 3);
    assert!(series.is_empty());
    assert_eq!(series.rows_excluded, 3);
}

/// Test that disabling the exclusion brings the AoA 5 rows back.
#[test]
fn test_excluded_only_fixture_without_filter() {
    let set = load_fixture("excluded_only.csv");

    let series = aggregate(&set.records, &AoaFilter::keep_all());

    assert_eq!(series.len(), 3);
    assert_relative_eq!(series.points[0].mean_team_size, 4.0);
}

/// Test that loading the same file twice gives the same series.
#[test]
fn test_aggregation_is_deterministic() {
    let first = aggregate(&load_fixture("team_records.csv").records, &AoaFilter::default());
    let second = aggregate(&load_fixture("team_records.csv").records, &AoaFilter::default());

    assert_eq!(first, second);
}
