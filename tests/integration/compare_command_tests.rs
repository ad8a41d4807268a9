//! Integration tests for the compare and demo commands

use crate::common::assertions::{assert_json_contains_keys, read_json};
use crate::common::{sample_data, CliTestRunner};
use tabregress::commands::CommandOutcome;
use tabregress::TabregressError;

fn write_pair(runner: &CliTestRunner, current: &[Vec<&str>], previous: &[Vec<&str>]) -> (String, String) {
    let fixture = runner.fixture();
    let current = fixture.create_csv("current.csv", current).unwrap();
    let previous = fixture.create_csv("previous.csv", previous).unwrap();
    (
        current.to_string_lossy().into_owned(),
        previous.to_string_lossy().into_owned(),
    )
}

#[test]
fn test_identical_files_pass() {
    let runner = CliTestRunner::new().unwrap();
    let data = sample_data::previous_products();
    let (current, previous) = write_pair(&runner, &data, &data);

    let outcome = runner.expect_success(&["compare", &current, &previous, "--key", "id", "--fail-on-regression"]);
    assert_eq!(outcome, CommandOutcome::Completed);
}

#[test]
fn test_value_change_fails_when_requested() {
    let runner = CliTestRunner::new().unwrap();
    let (current, previous) = write_pair(
        &runner,
        &sample_data::current_products(),
        &sample_data::previous_products(),
    );

    let outcome = runner.expect_success(&["compare", &current, &previous, "--key", "id", "--fail-on-regression"]);
    assert_eq!(outcome, CommandOutcome::RegressionDetected);

    // without the flag the regression is only reported
    let outcome = runner.expect_success(&["compare", &current, &previous, "--key", "id"]);
    assert_eq!(outcome, CommandOutcome::Completed);
}

#[test]
fn test_report_written_to_output() {
    let runner = CliTestRunner::new().unwrap();
    let (current, previous) = write_pair(
        &runner,
        &sample_data::current_products(),
        &sample_data::previous_products(),
    );
    let output = runner.fixture().path_str("reports/run.json");

    runner.expect_success(&[
        "compare", &current, &previous, "--key", "id", "--format", "json", "--output", &output,
    ]);

    let path = std::path::Path::new(&output);
    assert_json_contains_keys(
        path,
        &["timestamp", "schema_changes", "value_changes", "potential_regression", "summary"],
    )
    .unwrap();

    let report = read_json(path);
    assert_eq!(report["potential_regression"], true);
    assert_eq!(
        report["value_changes"]["columns_with_value_changes"]["price"]["changed_rows"],
        1
    );
    assert_eq!(
        report["value_changes"]["columns_with_value_changes"]["price"]["percentage"],
        33.33
    );
    assert_eq!(report["summary"]["columns_with_value_changes"], 1);
}

#[test]
fn test_reordered_rows_are_not_a_regression() {
    let runner = CliTestRunner::new().unwrap();
    let (current, previous) = write_pair(
        &runner,
        &sample_data::reordered_products(),
        &sample_data::previous_products(),
    );

    let outcome = runner.expect_success(&["compare", &current, &previous, "--key", "id", "--fail-on-regression"]);
    assert_eq!(outcome, CommandOutcome::Completed);
}

#[test]
fn test_added_column_is_not_a_regression() {
    let runner = CliTestRunner::new().unwrap();
    let (current, previous) = write_pair(
        &runner,
        &sample_data::products_with_category(),
        &sample_data::previous_products(),
    );

    let outcome = runner.expect_success(&["compare", &current, &previous, "--key", "id", "--fail-on-regression"]);
    assert_eq!(outcome, CommandOutcome::Completed);
}

#[test]
fn test_removed_column_is_a_regression() {
    let runner = CliTestRunner::new().unwrap();
    let (current, previous) = write_pair(
        &runner,
        &sample_data::products_without_price(),
        &sample_data::previous_products(),
    );

    let outcome = runner.expect_success(&["compare", &current, &previous, "--key", "id", "--fail-on-regression"]);
    assert_eq!(outcome, CommandOutcome::RegressionDetected);
}

#[test]
fn test_missing_key_column_fails() {
    let runner = CliTestRunner::new().unwrap();
    let data = sample_data::previous_products();
    let (current, previous) = write_pair(&runner, &data, &data);

    let err = runner.expect_failure(&["compare", &current, &previous, "--key", "sku"]);
    match err {
        TabregressError::KeyColumnNotFound { column, .. } => assert_eq!(column, "sku"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_input_file_fails() {
    let runner = CliTestRunner::new().unwrap();
    let missing = runner.fixture().path_str("missing.csv");

    let err = runner.expect_failure(&["compare", &missing, &missing]);
    assert!(matches!(err, TabregressError::InvalidInput { .. }));
}

#[test]
fn test_config_file_supplies_defaults() {
    let runner = CliTestRunner::new().unwrap();
    let (current, previous) = write_pair(
        &runner,
        &sample_data::current_products(),
        &sample_data::previous_products(),
    );
    let config = runner
        .fixture()
        .create_raw(
            "tabregress.json",
            r#"{"primary_key": ["id"], "format": "json", "fail_on_regression": true, "memory_limit": "512MB"}"#,
        )
        .unwrap();
    let config = config.to_string_lossy().into_owned();

    let outcome = runner.expect_success(&["compare", &current, &previous, "--config", &config]);
    assert_eq!(outcome, CommandOutcome::RegressionDetected);
}

#[test]
fn test_invalid_config_fails() {
    let runner = CliTestRunner::new().unwrap();
    let data = sample_data::previous_products();
    let (current, previous) = write_pair(&runner, &data, &data);
    let config = runner
        .fixture()
        .create_raw("bad.json", r#"{"memory_limit": "a lot"}"#)
        .unwrap();
    let config = config.to_string_lossy().into_owned();

    let err = runner.expect_failure(&["compare", &current, &previous, "--config", &config]);
    assert!(matches!(err, TabregressError::Config { .. }));
}

#[test]
fn test_demo_command() {
    let runner = CliTestRunner::new().unwrap();
    assert_eq!(runner.expect_success(&["demo"]), CommandOutcome::Completed);
    assert_eq!(
        runner.expect_success(&["demo", "--format", "json"]),
        CommandOutcome::Completed
    );
}
