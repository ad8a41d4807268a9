//! Functional tests for the regression flag and report contents

use crate::common::compare;
use tabregress::value_diff::RowCountChange;
use tabregress::{DataType, Table};

fn id_val(ids: &[i64], vals: &[i64]) -> Table {
    Table::builder()
        .column("id", DataType::int64(), ids.iter().copied())
        .column("val", DataType::int64(), vals.iter().copied())
        .build()
        .unwrap()
}

#[test]
fn test_single_changed_value() {
    let previous = id_val(&[1, 2], &[10, 20]);
    let current = id_val(&[1, 2], &[11, 20]);

    let report = compare(&current, &previous, &["id"]).unwrap();

    assert_eq!(
        report.value_changes.row_count_change,
        RowCountChange {
            previous: 2,
            current: 2,
            difference: 0
        }
    );
    let val = report.value_changes.column_change("val").unwrap();
    assert_eq!(val.changed_rows, 1);
    assert_eq!(val.percentage, 50.0);
    assert!(report.potential_regression);
}

#[test]
fn test_removed_column_counts() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1])
        .column("a", DataType::int64(), [1])
        .column("b", DataType::int64(), [1])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1])
        .column("a", DataType::int64(), [1])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.schema_changes.removed_columns, vec!["b"]);
    assert_eq!(report.schema_changes.total_columns_previous, 3);
    assert_eq!(report.schema_changes.total_columns_current, 2);
    assert_eq!(report.summary.total_schema_issues, 1);
    assert!(report.potential_regression);
}

#[test]
fn test_both_tables_empty() {
    let empty = id_val(&[], &[]);

    let report = compare(&empty, &empty, &["id"]).unwrap();
    assert!(report.schema_changes.added_columns.is_empty());
    assert!(report.schema_changes.removed_columns.is_empty());
    assert_eq!(report.value_changes.row_count_change, RowCountChange::new(0, 0));
    assert_eq!(report.value_changes.changed_column_count(), 0);
    assert!(report.value_changes.columns_with_value_changes.is_some());
    assert!(!report.potential_regression);
}

#[test]
fn test_row_count_decrease_is_a_regression() {
    let previous = id_val(&[1, 2, 3], &[1, 2, 3]);
    let current = id_val(&[1, 2], &[1, 2]);

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.value_changes.row_count_change.difference, -1);
    assert!(report.value_changes.columns_with_value_changes.is_none());
    assert!(report.potential_regression);
}

#[test]
fn test_row_count_increase_alone_is_not_a_regression() {
    let previous = id_val(&[1, 2], &[1, 2]);
    let current = id_val(&[1, 2, 3], &[1, 2, 3]);

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.value_changes.row_count_change.difference, 1);
    assert!(!report.potential_regression);
}

#[test]
fn test_int_to_float_values_are_compared() {
    let previous = id_val(&[1, 2], &[10, 20]);
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("val", DataType::float64(), [10.5, 20.0])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert!(report.schema_changes.type_changes["val"].is_compatible());
    assert_eq!(report.value_changes.column_change("val").unwrap().changed_rows, 1);
}

#[test]
fn test_int_to_string_is_excluded_but_reported() {
    let previous = id_val(&[1, 2], &[10, 20]);
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("val", DataType::Text, ["ten", "twenty"])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    let change = &report.schema_changes.type_changes["val"];
    assert_eq!(change.previous.to_string(), "int64");
    assert_eq!(change.current.to_string(), "string");
    assert!(!change.is_compatible());
    assert!(report.value_changes.column_change("val").is_none());
    assert!(report.potential_regression);
}

#[test]
fn test_missing_key_fails_before_any_diff() {
    let table = id_val(&[1], &[1]);
    assert!(compare(&table, &table, &["missing"]).is_err());
}

#[test]
fn test_no_key_skips_value_changes() {
    let previous = id_val(&[1, 2], &[10, 20]);
    let current = id_val(&[1, 2], &[11, 20]);

    let report = compare(&current, &previous, &[]).unwrap();
    assert_eq!(report.value_changes.changed_column_count(), 0);
    assert_eq!(report.value_changes.percentage_row_change, Some(50.0));
    assert!(!report.potential_regression);
}

#[test]
fn test_aliased_type_change_is_reported() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .declared_column("name", "object", ["a", "b"])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .declared_column("name", "string", ["a", "b"])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    let change = &report.schema_changes.type_changes["name"];
    assert_eq!(change.previous, "object");
    assert_eq!(change.current, "string");
    assert!(change.is_compatible());
    assert_eq!(report.value_changes.changed_column_count(), 0);
    assert!(report.potential_regression);
}

#[test]
fn test_arrow_backed_column_is_still_value_compared() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .declared_column("qty", "int64", [5, 6])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .declared_column("qty", "int64[pyarrow]", [5, 7])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert!(report.schema_changes.type_changes["qty"].is_compatible());
    assert_eq!(report.value_changes.column_change("qty").unwrap().changed_rows, 1);
}
