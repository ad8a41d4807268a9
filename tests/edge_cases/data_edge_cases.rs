//! Edge case tests for unusual values and table shapes

use crate::common::{compare, TestFixture};
use tabregress::data::DataProcessor;
use tabregress::{DataType, Table, TabregressError, Value};

#[test]
fn test_null_versus_value_is_a_change() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("note", DataType::Text, [None, Some("kept")])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("note", DataType::Text, [Some("filled"), Some("kept")])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.value_changes.column_change("note").unwrap().changed_rows, 1);
}

#[test]
fn test_null_and_nan_are_both_missing() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("ratio", DataType::float64(), [Value::Null, Value::Float(0.5)])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("ratio", DataType::float64(), [Value::Float(f64::NAN), Value::Float(0.5)])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert!(!report.potential_regression);
    assert_eq!(report.value_changes.percentage_row_change, Some(0.0));
}

#[test]
fn test_boolean_to_integer_is_compatible() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("flag", DataType::Boolean, [true, false])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .column("flag", DataType::int64(), [1, 1])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert!(report.schema_changes.type_changes["flag"].is_compatible());
    assert_eq!(report.value_changes.column_change("flag").unwrap().changed_rows, 1);
}

#[test]
fn test_null_key_values_pair_with_each_other() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [None, Some(1)])
        .column("v", DataType::int64(), [5, 6])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [Some(1), None])
        .column("v", DataType::int64(), [6, 50])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.value_changes.column_change("v").unwrap().changed_rows, 1);
}

#[test]
fn test_case_sensitive_column_names() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1])
        .column("User_ID", DataType::Text, ["u1"])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1])
        .column("user_id", DataType::Text, ["u1"])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.schema_changes.added_columns, vec!["user_id"]);
    assert_eq!(report.schema_changes.removed_columns, vec!["User_ID"]);
    assert!(report.potential_regression);
}

#[test]
fn test_key_only_tables() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [2, 3])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.value_changes.changed_column_count(), 0);
    assert_eq!(report.value_changes.percentage_row_change, Some(50.0));
}

#[test]
fn test_tables_without_columns() {
    let empty = Table::new(Vec::new()).unwrap();
    let report = compare(&empty, &empty, &[]).unwrap();
    assert!(!report.potential_regression);
    assert_eq!(report.schema_changes.total_columns_current, 0);
}

#[test]
fn test_ragged_table_is_rejected() {
    let result = Table::builder()
        .column("a", DataType::int64(), [1, 2])
        .column("b", DataType::int64(), [1])
        .build();
    assert!(matches!(result, Err(TabregressError::InvalidTable { .. })));
}

#[test]
fn test_duplicate_column_names_are_rejected() {
    let result = Table::builder()
        .column("a", DataType::int64(), [1])
        .column("a", DataType::Text, ["x"])
        .build();
    assert!(matches!(result, Err(TabregressError::InvalidTable { .. })));
}

#[test]
fn test_unicode_values_from_csv() {
    let fixture = TestFixture::new().unwrap();
    let previous = fixture
        .create_csv(
            "previous.csv",
            &[
                vec!["id", "name"],
                vec!["1", "Café"],
                vec!["2", "北京"],
            ],
        )
        .unwrap();
    let current = fixture
        .create_csv(
            "current.csv",
            &[
                vec!["id", "name"],
                vec!["1", "Cafe"],
                vec!["2", "北京"],
            ],
        )
        .unwrap();

    let processor = DataProcessor::new().unwrap();
    let previous = processor.load_table(&previous).unwrap();
    let current = processor.load_table(&current).unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.value_changes.column_change("name").unwrap().changed_rows, 1);
}

#[test]
fn test_header_only_csv() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_raw("header_only.csv", "id,name\n").unwrap();

    let table = DataProcessor::new().unwrap().load_table(&path).unwrap();
    assert_eq!(table.row_count(), 0);

    let report = compare(&table, &table, &[]).unwrap();
    assert!(!report.potential_regression);
}

#[test]
fn test_binary_values_of_equal_length_are_compared() {
    let previous = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .declared_column("data", "BLOB", [b"aaaa".to_vec(), b"bbbb".to_vec()])
        .build()
        .unwrap();
    let current = Table::builder()
        .column("id", DataType::int64(), [1, 2])
        .declared_column("data", "BLOB", [b"zzzz".to_vec(), b"bbbb".to_vec()])
        .build()
        .unwrap();

    let report = compare(&current, &previous, &["id"]).unwrap();
    assert_eq!(report.value_changes.column_change("data").unwrap().changed_rows, 1);
    assert_eq!(report.value_changes.percentage_row_change, Some(50.0));
    assert!(report.potential_regression);
}
