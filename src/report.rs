//! Regression flag and report assembly

use crate::schema_diff::SchemaDiff;
use crate::value_diff::ValueDiff;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Headline counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_schema_issues: usize,
    pub columns_with_value_changes: usize,
}

/// Complete outcome of comparing two versions of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    pub timestamp: DateTime<Local>,
    pub schema_changes: SchemaDiff,
    pub value_changes: ValueDiff,
    pub potential_regression: bool,
    pub summary: ReportSummary,
}

impl RegressionReport {
    pub fn new(schema_changes: SchemaDiff, value_changes: ValueDiff) -> Self {
        let potential_regression = is_regression(&schema_changes, &value_changes);
        let summary = ReportSummary {
            total_schema_issues: schema_changes.issue_count(),
            columns_with_value_changes: value_changes.changed_column_count(),
        };

        Self {
            timestamp: Local::now(),
            schema_changes,
            value_changes,
            potential_regression,
            summary,
        }
    }
}

/// A removed column, any type change, fewer rows, or any changed value.
///
/// Added columns and row-count growth on their own are not regressions.
pub fn is_regression(schema: &SchemaDiff, values: &ValueDiff) -> bool {
    !schema.removed_columns.is_empty()
        || !schema.type_changes.is_empty()
        || values.row_count_change.is_decrease()
        || values.has_value_changes()
}
