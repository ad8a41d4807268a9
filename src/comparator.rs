//! Entry point tying the schema and value comparisons together

use crate::error::Result;
use crate::report::RegressionReport;
use crate::schema_diff::{SchemaDiff, SchemaDiffer};
use crate::table::Table;
use crate::value_diff::{ValueDiff, ValueDiffer};

/// Holds two versions of a table and the key used to pair their rows
pub struct TableComparator {
    current: Table,
    previous: Table,
    value_differ: ValueDiffer,
}

impl TableComparator {
    pub fn new(current: Table, previous: Table, primary_key: Vec<String>) -> Self {
        Self {
            current,
            previous,
            value_differ: ValueDiffer::new(primary_key),
        }
    }

    pub fn current(&self) -> &Table {
        &self.current
    }

    pub fn previous(&self) -> &Table {
        &self.previous
    }

    pub fn primary_key(&self) -> &[String] {
        self.value_differ.primary_key()
    }

    pub fn compare_schema(&self) -> SchemaDiff {
        SchemaDiffer::compare(&self.current, &self.previous)
    }

    pub fn compare_values(&self, schema_diff: &SchemaDiff) -> Result<ValueDiff> {
        self.value_differ.compare(&self.current, &self.previous, schema_diff)
    }

    /// Run both comparisons and assemble the report
    pub fn generate_statistics(&self) -> Result<RegressionReport> {
        log::debug!(
            "Comparing {}x{} current against {}x{} previous",
            self.current.row_count(),
            self.current.column_count(),
            self.previous.row_count(),
            self.previous.column_count()
        );

        let schema_changes = self.compare_schema();
        let value_changes = self.compare_values(&schema_changes)?;
        Ok(RegressionReport::new(schema_changes, value_changes))
    }
}
