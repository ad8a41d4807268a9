//! Schema comparison and type compatibility classification

use crate::table::{DataType, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declared type descriptor of a column on both sides, as the sources gave them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeChange {
    pub previous: String,
    pub current: String,
}

impl TypeChange {
    pub fn is_compatible(&self) -> bool {
        are_types_compatible(&self.previous, &self.current)
    }
}

/// Column-level differences between two tables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDiff {
    pub added_columns: Vec<String>,
    pub removed_columns: Vec<String>,
    pub type_changes: IndexMap<String, TypeChange>,
    pub total_columns_current: usize,
    pub total_columns_previous: usize,
}

impl SchemaDiff {
    pub fn has_changes(&self) -> bool {
        !self.added_columns.is_empty()
            || !self.removed_columns.is_empty()
            || !self.type_changes.is_empty()
    }

    /// Removed columns plus type changes, compatible or not
    pub fn issue_count(&self) -> usize {
        self.removed_columns.len() + self.type_changes.len()
    }

    /// Columns whose values cannot be compared across versions
    pub fn incompatible_columns(&self) -> HashSet<&str> {
        self.type_changes
            .iter()
            .filter(|(_, change)| !change.is_compatible())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Compares column sets and declared types
pub struct SchemaDiffer;

impl SchemaDiffer {
    /// Column names match exactly (case-sensitive). Every textual type
    /// difference is recorded, including ones the classifier accepts.
    pub fn compare(current: &Table, previous: &Table) -> SchemaDiff {
        let added_columns = current
            .columns()
            .iter()
            .filter(|c| !previous.contains_column(&c.name))
            .map(|c| c.name.clone())
            .collect();

        let removed_columns = previous
            .columns()
            .iter()
            .filter(|c| !current.contains_column(&c.name))
            .map(|c| c.name.clone())
            .collect();

        let mut type_changes = IndexMap::new();
        for column in current.columns() {
            let Some(previous_type) = previous.declared_type(&column.name) else {
                continue;
            };
            if previous_type != column.declared_type {
                type_changes.insert(
                    column.name.clone(),
                    TypeChange {
                        previous: previous_type.to_string(),
                        current: column.declared_type.clone(),
                    },
                );
            }
        }

        SchemaDiff {
            added_columns,
            removed_columns,
            type_changes,
            total_columns_current: current.column_count(),
            total_columns_previous: previous.column_count(),
        }
    }
}

/// Whether two type descriptors belong to the same comparison family.
///
/// Families are tested in order numeric, textual, temporal; anything else is
/// compatible only with an identical descriptor. Parameterized labels
/// (`int64[pyarrow]`) are classified by their base name.
pub fn are_types_compatible(previous: &str, current: &str) -> bool {
    DataType::parse(previous).is_compatible_with(&DataType::parse(current))
}
