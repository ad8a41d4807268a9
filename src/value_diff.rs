//! Cell-level comparison of two versions of a table
//!
//! Rows identical on both sides are cancelled first, so only genuinely
//! differing rows are paired and counted. Pairing uses the declared primary
//! key: a direct key lookup when keys are unique, and a grouped, sorted
//! pairing when a key value repeats.

use crate::error::{Result, TabregressError};
use crate::hash::{filter_unchanged, FilteredRows, RowFingerprinter};
use crate::schema_diff::SchemaDiff;
use crate::table::{CanonicalValue, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Row counts of both versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCountChange {
    pub previous: usize,
    pub current: usize,
    pub difference: i64,
}

impl RowCountChange {
    pub fn new(previous: usize, current: usize) -> Self {
        Self {
            previous,
            current,
            difference: current as i64 - previous as i64,
        }
    }

    pub fn is_decrease(&self) -> bool {
        self.difference < 0
    }
}

/// Mismatch count for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnValueChange {
    pub changed_rows: usize,
    /// Share of the original current row count, rounded to 2 decimals
    pub percentage: f64,
}

/// Result of a value comparison.
///
/// When row counts differ only `row_count_change` is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDiff {
    pub row_count_change: RowCountChange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_row_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns_with_value_changes: Option<IndexMap<String, ColumnValueChange>>,
}

impl ValueDiff {
    fn row_count_only(previous: usize, current: usize) -> Self {
        Self {
            row_count_change: RowCountChange::new(previous, current),
            percentage_row_change: None,
            columns_with_value_changes: None,
        }
    }

    fn empty() -> Self {
        Self {
            row_count_change: RowCountChange::new(0, 0),
            percentage_row_change: Some(0.0),
            columns_with_value_changes: Some(IndexMap::new()),
        }
    }

    /// Whether value-level analysis ran (row counts matched)
    pub fn is_complete(&self) -> bool {
        self.columns_with_value_changes.is_some()
    }

    pub fn changed_column_count(&self) -> usize {
        self.columns_with_value_changes
            .as_ref()
            .map(IndexMap::len)
            .unwrap_or(0)
    }

    pub fn has_value_changes(&self) -> bool {
        self.changed_column_count() > 0
    }

    pub fn column_change(&self, column: &str) -> Option<&ColumnValueChange> {
        self.columns_with_value_changes
            .as_ref()
            .and_then(|changes| changes.get(column))
    }
}

/// How filtered rows were paired by key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Every key value occurs at most once per side
    Indexed,
    /// Some key value repeats; groups are sorted and paired positionally
    Grouped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowPair {
    current: usize,
    previous: usize,
}

/// A column present on both sides with a comparable type
#[derive(Debug, Clone)]
struct ColumnPair<'a> {
    name: &'a str,
    current: usize,
    previous: usize,
}

/// Compares cell values of two tables of equal length.
///
/// Without a primary key only row counts and the unchanged-row share are
/// reported; per-column changes require a key to pair rows.
#[derive(Debug, Clone, Default)]
pub struct ValueDiffer {
    primary_key: Vec<String>,
}

impl ValueDiffer {
    pub fn new(primary_key: Vec<String>) -> Self {
        Self { primary_key }
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Unchanged rows cancel one for one, so a row duplicated more often on
    /// the current side leaves its surplus copies counted in
    /// `percentage_row_change`.
    pub fn compare(&self, current: &Table, previous: &Table, schema_diff: &SchemaDiff) -> Result<ValueDiff> {
        self.ensure_key_columns(current, "current")?;
        self.ensure_key_columns(previous, "previous")?;

        let current_len = current.row_count();
        let previous_len = previous.row_count();

        if current_len != previous_len {
            log::info!(
                "Row counts differ ({} previous, {} current); skipping value comparison",
                previous_len,
                current_len
            );
            return Ok(ValueDiff::row_count_only(previous_len, current_len));
        }

        if current_len == 0 {
            return Ok(ValueDiff::empty());
        }

        let comparable = comparable_columns(current, previous, schema_diff);
        let filtered = filter_rows(current, previous, &comparable);
        log::debug!(
            "{} of {} rows unchanged across versions",
            filtered.unchanged_count(current_len),
            current_len
        );

        let mut value_changes = IndexMap::new();
        if !self.primary_key.is_empty() {
            let key_columns = self.resolve_key(&comparable, schema_diff)?;
            let value_columns: Vec<&ColumnPair> = comparable
                .iter()
                .filter(|c| !self.primary_key.iter().any(|k| k == c.name))
                .collect();

            let (pairs, alignment) = align_rows(current, previous, &filtered, &key_columns, &value_columns);
            if alignment == Alignment::Grouped {
                log::warn!(
                    "Duplicate primary key values for [{}]; pairing rows within key groups",
                    self.primary_key.join(", ")
                );
            }
            log::debug!("Aligned {} row pairs ({:?})", pairs.len(), alignment);

            for column in value_columns {
                let changed_rows = pairs
                    .iter()
                    .filter(|pair| {
                        !current
                            .value(pair.current, column.current)
                            .null_safe_eq(previous.value(pair.previous, column.previous))
                    })
                    .count();

                if changed_rows > 0 {
                    value_changes.insert(
                        column.name.to_string(),
                        ColumnValueChange {
                            changed_rows,
                            percentage: percentage(changed_rows, current_len),
                        },
                    );
                }
            }
        }

        Ok(ValueDiff {
            row_count_change: RowCountChange::new(previous_len, current_len),
            // denominator is the original current row count, not the filtered one
            percentage_row_change: Some(percentage(filtered.current.len(), current_len)),
            columns_with_value_changes: Some(value_changes),
        })
    }

    fn ensure_key_columns(&self, table: &Table, side: &str) -> Result<()> {
        match self.primary_key.iter().find(|k| !table.contains_column(k)) {
            Some(missing) => Err(TabregressError::key_column_not_found(missing, side)),
            None => Ok(()),
        }
    }

    fn resolve_key<'c>(&self, comparable: &'c [ColumnPair<'c>], schema_diff: &SchemaDiff) -> Result<Vec<&'c ColumnPair<'c>>> {
        self.primary_key
            .iter()
            .map(|key| {
                if let Some(column) = comparable.iter().find(|c| c.name == key) {
                    return Ok(column);
                }
                match schema_diff.type_changes.get(key) {
                    Some(change) => Err(TabregressError::IncompatibleKeyColumn {
                        column: key.clone(),
                        previous: change.previous.to_string(),
                        current: change.current.to_string(),
                    }),
                    None => Err(TabregressError::key_column_not_found(key, "current")),
                }
            })
            .collect()
    }
}

/// Common columns in current-table order, minus incompatible type changes
fn comparable_columns<'a>(current: &'a Table, previous: &Table, schema_diff: &SchemaDiff) -> Vec<ColumnPair<'a>> {
    let incompatible = schema_diff.incompatible_columns();
    current
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| !incompatible.contains(column.name.as_str()))
        .filter_map(|(current_idx, column)| {
            previous.column_index(&column.name).map(|previous_idx| ColumnPair {
                name: column.name.as_str(),
                current: current_idx,
                previous: previous_idx,
            })
        })
        .collect()
}

fn filter_rows(current: &Table, previous: &Table, comparable: &[ColumnPair]) -> FilteredRows {
    let current_columns: Vec<usize> = comparable.iter().map(|c| c.current).collect();
    let previous_columns: Vec<usize> = comparable.iter().map(|c| c.previous).collect();

    let current_hashes = RowFingerprinter::new(current, &current_columns).hash_rows();
    let previous_hashes = RowFingerprinter::new(previous, &previous_columns).hash_rows();

    filter_unchanged(&current_hashes, &previous_hashes)
}

type KeyGroups<'t> = IndexMap<Vec<CanonicalValue<'t>>, Vec<usize>>;

fn group_by_key<'t>(table: &'t Table, rows: &[usize], key_columns: &[usize]) -> KeyGroups<'t> {
    let mut groups: KeyGroups<'t> = IndexMap::new();
    for &row in rows {
        let key = key_columns
            .iter()
            .map(|&column| table.value(row, column).canonical())
            .collect();
        groups.entry(key).or_default().push(row);
    }
    groups
}

/// Sort a key group by its non-key values; ties keep row order
fn sort_group(table: &Table, rows: &[usize], value_columns: &[usize]) -> Vec<usize> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_cached_key(|&row| {
        value_columns
            .iter()
            .map(|&column| table.value(row, column).canonical())
            .collect::<Vec<_>>()
    });
    sorted
}

/// Pair filtered rows sharing a key value.
///
/// Keys present on one side only produce no pairs. Within a repeated key,
/// both groups are sorted by their non-key values and zipped, so surplus
/// rows on the larger side stay unpaired.
fn align_rows(
    current: &Table,
    previous: &Table,
    filtered: &FilteredRows,
    key_columns: &[&ColumnPair],
    value_columns: &[&ColumnPair],
) -> (Vec<RowPair>, Alignment) {
    let current_key: Vec<usize> = key_columns.iter().map(|c| c.current).collect();
    let previous_key: Vec<usize> = key_columns.iter().map(|c| c.previous).collect();

    let current_groups = group_by_key(current, &filtered.current, &current_key);
    let previous_groups = group_by_key(previous, &filtered.previous, &previous_key);

    let unique = current_groups.values().all(|rows| rows.len() == 1)
        && previous_groups.values().all(|rows| rows.len() == 1);
    let alignment = if unique { Alignment::Indexed } else { Alignment::Grouped };

    let current_values: Vec<usize> = value_columns.iter().map(|c| c.current).collect();
    let previous_values: Vec<usize> = value_columns.iter().map(|c| c.previous).collect();

    let mut pairs = Vec::new();
    for (key, current_rows) in &current_groups {
        let Some(previous_rows) = previous_groups.get(key) else {
            continue;
        };

        if let ([current_row], [previous_row]) = (current_rows.as_slice(), previous_rows.as_slice()) {
            pairs.push(RowPair {
                current: *current_row,
                previous: *previous_row,
            });
            continue;
        }

        let current_sorted = sort_group(current, current_rows, &current_values);
        let previous_sorted = sort_group(previous, previous_rows, &previous_values);
        pairs.extend(
            current_sorted
                .into_iter()
                .zip(previous_sorted)
                .map(|(current, previous)| RowPair { current, previous }),
        );
    }

    (pairs, alignment)
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
