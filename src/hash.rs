//! Row fingerprinting for unchanged-row filtering

use crate::table::{CanonicalValue, Table};
use blake3::{Hash, Hasher};
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};

/// Rows that survive unchanged-row filtering, as indices into each table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredRows {
    pub current: Vec<usize>,
    pub previous: Vec<usize>,
}

impl FilteredRows {
    /// Number of row pairs that cancelled out
    pub fn unchanged_count(&self, current_total: usize) -> usize {
        current_total.saturating_sub(self.current.len())
    }
}

/// Computes blake3 fingerprints over a fixed projection of columns
pub struct RowFingerprinter<'a> {
    table: &'a Table,
    columns: &'a [usize],
}

impl<'a> RowFingerprinter<'a> {
    /// `columns` are column positions in `table`; two fingerprinters only
    /// produce comparable digests when their projections name the same
    /// logical columns in the same order.
    pub fn new(table: &'a Table, columns: &'a [usize]) -> Self {
        Self { table, columns }
    }

    pub fn hash_row(&self, row: usize) -> Hash {
        let mut hasher = Hasher::new();
        for &column in self.columns {
            update_with_value(&mut hasher, self.table.value(row, column).canonical());
        }
        hasher.finalize()
    }

    pub fn hash_rows(&self) -> Vec<Hash> {
        (0..self.table.row_count())
            .into_par_iter()
            .map(|row| self.hash_row(row))
            .collect()
    }
}

/// Cancel rows whose fingerprints appear on both sides, one for one.
///
/// A current row is matched with the earliest still-unmatched previous row
/// carrying the same fingerprint. Duplicates within one side only cancel as
/// many times as the other side holds the same row.
pub fn filter_unchanged(current: &[Hash], previous: &[Hash]) -> FilteredRows {
    let mut unmatched: HashMap<&Hash, VecDeque<usize>> = HashMap::new();
    for (idx, hash) in previous.iter().enumerate() {
        unmatched.entry(hash).or_default().push_back(idx);
    }

    let mut previous_matched = vec![false; previous.len()];
    let mut surviving_current = Vec::new();

    for (idx, hash) in current.iter().enumerate() {
        match unmatched.get_mut(hash).and_then(VecDeque::pop_front) {
            Some(previous_idx) => previous_matched[previous_idx] = true,
            None => surviving_current.push(idx),
        }
    }

    let surviving_previous = previous_matched
        .iter()
        .enumerate()
        .filter(|(_, matched)| !**matched)
        .map(|(idx, _)| idx)
        .collect();

    FilteredRows {
        current: surviving_current,
        previous: surviving_previous,
    }
}

fn update_with_value(hasher: &mut Hasher, value: CanonicalValue<'_>) {
    match value {
        CanonicalValue::Missing => {
            hasher.update(&[0]);
        }
        CanonicalValue::Integer(i) => {
            hasher.update(&[1]);
            hasher.update(&i.to_le_bytes());
        }
        CanonicalValue::Float(bits) => {
            hasher.update(&[2]);
            hasher.update(&bits.to_le_bytes());
        }
        CanonicalValue::Text(s) => {
            hasher.update(&[3]);
            update_with_bytes(hasher, s.as_bytes());
        }
        CanonicalValue::Temporal(t) => {
            hasher.update(&[4]);
            hasher.update(&t.to_le_bytes());
        }
        CanonicalValue::Other(s) => {
            hasher.update(&[5]);
            update_with_bytes(hasher, s.as_bytes());
        }
        CanonicalValue::Bytes(b) => {
            hasher.update(&[6]);
            update_with_bytes(hasher, b);
        }
    }
}

// Length prefix keeps ("ab", "c") and ("a", "bc") apart
fn update_with_bytes(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
