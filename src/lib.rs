//! # tabregress
//!
//! Regression detection between two versions of a tabular dataset: schema
//! changes, row-count changes and per-column value changes, with rows paired
//! by a declared primary key.

pub mod cli;
pub mod commands;
pub mod comparator;
pub mod config;
pub mod data;
pub mod error;
pub mod hash;
pub mod output;
pub mod parquet_reader;
pub mod progress;
pub mod report;
pub mod schema_diff;
pub mod table;
pub mod value_diff;

pub use comparator::TableComparator;
pub use error::{Result, TabregressError};
pub use report::{is_regression, RegressionReport};
pub use schema_diff::{are_types_compatible, SchemaDiff, SchemaDiffer};
pub use table::{DataType, Table, Value};
pub use value_diff::{ValueDiff, ValueDiffer};
