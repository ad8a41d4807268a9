//! Error types for tabregress operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TabregressError>;

#[derive(Error, Debug)]
pub enum TabregressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Primary key column '{column}' not found in {table} table")]
    KeyColumnNotFound { column: String, table: String },

    #[error("Primary key column '{column}' changed to an incompatible type: {previous} -> {current}")]
    IncompatibleKeyColumn {
        column: String,
        previous: String,
        current: String,
    },

    #[error("Invalid table: {message}")]
    InvalidTable { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl TabregressError {
    pub fn key_column_not_found(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::KeyColumnNotFound {
            column: column.into(),
            table: table.into(),
        }
    }

    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
