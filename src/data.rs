//! Table loading through DuckDB

use crate::config::LoaderSettings;
use crate::error::{Result, TabregressError};
use crate::parquet_reader::read_parquet_table;
use crate::table::{Column, Table, Value};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection;
use std::path::Path;

/// Loads CSV, TSV, JSON and Parquet files into in-memory tables
pub struct DataProcessor {
    connection: Connection,
}

/// Name and DuckDB type of a column in the current view
#[derive(Debug, Clone)]
struct ViewColumn {
    name: String,
    data_type: String,
}

impl DataProcessor {
    /// Create a new data processor with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&LoaderSettings::default())
    }

    pub fn with_settings(settings: &LoaderSettings) -> Result<Self> {
        settings.validate()?;
        let connection = Connection::open_in_memory()?;

        connection.execute(&format!("SET memory_limit='{}'", settings.memory_limit.trim()), [])?;
        connection.execute("SET enable_progress_bar=false", [])?;

        Ok(Self { connection })
    }

    /// Read a whole file into a `Table`, preserving row and column order
    pub fn load_table(&self, file_path: &Path) -> Result<Table> {
        if !file_path.exists() {
            return Err(TabregressError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }

        if !file_path.is_file() {
            return Err(TabregressError::invalid_input(format!(
                "Not a file: {}",
                file_path.display()
            )));
        }

        let extension = extension_of(file_path).ok_or_else(|| {
            TabregressError::invalid_input(format!(
                "Unsupported file format: {} (expected csv, tsv, json, jsonl or parquet)",
                file_path.display()
            ))
        })?;

        let table = if extension == "parquet" {
            read_parquet_table(file_path)?
        } else {
            self.create_view(file_path, &extension)?;
            self.read_view()?
        };

        log::debug!(
            "Loaded {} ({} rows, {} columns)",
            file_path.display(),
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }

    fn create_view(&self, file_path: &Path, extension: &str) -> Result<()> {
        let path_str = file_path.to_string_lossy().replace('\'', "''");
        let source = match extension {
            "tsv" => format!("read_csv_auto('{}', delim='\t', header=true)", path_str),
            "json" | "jsonl" => format!("read_json_auto('{}')", path_str),
            _ => format!("read_csv_auto('{}', header=true)", path_str),
        };

        let create_view_sql = format!("CREATE OR REPLACE VIEW data_view AS SELECT * FROM {}", source);
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| self.convert_duckdb_error(e, file_path))?;
        Ok(())
    }

    /// Convert DuckDB errors to appropriate TabregressError types
    fn convert_duckdb_error(&self, error: duckdb::Error, file_path: &Path) -> TabregressError {
        let error_msg = error.to_string();

        if error_msg.contains("CSV Error")
            || error_msg.contains("Could not convert")
            || error_msg.contains("Invalid CSV")
            || error_msg.contains("Unterminated quoted field")
        {
            TabregressError::invalid_input(format!(
                "Malformed CSV file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("JSON") {
            TabregressError::invalid_input(format!(
                "Malformed JSON file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
            TabregressError::invalid_input(format!("File not found: {}", file_path.display()))
        } else if error_msg.contains("Permission denied") {
            TabregressError::invalid_input(format!(
                "Permission denied accessing file: {}",
                file_path.display()
            ))
        } else if error_msg.contains("UTF-8") || error_msg.contains("encoding") {
            TabregressError::invalid_input(format!(
                "File encoding error '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else {
            TabregressError::DuckDb(error)
        }
    }

    fn view_columns(&self) -> Result<Vec<ViewColumn>> {
        let mut stmt = self.connection.prepare("DESCRIBE data_view")?;
        let rows = stmt.query_map([], |row| {
            Ok(ViewColumn {
                name: row.get::<_, String>(0)?,
                data_type: row.get::<_, String>(1)?,
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                TabregressError::data_processing(format!("Failed to describe column: {}", e))
            })?);
        }
        Ok(columns)
    }

    fn read_view(&self) -> Result<Table> {
        let view_columns = self.view_columns()?;
        let column_count = view_columns.len();
        let mut values: Vec<Vec<Value>> = vec![Vec::new(); column_count];

        if column_count > 0 {
            let mut stmt = self.connection.prepare("SELECT * FROM data_view")?;
            let rows = stmt.query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get_ref(i).map(convert_value))
                    .collect::<duckdb::Result<Vec<Value>>>()
            })?;

            for row in rows {
                let row = row.map_err(|e| {
                    TabregressError::data_processing(format!("Failed to read data row: {}", e))
                })?;
                for (column, value) in values.iter_mut().zip(row) {
                    column.push(value);
                }
            }
        }

        let columns = view_columns
            .into_iter()
            .zip(values)
            .map(|(column, values)| Column::declared(column.name, column.data_type, values))
            .collect();
        Table::new(columns)
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        extension_of(file_path).is_some()
    }
}

fn extension_of(file_path: &Path) -> Option<String> {
    let extension = file_path.extension()?.to_str()?.to_lowercase();
    matches!(extension.as_str(), "csv" | "tsv" | "json" | "jsonl" | "parquet").then_some(extension)
}

fn convert_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::Int(i.into()),
        ValueRef::SmallInt(i) => Value::Int(i.into()),
        ValueRef::Int(i) => Value::Int(i.into()),
        ValueRef::BigInt(i) => Value::Int(i),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Other(i.to_string())),
        ValueRef::UTinyInt(i) => Value::UInt(i.into()),
        ValueRef::USmallInt(i) => Value::UInt(i.into()),
        ValueRef::UInt(i) => Value::UInt(i.into()),
        ValueRef::UBigInt(i) => Value::UInt(i),
        ValueRef::Float(f) => Value::Float(f.into()),
        ValueRef::Double(f) => Value::Float(f),
        ValueRef::Decimal(d) => Value::Other(d.to_string()),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        ValueRef::Date32(days) => Value::from_date_days(days.into()),
        ValueRef::Timestamp(unit, raw) => Value::Timestamp(to_micros(unit, raw)),
        ValueRef::Time64(unit, raw) => Value::Other(format!("time:{}", to_micros(unit, raw))),
        other => Value::Other(format!("{:?}", other)),
    }
}

fn to_micros(unit: TimeUnit, raw: i64) -> i64 {
    match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    }
}
