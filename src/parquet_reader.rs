//! Native Parquet loading
//!
//! Parquet physical and logical types are mapped onto the same DuckDB type
//! names the CSV/JSON path produces, so a dataset exported in two formats
//! yields identical schemas.

use crate::error::{Result, TabregressError};
use crate::table::{Column, Table, Value};
use parquet::basic::{ConvertedType, LogicalType, TimeUnit, Type as PhysicalType};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use parquet::schema::types::Type;
use std::fs::File;
use std::path::Path;

pub fn read_parquet_table(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let reader = SerializedFileReader::new(file)?;

    let fields = reader.metadata().file_metadata().schema_descr().root_schema().get_fields().to_vec();
    let mut values: Vec<Vec<Value>> = vec![Vec::new(); fields.len()];

    for row in reader.get_row_iter(None)? {
        let row = row?;
        let mut cells = 0;
        for (column, (_, field)) in values.iter_mut().zip(row.get_column_iter()) {
            column.push(convert_field(field));
            cells += 1;
        }
        if cells != fields.len() {
            return Err(TabregressError::data_processing(format!(
                "Parquet row in {} has {} fields, expected {}",
                path.display(),
                cells,
                fields.len()
            )));
        }
    }

    let columns = fields
        .iter()
        .zip(values)
        .map(|(field, values)| Column::declared(field.name(), duckdb_type_name(field), values))
        .collect();
    Table::new(columns)
}

/// DuckDB name for a top-level Parquet field
fn duckdb_type_name(field: &Type) -> String {
    if !field.is_primitive() {
        return match field.get_basic_info().logical_type() {
            Some(LogicalType::List) => "LIST".to_string(),
            Some(LogicalType::Map) => "MAP".to_string(),
            _ => "STRUCT".to_string(),
        };
    }

    let info = field.get_basic_info();
    match info.logical_type() {
        Some(LogicalType::String) | Some(LogicalType::Enum) | Some(LogicalType::Json) => {
            return "VARCHAR".to_string()
        }
        Some(LogicalType::Date) => return "DATE".to_string(),
        Some(LogicalType::Timestamp { unit, .. }) => {
            return match unit {
                TimeUnit::MILLIS(_) => "TIMESTAMP_MS",
                TimeUnit::MICROS(_) => "TIMESTAMP",
                TimeUnit::NANOS(_) => "TIMESTAMP_NS",
            }
            .to_string()
        }
        Some(LogicalType::Decimal { scale, precision }) => {
            return format!("DECIMAL({},{})", precision, scale)
        }
        Some(LogicalType::Integer { bit_width, is_signed }) => {
            return integer_name(bit_width, is_signed).to_string()
        }
        _ => {}
    }

    match info.converted_type() {
        ConvertedType::UTF8 | ConvertedType::ENUM | ConvertedType::JSON => return "VARCHAR".to_string(),
        ConvertedType::DATE => return "DATE".to_string(),
        ConvertedType::TIMESTAMP_MILLIS => return "TIMESTAMP_MS".to_string(),
        ConvertedType::TIMESTAMP_MICROS => return "TIMESTAMP".to_string(),
        ConvertedType::INT_8 => return "TINYINT".to_string(),
        ConvertedType::INT_16 => return "SMALLINT".to_string(),
        ConvertedType::INT_32 => return "INTEGER".to_string(),
        ConvertedType::INT_64 => return "BIGINT".to_string(),
        ConvertedType::UINT_8 => return "UTINYINT".to_string(),
        ConvertedType::UINT_16 => return "USMALLINT".to_string(),
        ConvertedType::UINT_32 => return "UINTEGER".to_string(),
        ConvertedType::UINT_64 => return "UBIGINT".to_string(),
        _ => {}
    }

    match field.get_physical_type() {
        PhysicalType::BOOLEAN => "BOOLEAN",
        PhysicalType::INT32 => "INTEGER",
        PhysicalType::INT64 => "BIGINT",
        PhysicalType::INT96 => "TIMESTAMP_NS",
        PhysicalType::FLOAT => "FLOAT",
        PhysicalType::DOUBLE => "DOUBLE",
        PhysicalType::BYTE_ARRAY | PhysicalType::FIXED_LEN_BYTE_ARRAY => "BLOB",
    }
    .to_string()
}

fn integer_name(bit_width: i8, is_signed: bool) -> &'static str {
    match (bit_width, is_signed) {
        (8, true) => "TINYINT",
        (16, true) => "SMALLINT",
        (32, true) => "INTEGER",
        (_, true) => "BIGINT",
        (8, false) => "UTINYINT",
        (16, false) => "USMALLINT",
        (32, false) => "UINTEGER",
        (_, false) => "UBIGINT",
    }
}

fn convert_field(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Bool(*b),
        Field::Byte(i) => Value::Int((*i).into()),
        Field::Short(i) => Value::Int((*i).into()),
        Field::Int(i) => Value::Int((*i).into()),
        Field::Long(i) => Value::Int(*i),
        Field::UByte(u) => Value::UInt((*u).into()),
        Field::UShort(u) => Value::UInt((*u).into()),
        Field::UInt(u) => Value::UInt((*u).into()),
        Field::ULong(u) => Value::UInt(*u),
        Field::Float(f) => Value::Float((*f).into()),
        Field::Double(f) => Value::Float(*f),
        Field::Str(s) => Value::Text(s.clone()),
        Field::Bytes(b) => Value::Bytes(b.data().to_vec()),
        Field::Date(days) => Value::from_date_days((*days).into()),
        Field::TimestampMillis(ms) => Value::Timestamp(ms.saturating_mul(1_000)),
        Field::TimestampMicros(us) => Value::Timestamp(*us),
        other => Value::Other(other.to_string()),
    }
}
