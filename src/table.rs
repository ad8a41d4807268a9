//! In-memory tabular model shared by the loaders and the diff engine

use crate::error::{Result, TabregressError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Declared type of a column.
///
/// Loaders map their native type names onto this closed set; anything that
/// does not fit one of the coarse families is carried as `Other` and only
/// ever compared by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer { bits: u8 },
    UnsignedInteger { bits: u8 },
    Float { bits: u8 },
    Boolean,
    Text,
    /// Dates and timestamps, labelled with their precise descriptor
    Temporal(String),
    Other(String),
}

/// Coarse family used to decide whether two types can be value-compared
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Numeric,
    Textual,
    Temporal,
    Exact(String),
}

impl DataType {
    pub fn int64() -> Self {
        Self::Integer { bits: 64 }
    }

    pub fn float64() -> Self {
        Self::Float { bits: 64 }
    }

    pub fn temporal(label: impl Into<String>) -> Self {
        Self::Temporal(label.into().to_lowercase())
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self::Other(name.into().to_lowercase())
    }

    /// Parse a free-form type descriptor.
    ///
    /// Accepts DuckDB names (`BIGINT`, `VARCHAR`, `TIMESTAMP WITH TIME ZONE`)
    /// as well as dataframe style names (`int64`, `object`,
    /// `datetime64[ns]`). `intN`/`uintN`/`floatN` always denote N bits.
    /// Parameterized labels such as `int64[pyarrow]` or `string_pyarrow`
    /// are classified by their base name.
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        Self::classify(&normalized, &normalized)
            .or_else(|| base_name(&normalized).and_then(|base| Self::classify(base, &normalized)))
            .unwrap_or(Self::Other(normalized))
    }

    /// Known type for `name`; temporal types keep the full `label`
    fn classify(name: &str, label: &str) -> Option<Self> {
        let dtype = match name {
            "tinyint" | "int8" | "byte" => Self::Integer { bits: 8 },
            "smallint" | "int16" | "short" => Self::Integer { bits: 16 },
            "integer" | "int" | "int32" | "signed" => Self::Integer { bits: 32 },
            "bigint" | "int64" | "long" => Self::Integer { bits: 64 },
            "hugeint" | "int128" => Self::Integer { bits: 128 },
            "utinyint" | "uint8" => Self::UnsignedInteger { bits: 8 },
            "usmallint" | "uint16" => Self::UnsignedInteger { bits: 16 },
            "uinteger" | "uint32" => Self::UnsignedInteger { bits: 32 },
            "ubigint" | "uint64" => Self::UnsignedInteger { bits: 64 },
            "uhugeint" | "uint128" => Self::UnsignedInteger { bits: 128 },
            "float16" | "halffloat" => Self::Float { bits: 16 },
            "float" | "real" | "float32" | "float4" => Self::Float { bits: 32 },
            "double" | "float64" | "float8" => Self::Float { bits: 64 },
            "boolean" | "bool" | "logical" => Self::Boolean,
            "varchar" | "text" | "string" | "str" | "object" | "utf8" | "large_string"
            | "large_utf8" | "char" | "bpchar" => Self::Text,
            "date" | "date32" | "date64" | "datetime" => Self::Temporal(label.to_string()),
            s if s.starts_with("varchar(") || s.starts_with("char(") => Self::Text,
            s if s.starts_with("timestamp") || s.starts_with("datetime64") => {
                Self::Temporal(label.to_string())
            }
            _ => return None,
        };
        Some(dtype)
    }

    pub fn family(&self) -> TypeFamily {
        match self {
            Self::Integer { .. } | Self::UnsignedInteger { .. } | Self::Float { .. } | Self::Boolean => {
                TypeFamily::Numeric
            }
            Self::Text => TypeFamily::Textual,
            Self::Temporal(_) => TypeFamily::Temporal,
            Self::Other(name) => TypeFamily::Exact(name.to_lowercase()),
        }
    }

    /// Whether values of the two types can be meaningfully equality-compared
    pub fn is_compatible_with(&self, other: &DataType) -> bool {
        self.family() == other.family()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { bits } => write!(f, "int{}", bits),
            Self::UnsignedInteger { bits } => write!(f, "uint{}", bits),
            Self::Float { bits } => write!(f, "float{}", bits),
            Self::Boolean => f.write_str("bool"),
            Self::Text => f.write_str("string"),
            Self::Temporal(label) => f.write_str(label),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// `int64[pyarrow]` -> `int64`, `decimal(10,2)` -> `decimal`, `string_pyarrow` -> `string`.
///
/// DuckDB list and array types (`varchar[]`, `integer[3]`) have no base name.
fn base_name(label: &str) -> Option<&str> {
    let end = label.find(['[', '(']).unwrap_or(label.len());
    if let Some(rest) = label[end..].strip_prefix('[') {
        let inner = rest.split(']').next().unwrap_or_default();
        if inner.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    let base = label[..end].trim_end();
    Some(base.strip_suffix("_pyarrow").unwrap_or(base))
}

impl From<&str> for DataType {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// Microseconds since the Unix epoch
    Timestamp(i64),
    Bytes(Vec<u8>),
    /// Opaque rendering of anything else (decimals, nested values)
    Other(String),
}

/// Normalized, totally ordered view of a value.
///
/// Two values are equal under null-safe comparison exactly when their
/// canonical forms are equal: missing markers (null, NaN) collapse together
/// and numbers compare by value across integer, float and boolean storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalValue<'a> {
    Missing,
    Integer(i128),
    Float(u64),
    Text(&'a str),
    Temporal(i64),
    Bytes(&'a [u8]),
    Other(&'a str),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn canonical(&self) -> CanonicalValue<'_> {
        match self {
            Self::Null => CanonicalValue::Missing,
            Self::Bool(b) => CanonicalValue::Integer(i128::from(*b)),
            Self::Int(i) => CanonicalValue::Integer(i128::from(*i)),
            Self::UInt(u) => CanonicalValue::Integer(i128::from(*u)),
            Self::Float(f) => canonical_float(*f),
            Self::Text(s) => CanonicalValue::Text(s),
            Self::Timestamp(t) => CanonicalValue::Temporal(*t),
            Self::Bytes(b) => CanonicalValue::Bytes(b),
            Self::Other(s) => CanonicalValue::Other(s),
        }
    }

    /// `a == b` or both missing
    pub fn null_safe_eq(&self, other: &Value) -> bool {
        self.canonical() == other.canonical()
    }

    pub fn from_date_days(days: i64) -> Self {
        Self::Timestamp(days * MICROS_PER_DAY)
    }
}

fn canonical_float(f: f64) -> CanonicalValue<'static> {
    if f.is_nan() {
        CanonicalValue::Missing
    } else if f.fract() == 0.0 && f.abs() < 1e38 {
        // integral floats share the integer encoding, which also folds -0.0 into 0
        CanonicalValue::Integer(f as i128)
    } else {
        CanonicalValue::Float(f.to_bits())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::UInt(u) => write!(f, "{}", u),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(micros) => match chrono::DateTime::<chrono::Utc>::from_timestamp_micros(*micros) {
                Some(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
                None => write!(f, "{}", micros),
            },
            Self::Bytes(bytes) => {
                f.write_str("0x")?;
                bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
            }
            Self::Other(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A named, typed column of values.
///
/// `declared_type` is the descriptor exactly as the source reported it and
/// is what schema comparison reports; `data_type` is its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub declared_type: String,
    pub data_type: DataType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            declared_type: data_type.to_string(),
            data_type,
            values,
        }
    }

    /// Column typed by a source descriptor such as `BIGINT` or `object`
    pub fn declared(name: impl Into<String>, declared_type: impl Into<String>, values: Vec<Value>) -> Self {
        let declared_type = declared_type.into();
        Self {
            name: name.into(),
            data_type: DataType::parse(&declared_type),
            declared_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered collection of equally long columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, rejecting ragged columns and duplicate names
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TabregressError::invalid_table(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(ragged) = columns.iter().find(|c| c.len() != row_count) {
            return Err(TabregressError::invalid_table(format!(
                "column '{}' has {} values, expected {}",
                ragged.name,
                ragged.len(),
                row_count
            )));
        }

        Ok(Self { columns, row_count })
    }

    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn data_type(&self, name: &str) -> Option<&DataType> {
        self.column(name).map(|c| &c.data_type)
    }

    pub fn declared_type(&self, name: &str) -> Option<&str> {
        self.column(name).map(|c| c.declared_type.as_str())
    }

    /// Cell at `row` of the column at position `column`
    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.columns[column].values[row]
    }
}

/// Incremental table construction, mostly for fixtures and demos
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
}

impl TableBuilder {
    pub fn column<V: Into<Value>>(
        mut self,
        name: &str,
        data_type: DataType,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.columns.push(Column::new(name, data_type, values));
        self
    }

    /// Like [`TableBuilder::column`], typed by a source descriptor
    pub fn declared_column<V: Into<Value>>(
        mut self,
        name: &str,
        declared_type: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.columns.push(Column::declared(name, declared_type, values));
        self
    }

    pub fn build(self) -> Result<Table> {
        Table::new(self.columns)
    }
}
