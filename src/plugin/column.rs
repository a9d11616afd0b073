//! Column definitions and values

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Semantic type of a column as seen by the query engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Bool,
    Int,
    Json,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "STRING",
            ColumnType::Bool => "BOOL",
            ColumnType::Int => "INT",
            ColumnType::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// One cell of a row
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Null,
    String(String),
    Bool(bool),
    Int(i64),
    Json(Value),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Serialize anything into a JSON cell; unserializable input becomes null
    pub fn json<T: Serialize + ?Sized>(value: Option<&T>) -> Self {
        value
            .and_then(|v| serde_json::to_value(v).ok())
            .map(ColumnValue::Json)
            .unwrap_or(ColumnValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<&str>> for ColumnValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(ColumnValue::Null, |s| ColumnValue::String(s.to_string()))
    }
}

impl From<Option<bool>> for ColumnValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(ColumnValue::Null, ColumnValue::Bool)
    }
}

impl From<Option<i64>> for ColumnValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(ColumnValue::Null, ColumnValue::Int)
    }
}

/// Table-independent description of a column
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub column_type: String,
    pub description: &'static str,
}

/// A column of a table over records of type `R`.
///
/// `transform` reads the cell straight off the typed record; `default` is
/// used when the record has no value for it.
pub struct Column<R> {
    name: &'static str,
    column_type: ColumnType,
    description: &'static str,
    transform: fn(&R) -> ColumnValue,
    default: Option<ColumnValue>,
}

impl<R> Column<R> {
    pub fn new(
        name: &'static str,
        column_type: ColumnType,
        description: &'static str,
        transform: fn(&R) -> ColumnValue,
    ) -> Self {
        Self {
            name,
            column_type,
            description,
            transform,
            default: None,
        }
    }

    pub fn with_default(mut self, default: ColumnValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self, record: &R) -> ColumnValue {
        let value = (self.transform)(record);
        match (&value, &self.default) {
            (ColumnValue::Null, Some(default)) => default.clone(),
            _ => value,
        }
    }

    pub fn def(&self) -> ColumnDef {
        ColumnDef {
            name: self.name,
            column_type: self.column_type.to_string(),
            description: self.description,
        }
    }
}
