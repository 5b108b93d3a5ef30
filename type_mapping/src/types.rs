//! Value type definitions
//!
//! This module provides the scalar value model shared by bind parameters and
//! result rows, and the semantic field types records are converted into.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Untyped scalar as exchanged with the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime), // timezone-aware columns are normalized to UTC
    Uuid(Uuid),
    Json(serde_json::Value),
}

impl SqlValue {
    /// Short name of the variant, used in conversion errors
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Date(_) => "date",
            SqlValue::DateTime(_) => "datetime",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(v) => write!(f, "{}", v),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "{}", v),
            SqlValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            SqlValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            SqlValue::Uuid(v) => write!(f, "{}", v),
            SqlValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for SqlValue {
    fn from(val: String) -> Self {
        SqlValue::Text(val)
    }
}

impl From<&str> for SqlValue {
    fn from(val: &str) -> Self {
        SqlValue::Text(val.to_string())
    }
}

impl From<i32> for SqlValue {
    fn from(val: i32) -> Self {
        SqlValue::Int(i64::from(val))
    }
}

impl From<i64> for SqlValue {
    fn from(val: i64) -> Self {
        SqlValue::Int(val)
    }
}

impl From<f64> for SqlValue {
    fn from(val: f64) -> Self {
        SqlValue::Float(val)
    }
}

impl From<bool> for SqlValue {
    fn from(val: bool) -> Self {
        SqlValue::Bool(val)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(val: NaiveDate) -> Self {
        SqlValue::Date(val)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(val: NaiveDateTime) -> Self {
        SqlValue::DateTime(val)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for SqlValue {
    fn from(val: chrono::DateTime<chrono::Utc>) -> Self {
        SqlValue::DateTime(val.naive_utc())
    }
}

impl From<Uuid> for SqlValue {
    fn from(val: Uuid) -> Self {
        SqlValue::Uuid(val)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(val: serde_json::Value) -> Self {
        SqlValue::Json(val)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// Semantic type a field is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Int,
    Float,
    #[default]
    String,
    Date,
    DateTime,
    Json,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Json => "json",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(FieldType::Bool),
            "int" | "integer" | "long" | "bigint" => Ok(FieldType::Int),
            "float" | "double" | "decimal" | "number" => Ok(FieldType::Float),
            "string" | "text" | "varchar" => Ok(FieldType::String),
            "date" => Ok(FieldType::Date),
            "datetime" | "timestamp" => Ok(FieldType::DateTime),
            "json" => Ok(FieldType::Json),
            other => Err(format!("unknown field type '{}'", other)),
        }
    }
}
