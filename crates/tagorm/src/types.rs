//! Semantic column types and the Rust types that map to them.

use crate::value::Value;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Semantic data type of a persisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Int,
    Float,
    Bool,
    Time,
    Uuid,
    NullString,
    NullInt,
    NullFloat,
    NullBool,
    NullTime,
}

impl DataType {
    /// Native SQLite column type used in `CREATE TABLE`.
    pub fn native_type(self) -> &'static str {
        match self {
            DataType::String | DataType::NullString | DataType::Uuid => "TEXT",
            DataType::Int | DataType::NullInt | DataType::Bool | DataType::NullBool => "INT",
            DataType::Float | DataType::NullFloat | DataType::Time | DataType::NullTime => {
                "NUMERIC"
            }
        }
    }

    /// Length hint recorded on the schema column.
    pub fn length_hint(self) -> Option<u32> {
        match self {
            DataType::String => Some(50),
            DataType::Uuid => Some(36),
            _ => None,
        }
    }

    pub fn is_nullable(self) -> bool {
        matches!(
            self,
            DataType::NullString
                | DataType::NullInt
                | DataType::NullFloat
                | DataType::NullBool
                | DataType::NullTime
        )
    }

    pub fn is_time(self) -> bool {
        matches!(self, DataType::Time | DataType::NullTime)
    }
}

/// A Rust type that can be stored in a tagged field.
///
/// Implemented for the closed set of supported field types. Using any other
/// type in a `#[orm(column = "...")]` field is a compile error.
pub trait ColumnType: Sized {
    const DATA_TYPE: DataType;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self, String>;
}

/// Marker for types whose `Option<T>` has a nullable semantic type.
pub trait NullableColumn: ColumnType {
    const NULL_DATA_TYPE: DataType;
}

fn mismatch(expected: &str, got: &Value) -> String {
    format!("expected {expected}, got {got:?}")
}

impl ColumnType for String {
    const DATA_TYPE: DataType = DataType::String;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Real(f) => Ok(f.to_string()),
            Value::Uuid(u) => Ok(u.hyphenated().to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl NullableColumn for String {
    const NULL_DATA_TYPE: DataType = DataType::NullString;
}

macro_rules! impl_int_column {
    ($($ty:ty),*) => {
        $(
            impl ColumnType for $ty {
                const DATA_TYPE: DataType = DataType::Int;

                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }

                fn from_value(value: &Value) -> Result<Self, String> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(*i)
                            .map_err(|_| format!("integer {i} out of range for {}", stringify!($ty))),
                        Value::Bool(b) => Ok(<$ty>::from(*b)),
                        other => Err(mismatch("integer", other)),
                    }
                }
            }

            impl NullableColumn for $ty {
                const NULL_DATA_TYPE: DataType = DataType::NullInt;
            }
        )*
    };
}

impl_int_column!(i8, i16, i32, i64, u8, u16, u32);

impl ColumnType for f64 {
    const DATA_TYPE: DataType = DataType::Float;

    fn to_value(&self) -> Value {
        Value::Real(*self)
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Real(f) => Ok(*f),
            // NUMERIC affinity stores integral reals as integers.
            Value::Integer(i) => Ok(*i as f64),
            other => Err(mismatch("real", other)),
        }
    }
}

impl NullableColumn for f64 {
    const NULL_DATA_TYPE: DataType = DataType::NullFloat;
}

impl ColumnType for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl NullableColumn for f32 {
    const NULL_DATA_TYPE: DataType = DataType::NullFloat;
}

impl ColumnType for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Integer(i) => Ok(*i != 0),
            other => Err(mismatch("boolean", other)),
        }
    }
}

impl NullableColumn for bool {
    const NULL_DATA_TYPE: DataType = DataType::NullBool;
}

const TIME_PARSE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_TIME_PARSE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in TIME_PARSE_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(s, fmt) {
            return Ok(t.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_TIME_PARSE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t.and_utc());
        }
    }
    Err(format!("invalid timestamp '{s}'"))
}

impl ColumnType for DateTime<Utc> {
    const DATA_TYPE: DataType = DataType::Time;

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Time(t) => Ok(*t),
            Value::Text(s) => parse_time(s),
            Value::Integer(secs) => DateTime::from_timestamp(*secs, 0)
                .ok_or_else(|| format!("timestamp {secs} out of range")),
            Value::Real(f) => {
                let secs = f.floor();
                let nanos = ((f - secs) * 1e9).round() as u32;
                DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
                    .ok_or_else(|| format!("timestamp {f} out of range"))
            }
            other => Err(mismatch("timestamp", other)),
        }
    }
}

impl NullableColumn for DateTime<Utc> {
    const NULL_DATA_TYPE: DataType = DataType::NullTime;
}

impl ColumnType for Uuid {
    const DATA_TYPE: DataType = DataType::Uuid;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => Uuid::parse_str(s).map_err(|e| e.to_string()),
            Value::Blob(b) => Uuid::from_slice(b).map_err(|e| e.to_string()),
            other => Err(mismatch("uuid", other)),
        }
    }
}

impl<T: NullableColumn> ColumnType for Option<T> {
    const DATA_TYPE: DataType = T::NULL_DATA_TYPE;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
