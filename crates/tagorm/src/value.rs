//! Dynamically typed SQL values.
//!
//! [`Value`] is what flows between records, query arguments, and decoded rows.
//! It binds to `rusqlite` statements through [`ToSql`] and renders itself as a
//! SQL literal for the multi-row statements that are not parameterized.

use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqliteValue, ValueRef};
use std::fmt::Write;
use uuid::Uuid;

/// Text format used for timestamps, both when binding and when rendering literals.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// A SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Stored as `0` / `1`.
    Bool(bool),
    /// Stored as text in [`TIME_FORMAT`].
    Time(DateTime<Utc>),
    /// Stored as hyphenated text.
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value as an inline SQL literal.
    ///
    /// Text is single-quoted with embedded quotes doubled. NaN floats render as
    /// `NULL`, infinities as `9e999` / `-9e999`.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) if f.is_nan() => "NULL".to_string(),
            // Out-of-range literals parse as infinity.
            Value::Real(f) if f.is_infinite() => {
                let literal = if *f > 0.0 { "9e999" } else { "-9e999" };
                literal.to_string()
            }
            Value::Real(f) => format!("{f:?}"),
            Value::Text(s) => quote_literal(s),
            Value::Blob(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 3);
                out.push_str("X'");
                for b in bytes {
                    let _ = write!(out, "{b:02X}");
                }
                out.push('\'');
                out
            }
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Time(t) => quote_literal(&t.format(TIME_FORMAT).to_string()),
            Value::Uuid(u) => quote_literal(&u.hyphenated().to_string()),
        }
    }

    pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Result<Self, String> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(bytes) => Value::Text(
                std::str::from_utf8(bytes)
                    .map_err(|e| e.to_string())?
                    .to_string(),
            ),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        })
    }
}

/// Quote a string as a SQL text literal.
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqliteValue::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(SqliteValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Bool(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            Value::Time(t) => {
                ToSqlOutput::Owned(SqliteValue::Text(t.format(TIME_FORMAT).to_string()))
            }
            Value::Uuid(u) => ToSqlOutput::Owned(SqliteValue::Text(u.hyphenated().to_string())),
        })
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a `Vec<Value>` from heterogeneous arguments.
///
/// ```ignore
/// conn.filter("name = ? AND age > ?", tagorm::args!["mark", 30]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn literal_escapes_quotes() {
        assert_eq!(Value::from("O'Brien").to_literal(), "'O''Brien'");
    }

    #[test]
    fn literal_nan_is_null() {
        assert_eq!(Value::Real(f64::NAN).to_literal(), "NULL");
        assert_eq!(Value::Real(7.0).to_literal(), "7.0");
    }

    #[test]
    fn literal_infinity_is_out_of_range_number() {
        assert_eq!(Value::Real(f64::INFINITY).to_literal(), "9e999");
        assert_eq!(Value::Real(f64::NEG_INFINITY).to_literal(), "-9e999");
    }

    #[test]
    fn literal_bool_and_null() {
        assert_eq!(Value::Bool(true).to_literal(), "1");
        assert_eq!(Value::Bool(false).to_literal(), "0");
        assert_eq!(Value::from(None::<i64>).to_literal(), "NULL");
    }

    #[test]
    fn literal_time_and_uuid() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Value::Time(t).to_literal(), "'2024-01-02 03:04:05+00:00'");

        let id = Uuid::nil();
        assert_eq!(
            Value::Uuid(id).to_literal(),
            "'00000000-0000-0000-0000-000000000000'"
        );
    }

    #[test]
    fn literal_blob_is_hex() {
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_literal(), "X'DEAD'");
    }

    #[test]
    fn args_macro_mixes_types() {
        let args = crate::args!["mark", 30, true];
        assert_eq!(
            args,
            vec![
                Value::Text("mark".into()),
                Value::Integer(30),
                Value::Bool(true)
            ]
        );
        assert!(crate::args![].is_empty());
    }
}
