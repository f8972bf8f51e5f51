//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use crate::types::ColumnType;
use crate::value::Value;
use std::sync::Arc;

/// An owned result row.
///
/// Column names are shared between all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Try to get a column value, returning `OrmError::Decode` on failure
    pub fn try_get_column<T: ColumnType>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| OrmError::decode(column, "column not present in result set"))?;
        T::from_value(value).map_err(|message| OrmError::decode(column, message))
    }
}

/// Trait for converting a result row into a Rust type.
///
/// This trait should typically be derived using `#[derive(FromRow)]`.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> OrmResult<Self>;
}
