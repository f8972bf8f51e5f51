//! Table schemas derived from record descriptors.

use crate::error::{OrmError, OrmResult};
use crate::ident::is_valid_ident;
use crate::record::Record;
use crate::types::DataType;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One column of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub length: Option<u32>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: data_type.length_hint(),
        }
    }

    /// `name NATIVE`, as used inside `CREATE TABLE`.
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.name, self.data_type.native_type())
    }
}

/// Ordered set of uniquely named columns for one table.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub table_name: String,
    columns: Vec<Column>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build the schema for a record type.
    pub fn from_record<R: Record>() -> OrmResult<Self> {
        let table = R::table_name();
        let defs = R::columns();
        if defs.is_empty() {
            return Err(OrmError::config(format!("{table}: no persisted fields")));
        }
        if !is_valid_ident(table) {
            return Err(OrmError::config(format!("invalid table name '{table}'")));
        }

        let mut schema = Self::new(table);
        for def in defs {
            schema.add_column(Column::new(def.name, def.data_type))?;
        }
        Ok(schema)
    }

    /// Append a column; names must be unique and safe identifiers.
    pub fn add_column(&mut self, column: Column) -> OrmResult<()> {
        if !is_valid_ident(&column.name) {
            return Err(OrmError::config(format!(
                "{}: invalid column name '{}'",
                self.table_name, column.name
            )));
        }
        if self.index.contains_key(&column.name) {
            return Err(OrmError::config(format!(
                "{}: duplicate column '{}'",
                self.table_name, column.name
            )));
        }
        self.index.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&idx| &self.columns[idx])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `CREATE TABLE <table> (<col> <TYPE>,...)`
    pub fn to_sql(&self) -> String {
        let body = self
            .columns
            .iter()
            .map(Column::to_sql)
            .collect::<Vec<_>>()
            .join(",");
        format!("CREATE TABLE {} ({})", self.table_name, body)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
