//! Generic client trait for unified database access.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::Value;
use rusqlite::params_from_iter;
use rusqlite::types::ToSql;
use std::sync::Arc;

/// The executor seam used by every dialect operation.
///
/// Statements use positional `?` placeholders ([`GenericClient::execute`],
/// [`GenericClient::query`]) or `:name` placeholders
/// ([`GenericClient::execute_named`]). The trait is object safe so dialects can
/// take `&dyn GenericClient`.
pub trait GenericClient {
    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<usize>;

    /// Execute a statement bound by `:name` parameters.
    ///
    /// Parameter names are given without the leading colon.
    fn execute_named(&self, sql: &str, params: &[(String, Value)]) -> OrmResult<usize>;

    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    /// Execute a query and return the **first** row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`OrmError::NotFound`]
    /// - 1 or more rows: returns the first row
    fn query_one(&self, sql: &str, params: &[Value]) -> OrmResult<Row> {
        self.query(sql, params)?
            .into_iter()
            .next()
            .ok_or_else(|| OrmError::not_found("no rows in result set"))
    }

    /// Execute a query and return at most one row.
    fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }
}

impl GenericClient for rusqlite::Connection {
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<usize> {
        let mut stmt = self.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(params.iter()))?)
    }

    fn execute_named(&self, sql: &str, params: &[(String, Value)]) -> OrmResult<usize> {
        let names: Vec<String> = params.iter().map(|(name, _)| format!(":{name}")).collect();
        let bound: Vec<(&str, &dyn ToSql)> = names
            .iter()
            .zip(params)
            .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
            .collect();
        let mut stmt = self.prepare_cached(sql)?;
        Ok(stmt.execute(bound.as_slice())?)
    }

    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let mut stmt = self.prepare_cached(sql)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let count = columns.len();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(count);
            for (idx, column) in columns.iter().enumerate() {
                let value = Value::from_value_ref(row.get_ref(idx)?)
                    .map_err(|message| OrmError::decode(column.as_str(), message))?;
                values.push(value);
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(out)
    }
}
