//! Backend dialects.
//!
//! A [`Dialect`] names a backend, translates generated SQL into its syntax, and
//! performs the CRUD operations. The backend-agnostic algorithms live in
//! [`generic`]; a dialect usually delegates to them and adds its own context to
//! errors.

pub mod generic;
mod sqlite;

pub use sqlite::Sqlite;

use crate::builder::CompiledSql;
use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::model::Model;
use crate::record::Record;
use std::collections::HashMap;

/// A SQL backend.
pub trait Dialect: Send + Sync {
    /// Backend name, used in error context.
    fn name(&self) -> &'static str;

    /// Rewrite generated SQL into the backend's syntax.
    fn translate_sql(&self, sql: &str) -> String;

    /// Insert one record.
    fn create<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
    ) -> OrmResult<()>;

    /// Insert a slice of records with one statement.
    fn create_many<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
    ) -> OrmResult<()>;

    /// Update one record by identity.
    fn update<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
    ) -> OrmResult<()>;

    /// Delete one record by identity.
    fn destroy<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
    ) -> OrmResult<()>;

    /// Delete a slice of records with one statement.
    fn destroy_many<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
    ) -> OrmResult<()>;

    /// Run a compiled query and decode the first row into the bound record.
    fn select_one<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
        query: &CompiledSql,
    ) -> OrmResult<()>;

    /// Run a compiled query and replace the bound result vector.
    fn select_many<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
        query: &CompiledSql,
    ) -> OrmResult<()>;

    /// Select through the record's view template.
    fn sql_view<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
        format: Option<&HashMap<String, String>>,
    ) -> OrmResult<()>;

    /// Create the record's table.
    fn create_table<R: Record>(&self, db: &dyn GenericClient) -> OrmResult<()>;
}

#[cfg(test)]
mod tests;
