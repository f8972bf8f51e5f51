//! Connections.
//!
//! A [`Connection`] owns the executor, the dialect, and the column cache. It is
//! the entry point for queries and CRUD operations.

use crate::cache::ColumnCache;
use crate::client::GenericClient;
use crate::config::ConnectionConfig;
use crate::dialect::{Dialect, Sqlite};
use crate::error::{OrmError, OrmResult};
use crate::model::Model;
use crate::monitor::InstrumentedClient;
use crate::query::{Built, Query, Raw};
use crate::record::Record;
use crate::row::Row;
use crate::value::Value;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// A database connection.
pub struct Connection<D: Dialect = Sqlite> {
    db: Box<dyn GenericClient + Send>,
    dialect: D,
    id: Uuid,
    columns: Arc<ColumnCache>,
    config: ConnectionConfig,
}

impl<D: Dialect> std::fmt::Debug for Connection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.dialect.name())
            .field("id", &self.id)
            .field("path", &self.config.path)
            .finish_non_exhaustive()
    }
}

impl Connection<Sqlite> {
    /// Open an in-memory SQLite database with default settings.
    pub fn open_in_memory() -> OrmResult<Self> {
        Self::connect(ConnectionConfig::new())
    }

    /// Open (or create) a SQLite database file with default settings.
    pub fn open(path: impl AsRef<Path>) -> OrmResult<Self> {
        Self::connect(ConnectionConfig::new().path(path.as_ref()))
    }

    /// Open a SQLite database as described by `config`.
    pub fn connect(config: ConnectionConfig) -> OrmResult<Self> {
        config.validate()?;
        let raw = match &config.path {
            Some(path) => rusqlite::Connection::open(path),
            None => rusqlite::Connection::open_in_memory(),
        }
        .map_err(|e| OrmError::Connection(e.to_string()))?;

        if let Some(timeout) = config.busy_timeout {
            raw.busy_timeout(timeout)
                .map_err(|e| OrmError::Connection(e.to_string()))?;
        }
        if let Some(sql) = &config.initial_sql {
            raw.execute_batch(sql)
                .map_err(|e| OrmError::from(e).context("initial sql"))?;
        }
        Self::with_client(Box::new(raw), Sqlite, config)
    }
}

impl<D: Dialect> Connection<D> {
    /// Build a connection over any executor.
    pub fn with_client(
        db: Box<dyn GenericClient + Send>,
        dialect: D,
        config: ConnectionConfig,
    ) -> OrmResult<Self> {
        config.validate()?;
        let conn = Self {
            db,
            dialect,
            id: Uuid::new_v4(),
            columns: Arc::new(ColumnCache::new()),
            config,
        };
        conn.write_marker()?;
        tracing::debug!(
            target: "tagorm",
            id = %conn.id,
            dialect = conn.dialect.name(),
            "connection opened"
        );
        Ok(conn)
    }

    /// Use a shared column cache instead of the connection's own.
    pub fn with_column_cache(mut self, cache: Arc<ColumnCache>) -> Self {
        self.columns = cache;
        self
    }

    fn write_marker(&self) -> OrmResult<()> {
        let Some(table) = &self.config.marker_table else {
            return Ok(());
        };
        let client = self.client();
        client.execute(
            &format!("CREATE TABLE IF NOT EXISTS {table} (id TEXT)"),
            &[],
        )?;
        client.execute(&format!("DELETE FROM {table}"), &[])?;
        client.execute(
            &format!("INSERT INTO {table} (id) VALUES (?)"),
            &[Value::Uuid(self.id)],
        )?;
        Ok(())
    }

    /// Verify that the marker table still holds this connection's id.
    pub fn check_id(&self) -> OrmResult<()> {
        let table = self
            .config
            .marker_table
            .as_deref()
            .ok_or_else(|| OrmError::config("connection marker table is disabled"))?;
        let row = self
            .client()
            .query_one(&format!("SELECT id FROM {table}"), &[])
            .map_err(|e| e.context("check id"))?;
        let stored: Uuid = row.try_get_column("id")?;
        if stored != self.id {
            return Err(OrmError::Connection(format!(
                "connection id mismatch: expected {}, found {stored}",
                self.id
            )));
        }
        Ok(())
    }

    /// Unique id generated when the connection was opened.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn column_cache(&self) -> &ColumnCache {
        &self.columns
    }

    /// The column cache, for sharing with other connections.
    pub fn shared_column_cache(&self) -> Arc<ColumnCache> {
        Arc::clone(&self.columns)
    }

    /// The executor, wrapped with SQL logging.
    pub fn client(&self) -> InstrumentedClient<'_> {
        InstrumentedClient::new(&*self.db, &self.config.log)
    }

    pub fn ping(&self) -> OrmResult<()> {
        self.client()
            .query_one("SELECT 1", &[])
            .map(|_| ())
            .map_err(|e| e.context("ping"))
    }

    /// Run a statement and return the number of affected rows.
    pub fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<usize> {
        self.client().execute(&self.dialect.translate_sql(sql), args)
    }

    /// Run a query and return the raw rows.
    pub fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Row>> {
        self.client().query(&self.dialect.translate_sql(sql), args)
    }

    pub fn close(self) -> OrmResult<()> {
        tracing::debug!(target: "tagorm", id = %self.id, "connection closed");
        drop(self.db);
        Ok(())
    }

    /// Start an empty builder query.
    pub fn q(&self) -> Query<'_, Built, D> {
        Query::new(self)
    }

    pub fn filter<I>(&self, stmt: &str, args: I) -> Query<'_, Built, D>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.q().filter(stmt, args)
    }

    pub fn order_by(&self, stmt: &str) -> Query<'_, Built, D> {
        self.q().order_by(stmt)
    }

    pub fn limit(&self, limit: usize) -> Query<'_, Built, D> {
        self.q().limit(limit)
    }

    pub fn raw<I>(&self, sql: &str, args: I) -> Query<'_, Raw, D>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.q().raw(sql, args)
    }

    /// Load the first row of `R`'s table into `record`.
    pub fn first<R: Record>(&self, record: &mut R) -> OrmResult<()> {
        self.q().first(record)
    }

    /// Replace `rows` with every row of `R`'s table.
    pub fn all<R: Record>(&self, rows: &mut Vec<R>) -> OrmResult<()> {
        self.q().all(rows)
    }

    /// Insert one record or each record of a slice, one statement per record.
    pub fn create<'m, R, M>(&self, target: M) -> OrmResult<()>
    where
        R: Record + 'm,
        M: Into<Model<'m, R>>,
    {
        let client = self.client();
        target
            .into()
            .iterate(|mut model| self.dialect.create(&client, &mut model))
    }

    /// Update one record or each record of a slice, stamping `updated_at` first.
    pub fn update<'m, R, M>(&self, target: M) -> OrmResult<()>
    where
        R: Record + 'm,
        M: Into<Model<'m, R>>,
    {
        let client = self.client();
        target.into().iterate(|mut model| {
            model.single_mut("update")?.touch_updated_at(Utc::now());
            self.dialect.update(&client, &mut model)
        })
    }

    /// Delete one record or each record of a slice, one statement per record.
    pub fn destroy<'m, R, M>(&self, target: M) -> OrmResult<()>
    where
        R: Record + 'm,
        M: Into<Model<'m, R>>,
    {
        let client = self.client();
        target
            .into()
            .iterate(|mut model| self.dialect.destroy(&client, &mut model))
    }

    /// Insert a slice of records with a single statement.
    pub fn create_many<R: Record>(&self, records: &mut [R]) -> OrmResult<()> {
        self.dialect
            .create_many(&self.client(), &mut Model::slice(records))
    }

    /// Delete a slice of records with a single statement.
    pub fn destroy_many<R: Record>(&self, records: &mut [R]) -> OrmResult<()> {
        self.dialect
            .destroy_many(&self.client(), &mut Model::slice(records))
    }

    /// Select through `R`'s view template into one record or a result vector.
    pub fn sql_view<'m, R, M>(
        &self,
        target: M,
        format: Option<&HashMap<String, String>>,
    ) -> OrmResult<()>
    where
        R: Record + 'm,
        M: Into<Model<'m, R>>,
    {
        self.dialect
            .sql_view(&self.client(), &mut target.into(), format)
    }

    /// Create `R`'s table.
    pub fn create_table<R: Record>(&self) -> OrmResult<()> {
        self.dialect.create_table::<R>(&self.client())
    }
}
