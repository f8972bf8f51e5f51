//! SQL logging around the executor.
//!
//! [`InstrumentedClient`] wraps any [`GenericClient`] and emits a `tracing`
//! event on the `tagorm.sql` target before every statement, plus a WARN event
//! when a statement runs longer than the configured threshold.

use crate::client::GenericClient;
use crate::config::LogConfig;
use crate::error::OrmResult;
use crate::row::Row;
use crate::value::Value;
use std::time::{Duration, Instant};
use tracing::Level;

/// Truncate `sql` to at most `max_bytes`, respecting UTF-8 boundaries.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client that logs every statement it runs.
pub struct InstrumentedClient<'a> {
    inner: &'a dyn GenericClient,
    config: &'a LogConfig,
}

impl<'a> InstrumentedClient<'a> {
    pub fn new(inner: &'a dyn GenericClient, config: &'a LogConfig) -> Self {
        Self { inner, config }
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn before(&self, kind: &'static str, sql: &str, param_count: usize) {
        if !self.config.enabled {
            return;
        }

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.config.level,
            target: "tagorm.sql",
            kind,
            param_count,
            sql = %sql,
        );
    }

    fn after(&self, sql: &str, elapsed: Duration) {
        if !self.config.enabled {
            return;
        }
        if let Some(threshold) = self.config.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(
                    target: "tagorm.sql",
                    elapsed_ms = elapsed.as_millis() as u64,
                    sql = %self.truncate_sql(sql),
                    "slow query"
                );
            }
        }
    }

    fn run<T>(
        &self,
        kind: &'static str,
        sql: &str,
        param_count: usize,
        f: impl FnOnce() -> OrmResult<T>,
    ) -> OrmResult<T> {
        self.before(kind, sql, param_count);
        let start = Instant::now();
        let result = f();
        self.after(sql, start.elapsed());
        result
    }
}

impl GenericClient for InstrumentedClient<'_> {
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<usize> {
        self.run("execute", sql, params.len(), || self.inner.execute(sql, params))
    }

    fn execute_named(&self, sql: &str, params: &[(String, Value)]) -> OrmResult<usize> {
        self.run("execute", sql, params.len(), || {
            self.inner.execute_named(sql, params)
        })
    }

    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.run("query", sql, params.len(), || self.inner.query(sql, params))
    }
}
