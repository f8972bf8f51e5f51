//! Fluent queries.
//!
//! A [`Query`] starts in builder mode ([`Built`]) and accumulates where, order,
//! and from clauses plus a limit. [`Query::raw`] turns it into a raw query
//! ([`Raw`]) whose SQL is fixed text. The switch is one-way: builder methods do
//! not exist on a raw query.
//!
//! ```compile_fail
//! let conn = tagorm::Connection::open_in_memory().unwrap();
//! let q = conn.raw("SELECT * FROM users", tagorm::args![]);
//! let _ = q.filter("name = ?", tagorm::args!["mark"]);
//! ```
//!
//! Compiled SQL is memoized per query instance and reset by every builder call.

use crate::builder::{CompiledSql, Statement, compile};
use crate::clause::{Clause, Clauses};
use crate::connection::Connection;
use crate::dialect::{Dialect, Sqlite};
use crate::error::OrmResult;
use crate::model::Model;
use crate::record::Record;
use crate::value::Value;
use std::cell::OnceCell;

/// Builder-mode state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Built {
    where_clauses: Clauses,
    order_clauses: Clauses,
    from_clauses: Clauses,
    limit: usize,
}

impl Built {
    pub fn where_clauses(&self) -> &Clauses {
        &self.where_clauses
    }

    pub fn order_clauses(&self) -> &Clauses {
        &self.order_clauses
    }

    pub fn from_clauses(&self) -> &Clauses {
        &self.from_clauses
    }

    /// Row limit; `0` means unlimited.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Raw-mode state: fixed SQL text and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Raw {
    clause: Clause,
}

impl Raw {
    pub fn clause(&self) -> &Clause {
        &self.clause
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Built {}
    impl Sealed for super::Raw {}
}

/// The two query modes.
pub trait QueryState: sealed::Sealed {
    fn statement(&self) -> Statement<'_>;

    /// Restrict to one row for `first`. Returns `true` if the state changed.
    fn limit_one(&mut self) -> bool;
}

impl QueryState for Built {
    fn statement(&self) -> Statement<'_> {
        Statement::Built(self)
    }

    fn limit_one(&mut self) -> bool {
        let changed = self.limit != 1;
        self.limit = 1;
        changed
    }
}

impl QueryState for Raw {
    fn statement(&self) -> Statement<'_> {
        Statement::Raw(&self.clause)
    }

    // Raw text is never rewritten.
    fn limit_one(&mut self) -> bool {
        false
    }
}

/// A query bound to a connection.
pub struct Query<'c, S = Built, D: Dialect = Sqlite> {
    conn: &'c Connection<D>,
    state: S,
    compiled: OnceCell<(&'static str, CompiledSql)>,
}

impl<'c, D: Dialect> Query<'c, Built, D> {
    pub fn new(conn: &'c Connection<D>) -> Self {
        Self {
            conn,
            state: Built::default(),
            compiled: OnceCell::new(),
        }
    }

    /// Add a where clause. Clauses are joined with `AND`.
    ///
    /// A single `IN (?)` absorbs every argument beyond the other placeholders:
    ///
    /// ```ignore
    /// conn.filter("id IN (?)", [1, 2, 3]); // id IN (?,?,?)
    /// ```
    pub fn filter<I>(mut self, stmt: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let args = args.into_iter().map(Into::into).collect();
        self.state.where_clauses.push(Clause::new(stmt, args));
        self.reset()
    }

    /// Add an order clause, e.g. `"name desc"`.
    pub fn order_by(mut self, stmt: &str) -> Self {
        self.state.order_clauses.push(Clause::text(stmt));
        self.reset()
    }

    /// Add another source to the `FROM` list.
    pub fn from(mut self, stmt: &str) -> Self {
        self.state.from_clauses.push(Clause::text(stmt));
        self.reset()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.state.limit = limit;
        self.reset()
    }

    /// Replace the builder with fixed SQL. Accumulated clauses are discarded.
    pub fn raw<I>(self, sql: &str, args: I) -> Query<'c, Raw, D>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Query {
            conn: self.conn,
            state: Raw {
                clause: Clause::new(sql, args.into_iter().map(Into::into).collect()),
            },
            compiled: OnceCell::new(),
        }
    }

    pub fn built(&self) -> &Built {
        &self.state
    }

    fn reset(mut self) -> Self {
        self.compiled = OnceCell::new();
        self
    }
}

impl<'c, D: Dialect> Query<'c, Raw, D> {
    pub fn raw_clause(&self) -> &Clause {
        self.state.clause()
    }
}

impl<'c, S: QueryState, D: Dialect> Query<'c, S, D> {
    pub fn connection(&self) -> &'c Connection<D> {
        self.conn
    }

    /// Compile for record type `R`.
    pub fn to_sql<R: Record>(&self) -> OrmResult<CompiledSql> {
        let table = R::table_name();
        if let Some((cached_table, compiled)) = self.compiled.get() {
            if *cached_table == table {
                return Ok(compiled.clone());
            }
        }
        let compiled = compile::<R, D>(
            self.state.statement(),
            self.conn.column_cache(),
            self.conn.dialect(),
        )?;
        if self.compiled.get().is_none() {
            let _ = self.compiled.set((table, compiled.clone()));
        }
        Ok(compiled)
    }

    /// Load the first matching row into `record`.
    ///
    /// In builder mode the query is limited to one row first.
    pub fn first<R: Record>(&mut self, record: &mut R) -> OrmResult<()> {
        if self.state.limit_one() {
            self.compiled = OnceCell::new();
        }
        let compiled = self.to_sql::<R>()?;
        let client = self.conn.client();
        self.conn
            .dialect()
            .select_one(&client, &mut Model::one(record), &compiled)
    }

    /// Replace `rows` with every matching row.
    pub fn all<R: Record>(&self, rows: &mut Vec<R>) -> OrmResult<()> {
        let compiled = self.to_sql::<R>()?;
        let client = self.conn.client();
        self.conn
            .dialect()
            .select_many(&client, &mut Model::rows(rows), &compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::test_support::{Widget, WidgetAlias};

    const WIDGET_SELECT: &str = "SELECT id,name,count,score,created_at,updated_at FROM widgets";

    fn conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn compiles_builder_parts_in_order() {
        let conn = conn();
        let q = conn
            .q()
            .filter("name = ?", args!["a"])
            .filter("count > ?", [3])
            .order_by("name desc")
            .order_by("count")
            .limit(10);
        let compiled = q.to_sql::<Widget>().unwrap();
        assert_eq!(
            compiled.sql,
            format!(
                "{WIDGET_SELECT} WHERE name = ? AND count > ? ORDER BY name desc, count LIMIT 10"
            )
        );
        assert_eq!(compiled.args, vec![Value::from("a"), Value::from(3)]);
    }

    #[test]
    fn bare_select() {
        let conn = conn();
        let compiled = conn.q().to_sql::<Widget>().unwrap();
        assert_eq!(compiled.sql, WIDGET_SELECT);
        assert!(compiled.args.is_empty());
    }

    #[test]
    fn expands_in_lists() {
        let conn = conn();
        let compiled = conn
            .filter("id IN (?)", [1, 2, 3])
            .to_sql::<Widget>()
            .unwrap();
        assert_eq!(compiled.sql, format!("{WIDGET_SELECT} WHERE id IN (?,?,?)"));
        assert_eq!(compiled.args, args![1, 2, 3]);
        assert_eq!(compiled.sql.matches('?').count(), 3);
    }

    #[test]
    fn expands_in_lists_next_to_other_clauses() {
        let conn = conn();
        let compiled = conn
            .filter("name = ?", args!["a"])
            .filter("count IN (?)", [4, 5])
            .to_sql::<Widget>()
            .unwrap();
        assert_eq!(
            compiled.sql,
            format!("{WIDGET_SELECT} WHERE name = ? AND count IN (?,?)")
        );
        assert_eq!(compiled.args, args!["a", 4, 5]);
    }

    #[test]
    fn empty_in_list_renders_null() {
        let conn = conn();
        let compiled = conn
            .filter("id IN (?)", Vec::<Value>::new())
            .to_sql::<Widget>()
            .unwrap();
        assert_eq!(compiled.sql, format!("{WIDGET_SELECT} WHERE id IN (NULL)"));
    }

    #[test]
    fn extra_from_sources() {
        let conn = conn();
        let compiled = conn
            .q()
            .from("gadgets")
            .filter("gadgets.widget_id = widgets.id", args![])
            .to_sql::<Widget>()
            .unwrap();
        assert_eq!(
            compiled.sql,
            format!("{WIDGET_SELECT}, gadgets WHERE gadgets.widget_id = widgets.id")
        );
    }

    #[test]
    fn raw_sql_is_verbatim() {
        let conn = conn();
        let q = conn
            .q()
            .filter("ignored = ?", [1])
            .limit(5)
            .raw("select * from widgets where name = ?", args!["x"]);
        let compiled = q.to_sql::<Widget>().unwrap();
        assert_eq!(compiled.sql, "select * from widgets where name = ?");
        assert_eq!(compiled.args, args!["x"]);
        assert_eq!(q.raw_clause().fragment, compiled.sql);
    }

    #[test]
    fn raw_sql_expands_in() {
        let conn = conn();
        let compiled = conn
            .raw("select * from widgets where id in (?)", [7, 8])
            .to_sql::<Widget>()
            .unwrap();
        assert_eq!(compiled.sql, "select * from widgets where id in (?,?)");
    }

    #[test]
    fn memoized_until_mutated() {
        let conn = conn();
        let q = conn.filter("name = ?", args!["a"]);
        let first = q.to_sql::<Widget>().unwrap();
        assert_eq!(q.to_sql::<Widget>().unwrap(), first);

        let q = q.limit(2);
        let second = q.to_sql::<Widget>().unwrap();
        assert_ne!(second, first);
        assert!(second.sql.ends_with(" LIMIT 2"));
    }

    #[test]
    fn limit_zero_is_unlimited() {
        let conn = conn();
        let compiled = conn.limit(0).to_sql::<Widget>().unwrap();
        assert!(!compiled.sql.contains("LIMIT"));
    }

    #[test]
    fn table_collision_surfaces_on_compile() {
        let conn = conn();
        conn.q().to_sql::<Widget>().unwrap();
        let err = conn.q().to_sql::<WidgetAlias>().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn first_limits_builder_queries() {
        let conn = conn();
        let mut q = Query::new(&conn).filter("name = ?", args!["a"]);
        assert!(q.state.limit_one());
        assert_eq!(q.built().limit(), 1);
        assert!(!q.state.limit_one());
    }
}
