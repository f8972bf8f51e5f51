//! # tagorm
//!
//! A tag-driven record mapper and query compiler for SQLite.
//!
//! ## Features
//!
//! - **Tagged records**: `#[derive(Record)]` turns `#[orm(column = "...")]` fields into a static table descriptor
//! - **Typed mapping**: Row → Struct via `FromRow`; unsupported field types fail to compile
//! - **Fluent queries**: accumulate where / order / from clauses, or switch to raw SQL
//! - **`IN (?)` expansion**: one placeholder grows to fit the bound list
//! - **Dialects**: CRUD algorithms are shared, a `Dialect` only adds translation and context
//! - **SQL logging**: every statement is emitted through `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use tagorm::prelude::*;
//!
//! #[derive(Debug, Default, Record, FromRow)]
//! #[orm(table = "users")]
//! struct User {
//!     #[orm(column = "id")]
//!     id: uuid::Uuid,
//!     #[orm(column = "name")]
//!     name: String,
//!     #[orm(column = "created_at")]
//!     created_at: chrono::DateTime<chrono::Utc>,
//! }
//!
//! let conn = Connection::open_in_memory()?;
//! conn.create_table::<User>()?;
//!
//! let mut user = User { name: "mark".into(), ..Default::default() };
//! conn.create(&mut user)?;
//!
//! let mut users = Vec::new();
//! conn.filter("name IN (?)", args!["mark", "anna"])
//!     .order_by("name")
//!     .all(&mut users)?;
//! # Ok::<(), tagorm::OrmError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod clause;
pub mod client;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod interpolate;
pub mod model;
pub mod monitor;
pub mod prelude;
pub mod query;
pub mod record;
pub mod row;
pub mod schema;
pub mod types;
pub mod value;

#[cfg(test)]
mod test_support;

pub use builder::{CompiledSql, Statement, compile, expand_in};
pub use cache::ColumnCache;
pub use clause::{Clause, Clauses};
pub use client::GenericClient;
pub use config::{ConnectionConfig, LogConfig};
pub use connection::Connection;
pub use dialect::{Dialect, Sqlite};
pub use error::{OrmError, OrmResult};
pub use ident::validate_ident;
pub use interpolate::interpolate;
pub use model::{Model, Target, where_id};
pub use monitor::InstrumentedClient;
pub use query::{Built, Query, QueryState, Raw};
pub use record::{
    ColumnDef, ColumnRole, Record, RecordRegistration, Timestamp, validate_record,
    validate_registered_records,
};
pub use row::{FromRow, Row};
pub use schema::{Column, Schema};
pub use types::{ColumnType, DataType, NullableColumn};
pub use value::Value;

// Re-exported for code generated by `#[derive(Record)]`.
#[doc(hidden)]
pub use chrono;
#[doc(hidden)]
pub use inventory;
#[doc(hidden)]
pub use uuid;

#[cfg(feature = "derive")]
pub use tagorm_derive::{FromRow, Record};
