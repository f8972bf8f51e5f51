//! Convenient imports for typical `tagorm` usage.
//!
//! ```ignore
//! use tagorm::prelude::*;
//! ```

pub use crate::{
    ColumnType, Connection, ConnectionConfig, FromRow, GenericClient, OrmError, OrmResult, Query,
    Record, Schema, Value, args,
};
