//! Record descriptors.
//!
//! A [`Record`] is a struct whose tagged fields map to the columns of one table.
//! The descriptor is static: it is generated by `#[derive(Record)]` (or written by
//! hand) and never discovered at runtime.

use crate::error::{OrmError, OrmResult};
use crate::ident::is_valid_ident;
use crate::row::FromRow;
use crate::types::DataType;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Special meaning of a persisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Plain,
    /// The `id` field. Always a [`Uuid`].
    Identity,
    /// The `created_at` field. Excluded from updates.
    CreatedAt,
    /// The `updated_at` field.
    UpdatedAt,
}

/// Static descriptor of one persisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub data_type: DataType,
    pub role: ColumnRole,
}

impl ColumnDef {
    pub const fn new(name: &'static str, data_type: DataType, role: ColumnRole) -> Self {
        Self {
            name,
            data_type,
            role,
        }
    }
}

/// A type persisted as one row of one table.
///
/// `columns()` and `values()` must agree in length and order: declaration order
/// of the tagged fields.
///
/// ```ignore
/// use tagorm::{FromRow, Record};
///
/// #[derive(Debug, Default, Record, FromRow)]
/// #[orm(table = "users")]
/// struct User {
///     #[orm(column = "id")]
///     id: uuid::Uuid,
///     #[orm(column = "name")]
///     name: String,
///     scratch: String, // not persisted
/// }
/// ```
pub trait Record: FromRow {
    /// Table name, verbatim.
    fn table_name() -> &'static str;

    /// Ordered persisted columns.
    fn columns() -> &'static [ColumnDef];

    /// Current field values in column order.
    fn values(&self) -> Vec<Value>;

    /// Identity value, if the record has an `id` field.
    fn id(&self) -> Option<Uuid> {
        None
    }

    fn set_id(&mut self, _id: Uuid) {}

    fn touch_created_at(&mut self, _now: DateTime<Utc>) {}

    fn touch_updated_at(&mut self, _now: DateTime<Utc>) {}

    /// Select template used by view queries (`#[orm(view = "...")]`).
    fn sql_view() -> Option<&'static str> {
        None
    }

    /// The identity column descriptor, if any.
    fn identity_column() -> Option<&'static ColumnDef> {
        Self::columns()
            .iter()
            .find(|c| c.role == ColumnRole::Identity)
    }
}

/// Field types accepted for `created_at` / `updated_at`.
pub trait Timestamp {
    fn stamp(&mut self, now: DateTime<Utc>);
}

impl Timestamp for DateTime<Utc> {
    fn stamp(&mut self, now: DateTime<Utc>) {
        *self = now;
    }
}

impl Timestamp for Option<DateTime<Utc>> {
    fn stamp(&mut self, now: DateTime<Utc>) {
        *self = Some(now);
    }
}

/// Identity accessor used by generated code; only a `Uuid` field can be an identity.
#[doc(hidden)]
pub fn identity(id: &Uuid) -> Uuid {
    *id
}

/// Registration emitted by `#[derive(Record)]`.
pub struct RecordRegistration {
    pub type_name: &'static str,
    pub table_name: fn() -> &'static str,
    pub validate: fn() -> OrmResult<()>,
}

inventory::collect!(RecordRegistration);

/// Check a record descriptor for configuration mistakes.
pub fn validate_record<R: Record>() -> OrmResult<()> {
    let table = R::table_name();
    let columns = R::columns();

    if columns.is_empty() {
        return Err(OrmError::config(format!("{table}: no persisted fields")));
    }
    if !is_valid_ident(table) {
        return Err(OrmError::config(format!("invalid table name '{table}'")));
    }

    let mut seen = HashSet::with_capacity(columns.len());
    let mut identities = 0;
    for col in columns {
        if !is_valid_ident(col.name) {
            return Err(OrmError::config(format!(
                "{table}: invalid column name '{}'",
                col.name
            )));
        }
        if !seen.insert(col.name) {
            return Err(OrmError::config(format!(
                "{table}: duplicate column '{}'",
                col.name
            )));
        }
        match col.role {
            ColumnRole::Identity => {
                identities += 1;
                if col.data_type != DataType::Uuid {
                    return Err(OrmError::config(format!(
                        "{table}: identity column '{}' must be a uuid",
                        col.name
                    )));
                }
            }
            ColumnRole::CreatedAt | ColumnRole::UpdatedAt => {
                if !col.data_type.is_time() {
                    return Err(OrmError::config(format!(
                        "{table}: timestamp column '{}' must be a time",
                        col.name
                    )));
                }
            }
            ColumnRole::Plain => {}
        }
    }
    if identities > 1 {
        return Err(OrmError::config(format!("{table}: more than one identity column")));
    }
    Ok(())
}

/// Validate every record registered through `#[derive(Record)]`.
///
/// Also rejects two record types that map to the same table.
pub fn validate_registered_records() -> OrmResult<()> {
    let mut tables: HashMap<&'static str, &'static str> = HashMap::new();
    for reg in inventory::iter::<RecordRegistration> {
        (reg.validate)().map_err(|e| e.context(reg.type_name))?;
        let table = (reg.table_name)();
        if let Some(other) = tables.insert(table, reg.type_name) {
            if other != reg.type_name {
                return Err(OrmError::config(format!(
                    "table '{table}' is mapped by both {other} and {}",
                    reg.type_name
                )));
            }
        }
    }
    Ok(())
}
