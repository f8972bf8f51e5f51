//! Backend-agnostic CRUD algorithms shared by every dialect.
//!
//! Each function renders its statement, passes it through the dialect's
//! `translate_sql`, and issues exactly one round trip.

use super::Dialect;
use crate::builder::CompiledSql;
use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::interpolate::interpolate;
use crate::model::{Model, id_literal, identity_name, prepare_insert, where_id};
use crate::record::{ColumnDef, ColumnRole, Record};
use crate::schema::Schema;
use crate::value::Value;
use chrono::Utc;
use std::collections::HashMap;

/// Record values in column order, checked against the descriptor.
fn checked_values<R: Record>(record: &R) -> OrmResult<Vec<Value>> {
    let values = record.values();
    if values.len() != R::columns().len() {
        return Err(OrmError::config(format!(
            "{}: column/type count mismatch ({} columns, {} values)",
            R::table_name(),
            R::columns().len(),
            values.len()
        )));
    }
    Ok(values)
}

/// Named parameters for the columns accepted by `keep`.
fn named_params<R, F>(record: &R, keep: F) -> OrmResult<Vec<(String, Value)>>
where
    R: Record,
    F: Fn(&ColumnDef) -> bool,
{
    let values = checked_values(record)?;
    Ok(R::columns()
        .iter()
        .zip(values)
        .filter(|(col, _)| keep(col))
        .map(|(col, value)| (col.name.to_string(), value))
        .collect())
}

pub fn create<D, R>(dialect: &D, db: &dyn GenericClient, model: &mut Model<'_, R>) -> OrmResult<()>
where
    D: Dialect + ?Sized,
    R: Record,
{
    let sql = dialect.translate_sql(&format!(
        "INSERT INTO {} ({}) VALUES ({})",
        model.table_name(),
        model.columns(),
        model.tokenized_string()
    ));
    let record = model.single_mut("create")?;
    prepare_insert(record, Utc::now());
    let params = named_params(record, |_| true)?;
    db.execute_named(&sql, &params)?;
    Ok(())
}

/// Insert every record of a slice with one multi-row statement of literal tuples.
///
/// An empty slice issues nothing.
pub fn create_many<D, R>(
    dialect: &D,
    db: &dyn GenericClient,
    model: &mut Model<'_, R>,
) -> OrmResult<()>
where
    D: Dialect + ?Sized,
    R: Record,
{
    let table = model.table_name();
    let columns = model.columns();
    let records = model.slice_mut("create many")?;
    if records.is_empty() {
        return Ok(());
    }

    let mut tuples = Vec::with_capacity(records.len());
    for record in records.iter_mut() {
        prepare_insert(record, Utc::now());
        let literals: Vec<String> = checked_values(record)?
            .iter()
            .map(Value::to_literal)
            .collect();
        tuples.push(format!("({})", literals.join(", ")));
    }

    let sql = format!(
        "INSERT INTO {table} ({columns}) VALUES {}",
        tuples.join(", ")
    );
    db.execute(&dialect.translate_sql(&sql), &[])?;
    Ok(())
}

/// Update every column except identity and creation time.
///
/// Zero affected rows is [`OrmError::NotFound`].
pub fn update<D, R>(dialect: &D, db: &dyn GenericClient, model: &mut Model<'_, R>) -> OrmResult<()>
where
    D: Dialect + ?Sized,
    R: Record,
{
    let table = model.table_name();
    let set = model.update_string();
    let record = model.single_mut("update")?;
    let sql = dialect.translate_sql(&format!(
        "UPDATE {table} SET {set} WHERE {}",
        where_id(record)?
    ));
    let params = named_params(record, |col| {
        !matches!(col.role, ColumnRole::Identity | ColumnRole::CreatedAt)
    })?;
    let affected = db.execute_named(&sql, &params)?;
    if affected == 0 {
        return Err(OrmError::not_found("query updated 0 rows"));
    }
    Ok(())
}

pub fn destroy<D, R>(dialect: &D, db: &dyn GenericClient, model: &mut Model<'_, R>) -> OrmResult<()>
where
    D: Dialect + ?Sized,
    R: Record,
{
    let table = model.table_name();
    let record = model.single_mut("destroy")?;
    let sql = format!("DELETE FROM {table} WHERE {}", where_id(record)?);
    db.execute(&dialect.translate_sql(&sql), &[])?;
    Ok(())
}

/// Delete every record of a slice with one `IN (...)` statement.
///
/// Every record must carry a non-nil identity; nothing is issued otherwise.
pub fn destroy_many<D, R>(
    dialect: &D,
    db: &dyn GenericClient,
    model: &mut Model<'_, R>,
) -> OrmResult<()>
where
    D: Dialect + ?Sized,
    R: Record,
{
    let table = model.table_name();
    let records = model.slice_mut("destroy many")?;
    if records.is_empty() {
        return Ok(());
    }

    let column = identity_name::<R>()?;
    let mut ids = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        match record.id() {
            Some(id) if !id.is_nil() => ids.push(id_literal(record)?),
            _ => {
                return Err(OrmError::misuse(format!(
                    "destroy many: {table}[{idx}] has no identity"
                )));
            }
        }
    }

    let sql = format!("DELETE FROM {table} WHERE {column} IN ({})", ids.join(","));
    db.execute(&dialect.translate_sql(&sql), &[])?;
    Ok(())
}

pub fn select_one<R: Record>(
    db: &dyn GenericClient,
    model: &mut Model<'_, R>,
    query: &CompiledSql,
) -> OrmResult<()> {
    let record = model.single_mut("select one")?;
    let row = db.query_one(&query.sql, &query.args)?;
    *record = R::from_row(&row)?;
    Ok(())
}

pub fn select_many<R: Record>(
    db: &dyn GenericClient,
    model: &mut Model<'_, R>,
    query: &CompiledSql,
) -> OrmResult<()> {
    let target = model.rows_mut("select many")?;
    let rows = db.query(&query.sql, &query.args)?;
    *target = rows
        .iter()
        .map(R::from_row)
        .collect::<OrmResult<Vec<_>>>()?;
    Ok(())
}

/// Select through `R::sql_view()`, interpolating `format` when given.
///
/// A collection target selects many, a single record selects one.
pub fn sql_view<D, R>(
    dialect: &D,
    db: &dyn GenericClient,
    model: &mut Model<'_, R>,
    format: Option<&HashMap<String, String>>,
) -> OrmResult<()>
where
    D: Dialect + ?Sized,
    R: Record,
{
    let view = R::sql_view()
        .ok_or_else(|| OrmError::config(format!("{} has no sql view", R::table_name())))?;
    let sql = match format {
        Some(values) => interpolate(view, values)?,
        None => view.to_string(),
    };
    let query = CompiledSql {
        sql: dialect.translate_sql(&sql),
        args: Vec::new(),
    };
    if model.is_slice() {
        select_many(db, model, &query)
    } else {
        select_one(db, model, &query)
    }
}

pub fn create_table<D, R>(dialect: &D, db: &dyn GenericClient) -> OrmResult<()>
where
    D: Dialect + ?Sized,
    R: Record,
{
    let schema = Schema::from_record::<R>()?;
    db.execute(&dialect.translate_sql(&schema.to_sql()), &[])?;
    Ok(())
}
