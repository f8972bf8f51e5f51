//! Operation targets.
//!
//! A [`Model`] binds one record, a slice of records, or a growable result
//! vector to the derived behavior every dialect operation needs: table name,
//! column lists, placeholder strings, identity and timestamps.

use crate::error::{OrmError, OrmResult};
use crate::record::{ColumnDef, ColumnRole, Record};
use crate::value::quote_literal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What a [`Model`] points at.
pub enum Target<'a, R> {
    One(&'a mut R),
    Slice(&'a mut [R]),
    /// A result vector that select operations replace.
    Rows(&'a mut Vec<R>),
}

/// A record (or collection of records) bound for one operation.
pub struct Model<'a, R: Record> {
    target: Target<'a, R>,
}

impl<'a, R: Record> From<&'a mut R> for Model<'a, R> {
    fn from(record: &'a mut R) -> Self {
        Self::one(record)
    }
}

impl<'a, R: Record> From<&'a mut [R]> for Model<'a, R> {
    fn from(records: &'a mut [R]) -> Self {
        Self::slice(records)
    }
}

impl<'a, R: Record> From<&'a mut Vec<R>> for Model<'a, R> {
    fn from(records: &'a mut Vec<R>) -> Self {
        Self::rows(records)
    }
}

impl<'a, R: Record> Model<'a, R> {
    pub fn one(record: &'a mut R) -> Self {
        Self {
            target: Target::One(record),
        }
    }

    pub fn slice(records: &'a mut [R]) -> Self {
        Self {
            target: Target::Slice(records),
        }
    }

    pub fn rows(records: &'a mut Vec<R>) -> Self {
        Self {
            target: Target::Rows(records),
        }
    }

    pub fn target(&self) -> &Target<'a, R> {
        &self.target
    }

    pub fn table_name(&self) -> &'static str {
        R::table_name()
    }

    pub fn column_slice(&self) -> &'static [ColumnDef] {
        R::columns()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        R::columns().iter().map(|c| c.name).collect()
    }

    /// Column names joined with `,`.
    pub fn columns(&self) -> String {
        self.column_names().join(",")
    }

    /// Named placeholders for every column: `:a, :b, :c`.
    pub fn tokenized_string(&self) -> String {
        R::columns()
            .iter()
            .map(|c| format!(":{}", c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Columns written by an update: everything except identity and creation time.
    pub fn update_columns(&self) -> impl Iterator<Item = &'static ColumnDef> {
        R::columns()
            .iter()
            .filter(|c| !matches!(c.role, ColumnRole::Identity | ColumnRole::CreatedAt))
    }

    /// `a = :a, b = :b` over [`Model::update_columns`].
    pub fn update_string(&self) -> String {
        self.update_columns()
            .map(|c| format!("{0} = :{0}", c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `true` when the target is a collection.
    pub fn is_slice(&self) -> bool {
        !matches!(self.target, Target::One(_))
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> &[R] {
        match &self.target {
            Target::One(r) => std::slice::from_ref(&**r),
            Target::Slice(s) => &**s,
            Target::Rows(v) => v.as_slice(),
        }
    }

    pub fn records_mut(&mut self) -> &mut [R] {
        match &mut self.target {
            Target::One(r) => std::slice::from_mut(&mut **r),
            Target::Slice(s) => &mut **s,
            Target::Rows(v) => v.as_mut_slice(),
        }
    }

    /// Run `f` once per bound record, each wrapped as a single-record model.
    ///
    /// Stops at the first error.
    pub fn iterate<F>(&mut self, mut f: F) -> OrmResult<()>
    where
        F: FnMut(Model<'_, R>) -> OrmResult<()>,
    {
        for record in self.records_mut() {
            f(Model::one(record))?;
        }
        Ok(())
    }

    /// The single record, or a misuse error when the target is a collection.
    pub fn single_mut(&mut self, op: &str) -> OrmResult<&mut R> {
        match &mut self.target {
            Target::One(r) => Ok(&mut **r),
            _ => Err(OrmError::misuse(format!(
                "{op} requires a single record, got a collection of {}",
                R::table_name()
            ))),
        }
    }

    /// The bound collection, or a misuse error for a single record.
    pub fn slice_mut(&mut self, op: &str) -> OrmResult<&mut [R]> {
        match &mut self.target {
            Target::One(_) => Err(OrmError::misuse(format!(
                "{op} requires a slice of {}",
                R::table_name()
            ))),
            Target::Slice(s) => Ok(&mut **s),
            Target::Rows(v) => Ok(v.as_mut_slice()),
        }
    }

    /// The growable result vector, or a misuse error for any other target.
    pub fn rows_mut(&mut self, op: &str) -> OrmResult<&mut Vec<R>> {
        match &mut self.target {
            Target::Rows(v) => Ok(&mut **v),
            _ => Err(OrmError::misuse(format!(
                "{op} requires a result vector of {}",
                R::table_name()
            ))),
        }
    }
}

/// Name of the identity column.
pub(crate) fn identity_name<R: Record>() -> OrmResult<&'static str> {
    R::identity_column()
        .map(|c| c.name)
        .ok_or_else(|| OrmError::config(format!("{} has no identity column", R::table_name())))
}

/// The identity of `record`, quoted as a literal.
pub(crate) fn id_literal<R: Record>(record: &R) -> OrmResult<String> {
    let id = record
        .id()
        .ok_or_else(|| OrmError::config(format!("{} has no identity field", R::table_name())))?;
    Ok(quote_literal(&id.hyphenated().to_string()))
}

/// `id = '<uuid>'` for `record`.
pub fn where_id<R: Record>(record: &R) -> OrmResult<String> {
    Ok(format!("{} = {}", identity_name::<R>()?, id_literal(record)?))
}

/// Prepare a record for insertion: assign an identity if unset and stamp both
/// timestamps with `now`.
pub(crate) fn prepare_insert<R: Record>(record: &mut R, now: DateTime<Utc>) {
    if record.id().is_some_and(|id| id.is_nil()) {
        record.set_id(Uuid::new_v4());
    }
    record.touch_created_at(now);
    record.touch_updated_at(now);
}
