use super::{Dialect, generic};
use crate::builder::CompiledSql;
use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::model::Model;
use crate::record::Record;
use std::collections::HashMap;

/// SQLite, the reference backend.
///
/// Generated SQL is already SQLite syntax, so translation is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Sqlite {
    fn op(&self, op: &str) -> String {
        format!("{} {op}", self.name())
    }
}

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn translate_sql(&self, sql: &str) -> String {
        sql.to_string()
    }

    fn create<R: Record>(&self, db: &dyn GenericClient, model: &mut Model<'_, R>) -> OrmResult<()> {
        generic::create(self, db, model).map_err(|e| e.context(&self.op("create")))
    }

    fn create_many<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
    ) -> OrmResult<()> {
        generic::create_many(self, db, model).map_err(|e| e.context(&self.op("create many")))
    }

    fn update<R: Record>(&self, db: &dyn GenericClient, model: &mut Model<'_, R>) -> OrmResult<()> {
        generic::update(self, db, model).map_err(|e| e.context(&self.op("update")))
    }

    fn destroy<R: Record>(&self, db: &dyn GenericClient, model: &mut Model<'_, R>) -> OrmResult<()> {
        generic::destroy(self, db, model).map_err(|e| e.context(&self.op("destroy")))
    }

    fn destroy_many<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
    ) -> OrmResult<()> {
        generic::destroy_many(self, db, model).map_err(|e| e.context(&self.op("destroy many")))
    }

    fn select_one<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
        query: &CompiledSql,
    ) -> OrmResult<()> {
        generic::select_one(db, model, query).map_err(|e| e.context(&self.op("select one")))
    }

    fn select_many<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
        query: &CompiledSql,
    ) -> OrmResult<()> {
        generic::select_many(db, model, query).map_err(|e| e.context(&self.op("select many")))
    }

    fn sql_view<R: Record>(
        &self,
        db: &dyn GenericClient,
        model: &mut Model<'_, R>,
        format: Option<&HashMap<String, String>>,
    ) -> OrmResult<()> {
        generic::sql_view(self, db, model, format).map_err(|e| e.context(&self.op("sql view")))
    }

    fn create_table<R: Record>(&self, db: &dyn GenericClient) -> OrmResult<()> {
        generic::create_table::<Self, R>(self, db).map_err(|e| e.context(&self.op("create table")))
    }
}
