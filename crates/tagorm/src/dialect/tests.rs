use super::*;
use crate::error::OrmError;
use crate::row::Row;
use crate::test_support::Widget;
use crate::types::ColumnType;
use crate::value::Value;
use std::cell::RefCell;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Execute(String, Vec<Value>),
    Named(String, Vec<(String, Value)>),
    Query(String, Vec<Value>),
}

/// Records every statement and answers with canned results.
#[derive(Default)]
struct RecordingClient {
    calls: RefCell<Vec<Call>>,
    affected: usize,
    rows: Vec<Row>,
}

impl RecordingClient {
    fn affecting(affected: usize) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }

    fn returning(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl GenericClient for RecordingClient {
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<usize> {
        self.calls
            .borrow_mut()
            .push(Call::Execute(sql.to_string(), params.to_vec()));
        Ok(self.affected)
    }

    fn execute_named(&self, sql: &str, params: &[(String, Value)]) -> OrmResult<usize> {
        self.calls
            .borrow_mut()
            .push(Call::Named(sql.to_string(), params.to_vec()));
        Ok(self.affected)
    }

    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.calls
            .borrow_mut()
            .push(Call::Query(sql.to_string(), params.to_vec()));
        Ok(self.rows.clone())
    }
}

fn widget_row(w: &Widget) -> Row {
    let columns: Arc<[String]> = Widget::columns()
        .iter()
        .map(|c| c.name.to_string())
        .collect();
    Row::new(columns, w.values())
}

fn saved(name: &str) -> Widget {
    Widget {
        id: Uuid::new_v4(),
        ..Widget::named(name)
    }
}

#[test]
fn create_uses_named_params_and_assigns_identity() {
    let db = RecordingClient::affecting(1);
    let mut w = Widget::named("a");
    Sqlite.create(&db, &mut Model::one(&mut w)).unwrap();

    assert!(!w.id.is_nil());
    assert_eq!(w.created_at, w.updated_at);

    let calls = db.calls();
    assert_eq!(calls.len(), 1);
    let Call::Named(sql, params) = &calls[0] else {
        panic!("unexpected call: {:?}", calls[0]);
    };
    assert_eq!(
        sql,
        "INSERT INTO widgets (id,name,count,score,created_at,updated_at) VALUES (:id, :name, :count, :score, :created_at, :updated_at)"
    );
    assert_eq!(params.len(), 6);
    assert_eq!(params[0], ("id".to_string(), Value::Uuid(w.id)));
    assert_eq!(params[1], ("name".to_string(), Value::from("a")));
}

#[test]
fn create_rejects_collections() {
    let db = RecordingClient::affecting(1);
    let mut ws = vec![Widget::named("a")];
    let err = Sqlite.create(&db, &mut Model::slice(&mut ws)).unwrap_err();
    assert!(err.is_misuse());
    assert!(err.to_string().contains("sqlite3 create"), "{err}");
    assert!(db.calls().is_empty());
}

#[test]
fn create_many_issues_one_statement() {
    let db = RecordingClient::affecting(3);
    let mut ws = vec![Widget::named("a"), Widget::named("b"), Widget::named("c'd")];
    Sqlite.create_many(&db, &mut Model::slice(&mut ws)).unwrap();

    let calls = db.calls();
    assert_eq!(calls.len(), 1);
    let Call::Execute(sql, params) = &calls[0] else {
        panic!("unexpected call: {:?}", calls[0]);
    };
    assert!(params.is_empty());
    assert!(sql.starts_with("INSERT INTO widgets (id,name,count,score,created_at,updated_at) VALUES ("));
    assert_eq!(sql.matches("), (").count(), 2);
    assert!(sql.contains("'c''d'"), "{sql}");
    for w in &ws {
        assert!(!w.id.is_nil());
        assert!(sql.contains(&w.id.to_string()));
    }
}

#[test]
fn create_many_requires_slice() {
    let db = RecordingClient::affecting(1);
    let mut w = Widget::named("a");
    let err = Sqlite.create_many(&db, &mut Model::one(&mut w)).unwrap_err();
    assert!(err.is_misuse());
    assert!(db.calls().is_empty());
}

#[test]
fn create_many_empty_is_noop() {
    let db = RecordingClient::affecting(0);
    let mut ws: Vec<Widget> = Vec::new();
    Sqlite.create_many(&db, &mut Model::slice(&mut ws)).unwrap();
    assert!(db.calls().is_empty());
}

#[test]
fn update_sql_and_params() {
    let db = RecordingClient::affecting(1);
    let mut w = saved("a");
    Sqlite.update(&db, &mut Model::one(&mut w)).unwrap();

    let calls = db.calls();
    let Call::Named(sql, params) = &calls[0] else {
        panic!("unexpected call: {:?}", calls[0]);
    };
    assert_eq!(
        sql,
        &format!(
            "UPDATE widgets SET name = :name, count = :count, score = :score, updated_at = :updated_at WHERE id = '{}'",
            w.id
        )
    );
    let names: Vec<&str> = params.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["name", "count", "score", "updated_at"]);
}

#[test]
fn update_zero_rows_is_not_found() {
    let db = RecordingClient::affecting(0);
    let mut w = saved("a");
    let err = Sqlite.update(&db, &mut Model::one(&mut w)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "Not found: sqlite3 update: query updated 0 rows"
    );
}

#[test]
fn destroy_ignores_zero_rows() {
    let db = RecordingClient::affecting(0);
    let mut w = saved("a");
    Sqlite.destroy(&db, &mut Model::one(&mut w)).unwrap();
    assert_eq!(
        db.calls(),
        vec![Call::Execute(
            format!("DELETE FROM widgets WHERE id = '{}'", w.id),
            Vec::new()
        )]
    );
}

#[test]
fn destroy_many_lists_ids() {
    let db = RecordingClient::affecting(2);
    let mut ws = vec![saved("a"), saved("b")];
    Sqlite.destroy_many(&db, &mut Model::slice(&mut ws)).unwrap();
    assert_eq!(
        db.calls(),
        vec![Call::Execute(
            format!(
                "DELETE FROM widgets WHERE id IN ('{}','{}')",
                ws[0].id, ws[1].id
            ),
            Vec::new()
        )]
    );
}

#[test]
fn destroy_many_rejects_nil_identity_before_issuing() {
    let db = RecordingClient::affecting(2);
    let mut ws = vec![saved("a"), Widget::named("unsaved")];
    let err = Sqlite.destroy_many(&db, &mut Model::slice(&mut ws)).unwrap_err();
    assert!(err.is_misuse());
    assert!(err.to_string().contains("widgets[1]"), "{err}");
    assert!(db.calls().is_empty());
}

#[test]
fn select_one_decodes_first_row() {
    let first = saved("first");
    let db = RecordingClient::returning(vec![widget_row(&first), widget_row(&saved("second"))]);
    let query = CompiledSql {
        sql: "SELECT * FROM widgets LIMIT 1".to_string(),
        args: Vec::new(),
    };
    let mut w = Widget::default();
    Sqlite.select_one(&db, &mut Model::one(&mut w), &query).unwrap();
    assert_eq!(w.id, first.id);
    assert_eq!(w.name, "first");
}

#[test]
fn select_one_without_rows_is_not_found() {
    let db = RecordingClient::returning(Vec::new());
    let query = CompiledSql {
        sql: "SELECT * FROM widgets".to_string(),
        args: Vec::new(),
    };
    let mut w = Widget::default();
    let err = Sqlite.select_one(&db, &mut Model::one(&mut w), &query).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn select_many_replaces_rows() {
    let db = RecordingClient::returning(vec![widget_row(&saved("a")), widget_row(&saved("b"))]);
    let query = CompiledSql {
        sql: "SELECT * FROM widgets WHERE count = ?".to_string(),
        args: vec![Value::from(0)],
    };
    let mut ws = vec![Widget::named("stale")];
    Sqlite.select_many(&db, &mut Model::rows(&mut ws), &query).unwrap();
    let names: Vec<&str> = ws.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(
        db.calls(),
        vec![Call::Query(query.sql.clone(), query.args.clone())]
    );
}

#[test]
fn select_one_into_collection_is_misuse() {
    let db = RecordingClient::returning(Vec::new());
    let query = CompiledSql {
        sql: "SELECT 1".to_string(),
        args: Vec::new(),
    };
    let mut ws: Vec<Widget> = Vec::new();
    let err = Sqlite.select_one(&db, &mut Model::rows(&mut ws), &query).unwrap_err();
    assert!(err.is_misuse());
    assert!(db.calls().is_empty());
}

#[test]
fn sql_view_interpolates_template() {
    let db = RecordingClient::returning(vec![widget_row(&saved("mark"))]);
    let vars = HashMap::from([("name".to_string(), "mark".to_string())]);
    let mut ws: Vec<Widget> = Vec::new();
    Sqlite.sql_view(&db, &mut Model::rows(&mut ws), Some(&vars)).unwrap();
    assert_eq!(ws.len(), 1);
    assert_eq!(
        db.calls(),
        vec![Call::Query(
            "SELECT id, name, count, score, created_at, updated_at FROM widgets WHERE name = 'mark'"
                .to_string(),
            Vec::new()
        )]
    );
}

#[test]
fn sql_view_bad_template_is_format_error() {
    let db = RecordingClient::returning(Vec::new());
    let mut w = Widget::default();
    let err = Sqlite
        .sql_view(&db, &mut Model::one(&mut w), Some(&HashMap::new()))
        .unwrap_err();
    assert!(matches!(err, OrmError::Format(_)), "{err:?}");
    assert!(db.calls().is_empty());
}

#[test]
fn create_table_renders_schema() {
    let db = RecordingClient::affecting(0);
    Sqlite.create_table::<Widget>(&db).unwrap();
    assert_eq!(
        db.calls(),
        vec![Call::Execute(
            "CREATE TABLE widgets (id TEXT,name TEXT,count INT,score NUMERIC,created_at NUMERIC,updated_at NUMERIC)"
                .to_string(),
            Vec::new()
        )]
    );
}

#[test]
fn values_match_columns() {
    let w = saved("x");
    assert_eq!(w.values().len(), Widget::columns().len());
    assert_eq!(w.values()[2], 0_i64.to_value());
}
