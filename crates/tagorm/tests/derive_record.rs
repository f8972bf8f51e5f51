//! Tests for the descriptors generated by `#[derive(Record)]`.

use chrono::{DateTime, TimeZone, Utc};
use tagorm::{
    ColumnDef, ColumnRole, DataType, FromRow, Record, Row, Schema, Value,
    validate_record, validate_registered_records,
};
use uuid::Uuid;

#[derive(Debug, Default, Record, FromRow)]
#[orm(table = "gadgets", view = "SELECT id, label FROM gadgets WHERE label = '{label}'")]
struct Gadget {
    #[orm(column = "id")]
    id: Uuid,
    #[orm(column = "label")]
    label: String,
    #[orm(column = "qty")]
    qty: i32,
    #[orm(column = "ratio")]
    ratio: f32,
    #[orm(column = "enabled")]
    enabled: bool,
    #[orm(column = "created_at")]
    created_at: DateTime<Utc>,
    #[orm(column = "updated_at")]
    updated_at: Option<DateTime<Utc>>,
    cached: Vec<String>,
}

#[derive(Debug, Default, Record, FromRow)]
struct Sprocket {
    #[orm(column = "teeth")]
    teeth: i64,
    #[orm(column = "note")]
    note: Option<String>,
    #[orm(column = "weight")]
    weight: Option<f64>,
}

#[derive(Debug, Default, Record, FromRow)]
#[orm(table = "renamed")]
struct Renamed {
    #[orm(column = "id")]
    id: Uuid,
    #[orm(column = "display_name")]
    name: String,
}

#[test]
fn columns_follow_declaration_order() {
    assert_eq!(Gadget::table_name(), "gadgets");
    assert_eq!(
        Gadget::columns(),
        &[
            ColumnDef::new("id", DataType::Uuid, ColumnRole::Identity),
            ColumnDef::new("label", DataType::String, ColumnRole::Plain),
            ColumnDef::new("qty", DataType::Int, ColumnRole::Plain),
            ColumnDef::new("ratio", DataType::Float, ColumnRole::Plain),
            ColumnDef::new("enabled", DataType::Bool, ColumnRole::Plain),
            ColumnDef::new("created_at", DataType::Time, ColumnRole::CreatedAt),
            ColumnDef::new("updated_at", DataType::NullTime, ColumnRole::UpdatedAt),
        ]
    );
}

#[test]
fn table_name_defaults_to_type_name() {
    assert_eq!(Sprocket::table_name(), "Sprocket");
    let types: Vec<DataType> = Sprocket::columns().iter().map(|c| c.data_type).collect();
    assert_eq!(
        types,
        [DataType::Int, DataType::NullString, DataType::NullFloat]
    );
    assert!(Sprocket::identity_column().is_none());
    assert_eq!(Sprocket::default().id(), None);
}

#[test]
fn column_tag_overrides_field_name() {
    let names: Vec<&str> = Renamed::columns().iter().map(|c| c.name).collect();
    assert_eq!(names, ["id", "display_name"]);

    let mut r = Renamed {
        name: "x".to_string(),
        ..Default::default()
    };
    let id = Uuid::new_v4();
    r.set_id(id);
    assert_eq!(r.id(), Some(id));
    assert_eq!(r.values(), vec![Value::Uuid(id), Value::from("x")]);
}

#[test]
fn values_skip_untagged_fields() {
    let g = Gadget {
        label: "knob".to_string(),
        qty: 3,
        ratio: 0.5,
        enabled: true,
        cached: vec!["ignored".to_string()],
        ..Default::default()
    };
    let values = g.values();
    assert_eq!(values.len(), Gadget::columns().len());
    assert_eq!(values[1], Value::from("knob"));
    assert_eq!(values[2], Value::Integer(3));
    assert_eq!(values[3], Value::Real(0.5));
    assert_eq!(values[4], Value::Bool(true));
    assert_eq!(values[6], Value::Null);
}

#[test]
fn touch_methods_stamp_timestamps() {
    let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    let mut g = Gadget::default();
    g.touch_created_at(now);
    g.touch_updated_at(now);
    assert_eq!(g.created_at, now);
    assert_eq!(g.updated_at, Some(now));

    let mut s = Sprocket::default();
    s.touch_created_at(now);
    assert_eq!(s.teeth, 0);
}

#[test]
fn view_attribute_is_exposed() {
    assert_eq!(
        Gadget::sql_view(),
        Some("SELECT id, label FROM gadgets WHERE label = '{label}'")
    );
    assert_eq!(Sprocket::sql_view(), None);
}

#[test]
fn from_row_reads_tagged_columns_only() {
    let id = Uuid::new_v4();
    let row = Row::new(
        vec!["teeth".to_string(), "note".to_string(), "weight".to_string()].into(),
        vec![Value::Integer(12), Value::Null, Value::Integer(4)],
    );
    let s = Sprocket::from_row(&row).unwrap();
    assert_eq!(s.teeth, 12);
    assert_eq!(s.note, None);
    assert_eq!(s.weight, Some(4.0));

    let row = Row::new(
        vec!["id".to_string(), "display_name".to_string()].into(),
        vec![Value::Text(id.to_string()), Value::from("shown")],
    );
    let r = Renamed::from_row(&row).unwrap();
    assert_eq!(r.id, id);
    assert_eq!(r.name, "shown");
}

#[test]
fn from_row_requires_every_tagged_column() {
    let row = Row::new(vec!["teeth".to_string()].into(), vec![Value::Integer(1)]);
    assert!(Sprocket::from_row(&row).is_err());
}

#[test]
fn schema_is_built_from_descriptor() {
    let schema = Schema::from_record::<Gadget>().unwrap();
    assert_eq!(schema.len(), 7);
    assert_eq!(
        schema.to_sql(),
        "CREATE TABLE gadgets (id TEXT,label TEXT,qty INT,ratio NUMERIC,enabled INT,created_at NUMERIC,updated_at NUMERIC)"
    );
}

#[test]
fn nullable_columns_share_native_types() {
    let schema = Schema::from_record::<Sprocket>().unwrap();
    assert_eq!(
        schema.to_sql(),
        "CREATE TABLE Sprocket (teeth INT,note TEXT,weight NUMERIC)"
    );
}

#[test]
fn derived_records_validate() {
    validate_record::<Gadget>().unwrap();
    validate_record::<Sprocket>().unwrap();
    validate_record::<Renamed>().unwrap();
    validate_registered_records().unwrap();
}
