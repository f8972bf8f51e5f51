//! Hand-written record used by unit tests.

use crate::error::OrmResult;
use crate::record::{ColumnDef, ColumnRole, Record, Timestamp};
use crate::row::{FromRow, Row};
use crate::types::{ColumnType, DataType};
use crate::value::Value;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Widget {
    pub id: Uuid,
    pub name: String,
    pub count: i64,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub note: String,
}

impl Default for Widget {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            count: 0,
            score: 0.0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            note: String::new(),
        }
    }
}

impl Widget {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

const WIDGET_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", DataType::Uuid, ColumnRole::Identity),
    ColumnDef::new("name", DataType::String, ColumnRole::Plain),
    ColumnDef::new("count", DataType::Int, ColumnRole::Plain),
    ColumnDef::new("score", DataType::Float, ColumnRole::Plain),
    ColumnDef::new("created_at", DataType::Time, ColumnRole::CreatedAt),
    ColumnDef::new("updated_at", DataType::Time, ColumnRole::UpdatedAt),
];

impl FromRow for Widget {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            count: row.try_get_column("count")?,
            score: row.try_get_column("score")?,
            created_at: row.try_get_column("created_at")?,
            updated_at: row.try_get_column("updated_at")?,
            note: String::default(),
        })
    }
}

impl Record for Widget {
    fn table_name() -> &'static str {
        "widgets"
    }

    fn columns() -> &'static [ColumnDef] {
        WIDGET_COLUMNS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.to_value(),
            self.name.to_value(),
            self.count.to_value(),
            self.score.to_value(),
            self.created_at.to_value(),
            self.updated_at.to_value(),
        ]
    }

    fn id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn touch_created_at(&mut self, now: DateTime<Utc>) {
        self.created_at.stamp(now);
    }

    fn touch_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at.stamp(now);
    }

    fn sql_view() -> Option<&'static str> {
        Some("SELECT id, name, count, score, created_at, updated_at FROM widgets WHERE name = '{name}'")
    }
}

/// Same table name as [`Widget`], different type.
#[derive(Debug, Default)]
pub(crate) struct WidgetAlias {
    pub name: String,
}

const ALIAS_COLUMNS: &[ColumnDef] = &[ColumnDef::new("name", DataType::String, ColumnRole::Plain)];

impl FromRow for WidgetAlias {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            name: row.try_get_column("name")?,
        })
    }
}

impl Record for WidgetAlias {
    fn table_name() -> &'static str {
        "widgets"
    }

    fn columns() -> &'static [ColumnDef] {
        ALIAS_COLUMNS
    }

    fn values(&self) -> Vec<Value> {
        vec![self.name.to_value()]
    }
}
