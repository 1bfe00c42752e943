#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use sql_crud::prelude::*;
use uuid::Uuid;

/// Records every statement and answers selects from a queue of canned result sets.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub statements: Vec<(String, Vec<RowValues>)>,
    pub results: VecDeque<ResultSet>,
    pub rows_affected: usize,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            rows_affected: 1,
            ..Self::default()
        }
    }

    pub fn answer(&mut self, rs: ResultSet) -> &mut Self {
        self.results.push_back(rs);
        self
    }

    pub fn answer_scalar(&mut self, value: RowValues) -> &mut Self {
        self.answer(result_set(&["value"], vec![vec![value]]))
    }

    pub fn last_sql(&self) -> &str {
        self.statements.last().map_or("", |(sql, _)| sql.as_str())
    }

    pub fn last_params(&self) -> &[RowValues] {
        self.statements.last().map_or(&[], |(_, p)| p.as_slice())
    }
}

#[async_trait]
impl CrudExecutor for RecordingExecutor {
    async fn execute_batch(&mut self, query: &str) -> Result<(), SqlCrudError> {
        self.statements.push((query.to_string(), Vec::new()));
        Ok(())
    }

    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlCrudError> {
        self.statements.push((query.to_string(), params.to_vec()));
        Ok(self.results.pop_front().unwrap_or_default())
    }

    async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlCrudError> {
        self.statements.push((query.to_string(), params.to_vec()));
        Ok(self.rows_affected)
    }
}

pub fn result_set(columns: &[&str], rows: Vec<Vec<RowValues>>) -> ResultSet {
    let mut rs = ResultSet::with_capacity(rows.len());
    rs.set_column_names(Arc::new(columns.iter().map(|c| (*c).to_string()).collect()));
    for row in rows {
        rs.add_row_values(row);
    }
    rs
}

pub const SQLITE_SCHEMA: &str = r#"
ATTACH DATABASE ':memory:' AS "Log";
CREATE TABLE "Users" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "Name" TEXT NOT NULL,
    "Age" INTEGER NOT NULL,
    "ScheduledDayOff" INTEGER NULL,
    "CreatedDate" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE "Car" (
    "CarId" INTEGER PRIMARY KEY AUTOINCREMENT,
    "Make" TEXT NOT NULL,
    "ModelName" TEXT NOT NULL
);
CREATE TABLE "KeyMaster" (
    "Key1" INTEGER NOT NULL,
    "Key2" INTEGER NOT NULL,
    PRIMARY KEY ("Key1", "Key2")
);
CREATE TABLE "City" (
    "Name" TEXT PRIMARY KEY,
    "Population" INTEGER NOT NULL
);
CREATE TABLE "GUIDTest" (
    "Id" TEXT PRIMARY KEY,
    "Name" TEXT NOT NULL
);
CREATE TABLE "StrangeColumnNames" (
    "ItemId" INTEGER PRIMARY KEY AUTOINCREMENT,
    "Word" TEXT NOT NULL,
    "colstringstrangeword" TEXT NOT NULL
);
CREATE TABLE "IgnoreColumns" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "IgnoreInsert" TEXT NULL,
    "IgnoreUpdate" TEXT NULL,
    "IgnoreSelect" TEXT NULL,
    "IgnoreAll" TEXT NULL
);
CREATE TABLE "Tagged" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "Label" TEXT NOT NULL,
    "Location" TEXT NULL
);
CREATE TABLE "Log"."CarLog" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "LogNotes" TEXT NOT NULL
);
CREATE TABLE "AuditEntry" (
    "Message" TEXT NOT NULL,
    "Level" INTEGER NOT NULL
);
CREATE TABLE "Product" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "Price" TEXT NOT NULL,
    "Weight" REAL NOT NULL,
    "OpensAt" TEXT NOT NULL,
    "UpdatedAt" TEXT NOT NULL,
    "LeadTime" INTEGER NOT NULL
);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfWeek {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl DayOfWeek {
    fn from_i32(value: i32) -> Result<Self, SqlCrudError> {
        Ok(match value {
            0 => DayOfWeek::Sunday,
            1 => DayOfWeek::Monday,
            2 => DayOfWeek::Tuesday,
            3 => DayOfWeek::Wednesday,
            4 => DayOfWeek::Thursday,
            5 => DayOfWeek::Friday,
            6 => DayOfWeek::Saturday,
            other => {
                return Err(SqlCrudError::ConversionError(format!(
                    "{other} is not a day of the week"
                )));
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub scheduled_day_off: Option<DayOfWeek>,
    pub created_date: Option<NaiveDateTime>,
    pub not_mapped_int: i32,
    pub cars: Vec<Car>,
}

impl User {
    pub fn new(name: &str, age: i32) -> Self {
        User {
            name: name.to_string(),
            age,
            ..User::default()
        }
    }
}

impl Model for User {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Int32),
        FieldInfo::new("Name", ColumnType::Text),
        FieldInfo::new("Age", ColumnType::Int32),
        FieldInfo::new("ScheduledDayOff", ColumnType::Enum).nullable(),
        FieldInfo::new("CreatedDate", ColumnType::DateTime).read_only(),
        FieldInfo::new("NotMappedInt", ColumnType::Int32).not_mapped(),
        FieldInfo::new("Cars", ColumnType::Relation),
    ];

    fn table() -> TableInfo {
        TableInfo::new("Users")
    }

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Id", self.id.into()),
            ("Name", self.name.as_str().into()),
            ("Age", self.age.into()),
            (
                "ScheduledDayOff",
                self.scheduled_day_off.map(|d| d as i32).into(),
            ),
            ("CreatedDate", self.created_date.into()),
            ("NotMappedInt", self.not_mapped_int.into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        let day: Option<i32> = row.get("ScheduledDayOff")?;
        Ok(User {
            id: row.get("Id")?,
            name: row.get("Name")?,
            age: row.get("Age")?,
            scheduled_day_off: day.map(DayOfWeek::from_i32).transpose()?,
            created_date: row.get("CreatedDate")?,
            not_mapped_int: 0,
            cars: Vec::new(),
        })
    }
}

/// Limited-field view of [`User`] carrying only the key and the name.
#[derive(Debug, Clone, PartialEq)]
pub struct UserName {
    pub id: i32,
    pub name: String,
}

impl Projection for UserName {
    type Target = User;
    const PROPERTIES: &'static [&'static str] = &["Id", "Name"];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![("Id", self.id.into()), ("Name", self.name.as_str().into())]
    }
}

/// Insert-only view of [`User`] without the schedule.
pub struct NewUser {
    pub name: String,
    pub age: i32,
}

impl Projection for NewUser {
    type Target = User;
    const PROPERTIES: &'static [&'static str] = &["Name", "Age"];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![("Name", self.name.as_str().into()), ("Age", self.age.into())]
    }
}

/// Names a property `User` does not map.
pub struct UserWithCars {
    pub id: i32,
}

impl Projection for UserWithCars {
    type Target = User;
    const PROPERTIES: &'static [&'static str] = &["Id", "NotMappedInt"];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![("Id", self.id.into())]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Car {
    pub car_id: i32,
    pub make: String,
    pub model_name: String,
}

impl Model for Car {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("CarId", ColumnType::Int32).key(),
        FieldInfo::new("Make", ColumnType::Text),
        FieldInfo::new("ModelName", ColumnType::Text),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("CarId", self.car_id.into()),
            ("Make", self.make.as_str().into()),
            ("ModelName", self.model_name.as_str().into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(Car {
            car_id: row.get("CarId")?,
            make: row.get("Make")?,
            model_name: row.get("ModelName")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMaster {
    pub key1: i32,
    pub key2: i32,
}

impl Model for KeyMaster {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Key1", ColumnType::Int32).key(),
        FieldInfo::new("Key2", ColumnType::Int32).key(),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![("Key1", self.key1.into()), ("Key2", self.key2.into())]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(KeyMaster {
            key1: row.get("Key1")?,
            key2: row.get("Key2")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    pub population: i32,
}

impl Model for City {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Name", ColumnType::Text).key(),
        FieldInfo::new("Population", ColumnType::Int32),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Name", self.name.as_str().into()),
            ("Population", self.population.into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(City {
            name: row.get("Name")?,
            population: row.get("Population")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuidTest {
    pub id: Uuid,
    pub name: String,
}

impl Model for GuidTest {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Uuid).key(),
        FieldInfo::new("Name", ColumnType::Text),
    ];

    fn table() -> TableInfo {
        TableInfo::new("GUIDTest")
    }

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![("Id", self.id.into()), ("Name", self.name.as_str().into())]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(GuidTest {
            id: row.get("Id")?,
            name: row.get("Name")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrangeColumnNames {
    pub id: i32,
    pub word: String,
    pub strange_word: String,
    pub extra_property: String,
}

impl Model for StrangeColumnNames {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Int32).key().column("ItemId"),
        FieldInfo::new("Word", ColumnType::Text),
        FieldInfo::new("StrangeWord", ColumnType::Text).column("colstringstrangeword"),
        FieldInfo::new("ExtraProperty", ColumnType::Text).editable(false),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Id", self.id.into()),
            ("Word", self.word.as_str().into()),
            ("StrangeWord", self.strange_word.as_str().into()),
            ("ExtraProperty", self.extra_property.as_str().into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(StrangeColumnNames {
            id: row.get("Id")?,
            word: row.get("Word")?,
            strange_word: row.get("StrangeWord")?,
            extra_property: row.get_or_default("ExtraProperty")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreColumns {
    pub id: i32,
    pub ignore_insert: Option<String>,
    pub ignore_update: Option<String>,
    pub ignore_select: Option<String>,
    pub ignore_all: Option<String>,
}

impl Model for IgnoreColumns {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Int32).key(),
        FieldInfo::new("IgnoreInsert", ColumnType::Text).nullable().ignore_insert(),
        FieldInfo::new("IgnoreUpdate", ColumnType::Text).nullable().ignore_update(),
        FieldInfo::new("IgnoreSelect", ColumnType::Text).nullable().ignore_select(),
        FieldInfo::new("IgnoreAll", ColumnType::Text)
            .nullable()
            .ignore_insert()
            .ignore_update()
            .ignore_select(),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Id", self.id.into()),
            ("IgnoreInsert", self.ignore_insert.clone().into()),
            ("IgnoreUpdate", self.ignore_update.clone().into()),
            ("IgnoreSelect", self.ignore_select.clone().into()),
            ("IgnoreAll", self.ignore_all.clone().into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(IgnoreColumns {
            id: row.get("Id")?,
            ignore_insert: row.get("IgnoreInsert")?,
            ignore_update: row.get("IgnoreUpdate")?,
            ignore_select: row.get("IgnoreSelect")?,
            ignore_all: row.get("IgnoreAll")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarLog {
    pub id: i32,
    pub log_notes: String,
}

impl Model for CarLog {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Int32),
        FieldInfo::new("LogNotes", ColumnType::Text),
    ];

    fn table() -> TableInfo {
        TableInfo::new("CarLog").with_schema("Log")
    }

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Id", self.id.into()),
            ("LogNotes", self.log_notes.as_str().into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(CarLog {
            id: row.get("Id")?,
            log_notes: row.get("LogNotes")?,
        })
    }
}

/// A map coordinate stored as `"lat,lon"` text through the `point` type handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

pub struct PointHandler;

impl ValueHandler<Point> for PointHandler {
    fn set_value(&self, value: &Point) -> Result<RowValues, SqlCrudError> {
        Ok(RowValues::Text(format!("{},{}", value.lat, value.lon)))
    }

    fn parse(&self, raw: &RowValues) -> Result<Point, SqlCrudError> {
        let text = String::from_sql_value(raw)?;
        let (lat, lon) = text
            .split_once(',')
            .ok_or_else(|| SqlCrudError::ConversionError(format!("bad point {text:?}")))?;
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| SqlCrudError::ConversionError(format!("bad point {text:?}: {e}")))
        };
        Ok(Point {
            lat: parse(lat)?,
            lon: parse(lon)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub id: i32,
    pub label: String,
    pub location: Point,
}

impl Model for Tagged {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Int32),
        FieldInfo::new("Label", ColumnType::Text),
        FieldInfo::new("Location", ColumnType::Custom("point")),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Id", self.id.into()),
            ("Label", self.label.as_str().into()),
            ("Location", FieldValue::handled(&self.location)),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(Tagged {
            id: row.get("Id")?,
            label: row.get("Label")?,
            location: row.get_handled("Location")?,
        })
    }
}

/// A `PostgreSQL` array column.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    pub id: i32,
    pub values: Vec<i32>,
}

impl Model for Scores {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Int32),
        FieldInfo::new("Values", ColumnType::Array(&ColumnType::Int32)),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![("Id", self.id.into()), ("Values", self.values.clone().into())]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(Scores {
            id: row.get("Id")?,
            values: row.get("Values")?,
        })
    }
}

pub fn sqlite_crud() -> Crud {
    Crud::builder(Dialect::Sqlite)
        .handler::<Point, _>("point", PointHandler)
        .build()
}

/// No key property and no `Id`: insert and list only.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub message: String,
    pub level: i32,
}

impl Model for AuditEntry {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Message", ColumnType::Text),
        FieldInfo::new("Level", ColumnType::Int32),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Message", self.message.as_str().into()),
            ("Level", self.level.into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(AuditEntry {
            message: row.get("Message")?,
            level: row.get("Level")?,
        })
    }
}

/// Exact and temporal column types. `Weight` is an `f64` over a decimal column.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub price: Decimal,
    pub weight: f64,
    pub opens_at: NaiveTime,
    pub updated_at: DateTime<FixedOffset>,
    pub lead_time: TimeDelta,
}

impl Product {
    pub fn sample() -> Self {
        Product {
            id: 0,
            price: Decimal::new(1250, 2),
            weight: 2.75,
            opens_at: NaiveTime::from_hms_opt(9, 15, 30).unwrap_or_default(),
            updated_at: DateTime::parse_from_rfc3339("2026-10-18T08:30:00+02:00")
                .unwrap_or_default(),
            lead_time: TimeDelta::hours(36),
        }
    }
}

impl Model for Product {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("Id", ColumnType::Int32),
        FieldInfo::new("Price", ColumnType::Decimal),
        FieldInfo::new("Weight", ColumnType::Decimal),
        FieldInfo::new("OpensAt", ColumnType::Time),
        FieldInfo::new("UpdatedAt", ColumnType::DateTimeOffset),
        FieldInfo::new("LeadTime", ColumnType::Interval),
    ];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Id", self.id.into()),
            ("Price", self.price.into()),
            ("Weight", self.weight.into()),
            ("OpensAt", self.opens_at.into()),
            ("UpdatedAt", self.updated_at.into()),
            ("LeadTime", self.lead_time.into()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
        Ok(Product {
            id: row.get("Id")?,
            price: row.get("Price")?,
            weight: row.get("Weight")?,
            opens_at: row.get("OpensAt")?,
            updated_at: row.get("UpdatedAt")?,
            lead_time: row.get("LeadTime")?,
        })
    }
}
