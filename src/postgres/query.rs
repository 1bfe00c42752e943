use std::error::Error;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_postgres::Statement;
use tokio_postgres::types::{FromSql, Kind, Type};

use crate::error::SqlCrudError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Build a result set using statement metadata for column names, so an empty result still
/// carries its columns.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set_from_statement(
    stmt: &Statement,
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, SqlCrudError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

fn scalar<'a, T, F>(row: &'a tokio_postgres::Row, idx: usize, wrap: F) -> Result<RowValues, SqlCrudError>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> RowValues,
{
    let val: Option<T> = row.try_get(idx)?;
    Ok(val.map_or(RowValues::Null, wrap))
}

fn array<'a, T, F>(row: &'a tokio_postgres::Row, idx: usize, wrap: F) -> Result<RowValues, SqlCrudError>
where
    T: FromSql<'a>,
    F: Fn(T) -> RowValues,
{
    let val: Option<Vec<Option<T>>> = row.try_get(idx)?;
    Ok(val.map_or(RowValues::Null, |items| {
        RowValues::Array(
            items
                .into_iter()
                .map(|item| item.map_or(RowValues::Null, &wrap))
                .collect(),
        )
    }))
}

/// `INTERVAL` read off the wire; a month counts as 30 days.
struct PgInterval(TimeDelta);

impl<'a> FromSql<'a> for PgInterval {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let raw: &[u8; 16] = raw.try_into()?;
        let micros = i64::from_be_bytes(raw[0..8].try_into()?);
        let days = i32::from_be_bytes(raw[8..12].try_into()?);
        let months = i32::from_be_bytes(raw[12..16].try_into()?);
        let days = TimeDelta::try_days(i64::from(months) * 30 + i64::from(days))
            .ok_or("interval out of range")?;
        let total = days
            .checked_add(&TimeDelta::microseconds(micros))
            .ok_or("interval out of range")?;
        Ok(PgInterval(total))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}

fn midnight(date: NaiveDate) -> RowValues {
    RowValues::Timestamp(date.and_time(NaiveTime::MIN))
}

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// `TIMESTAMPTZ` reads with a UTC offset, `DATE` as midnight of that day and `NUMERIC` as an
/// exact decimal. Types without a dedicated mapping are read as text.
///
/// # Errors
/// Returns `SqlCrudError::PostgresError` if the column cannot be read.
pub fn postgres_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<RowValues, SqlCrudError> {
    let type_info = row.columns()[idx].type_();

    if let Kind::Array(member) = type_info.kind() {
        return match *member {
            Type::INT2 => array::<i16, _>(row, idx, |v| RowValues::Int(i64::from(v))),
            Type::INT4 => array::<i32, _>(row, idx, |v| RowValues::Int(i64::from(v))),
            Type::INT8 => array::<i64, _>(row, idx, RowValues::Int),
            Type::FLOAT4 => array::<f32, _>(row, idx, |v| RowValues::Float(f64::from(v))),
            Type::FLOAT8 => array::<f64, _>(row, idx, RowValues::Float),
            Type::BOOL => array::<bool, _>(row, idx, RowValues::Bool),
            Type::UUID => array::<uuid::Uuid, _>(row, idx, RowValues::Uuid),
            Type::NUMERIC => array::<Decimal, _>(row, idx, RowValues::Decimal),
            _ => array::<String, _>(row, idx, RowValues::Text),
        };
    }

    match *type_info {
        Type::INT2 => scalar::<i16, _>(row, idx, |v| RowValues::Int(i64::from(v))),
        Type::INT4 => scalar::<i32, _>(row, idx, |v| RowValues::Int(i64::from(v))),
        Type::INT8 => scalar::<i64, _>(row, idx, RowValues::Int),
        Type::FLOAT4 => scalar::<f32, _>(row, idx, |v| RowValues::Float(f64::from(v))),
        Type::FLOAT8 => scalar::<f64, _>(row, idx, RowValues::Float),
        Type::BOOL => scalar::<bool, _>(row, idx, RowValues::Bool),
        Type::TIMESTAMP => scalar::<NaiveDateTime, _>(row, idx, RowValues::Timestamp),
        Type::TIMESTAMPTZ => {
            scalar::<DateTime<Utc>, _>(row, idx, |v| RowValues::TimestampTz(v.fixed_offset()))
        }
        Type::DATE => scalar::<NaiveDate, _>(row, idx, midnight),
        Type::TIME => scalar::<NaiveTime, _>(row, idx, RowValues::Time),
        Type::INTERVAL => scalar::<PgInterval, _>(row, idx, |v| RowValues::Interval(v.0)),
        Type::NUMERIC => scalar::<Decimal, _>(row, idx, RowValues::Decimal),
        Type::JSON | Type::JSONB => scalar::<Value, _>(row, idx, RowValues::JSON),
        Type::BYTEA => scalar::<Vec<u8>, _>(row, idx, RowValues::Blob),
        Type::UUID => scalar::<uuid::Uuid, _>(row, idx, RowValues::Uuid),
        _ => scalar::<String, _>(row, idx, RowValues::Text),
    }
}
