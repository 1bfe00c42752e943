use rusqlite::types::Value;

use crate::error::SqlCrudError;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
///
/// Timestamps are stored as text (`YYYY-MM-DD HH:MM:SS.fff`, RFC 3339 with an offset), UUIDs
/// and decimals as text, intervals as microseconds and booleans as integers, the way `SQLite`
/// applications usually store them.
///
/// # Errors
///
/// Returns `SqlCrudError::ConversionError` for arrays, which `SQLite` cannot bind.
pub fn row_value_to_sqlite_value(value: &RowValues) -> Result<Value, SqlCrudError> {
    Ok(match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::TimestampTz(dt) => Value::Text(dt.to_rfc3339()),
        RowValues::Time(t) => Value::Text(t.format("%H:%M:%S%.f").to_string()),
        RowValues::Interval(d) => Value::Integer(d.num_microseconds().ok_or_else(|| {
            SqlCrudError::ConversionError(format!("interval {d} overflows microseconds"))
        })?),
        RowValues::Decimal(d) => Value::Text(d.to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
        RowValues::Uuid(id) => Value::Text(id.hyphenated().to_string()),
        RowValues::Array(_) => {
            return Err(SqlCrudError::ConversionError(
                "SQLite cannot bind array values".to_string(),
            ));
        }
    })
}

/// Owned `SQLite` parameter values, in placeholder order.
pub struct Params(pub Vec<Value>);

impl Params {
    /// Convert crate values into `SQLite` values.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` if a value cannot be bound.
    pub fn convert(params: &[RowValues]) -> Result<Self, SqlCrudError> {
        params
            .iter()
            .map(row_value_to_sqlite_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Params)
    }

    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }

    /// Build a borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.0.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn values_map_to_sqlite_storage_classes() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(8, 30, 0, 250)
            .unwrap();
        let id = uuid::Uuid::nil();
        let params = Params::convert(&[
            RowValues::Bool(true),
            RowValues::Timestamp(ts),
            RowValues::Uuid(id),
            RowValues::Null,
        ])
        .unwrap();
        assert_eq!(
            params.as_values(),
            &[
                Value::Integer(1),
                Value::Text("2024-03-01 08:30:00.250".into()),
                Value::Text("00000000-0000-0000-0000-000000000000".into()),
                Value::Null,
            ]
        );
        assert_eq!(params.as_refs().len(), 4);
    }

    #[test]
    fn decimals_and_times_keep_their_text_form() {
        let price: rust_decimal::Decimal = "19.90".parse().unwrap();
        let t = chrono::NaiveTime::from_hms_opt(23, 5, 0).unwrap();
        let params = Params::convert(&[
            RowValues::Decimal(price),
            RowValues::Time(t),
            RowValues::Interval(chrono::TimeDelta::seconds(2)),
        ])
        .unwrap();
        assert_eq!(
            params.as_values(),
            &[
                Value::Text("19.90".into()),
                Value::Text("23:05:00".into()),
                Value::Integer(2_000_000),
            ]
        );
    }

    #[test]
    fn arrays_are_rejected() {
        assert!(matches!(
            Params::convert(&[RowValues::Array(vec![RowValues::Int(1)])]),
            Err(SqlCrudError::ConversionError(_))
        ));
    }
}
