//! Conversions between Rust values and [`RowValues`].
//!
//! `From<T> for RowValues` covers the binding direction; [`FromSqlValue`] covers reading a
//! column back, and [`FromKeyValues`] shapes the key(s) produced by an insert into the caller's
//! key type.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::SqlCrudError;
use crate::types::RowValues;

/// Read a typed value out of a [`RowValues`].
///
/// A column that is absent from the result row is presented as [`RowValues::Null`], so
/// `Option<T>` reads as `None` and plain `T` reports a conversion error.
pub trait FromSqlValue: Sized {
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` when the value has an incompatible shape.
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError>;
}

fn mismatch(target: &str, value: &RowValues) -> SqlCrudError {
    SqlCrudError::ConversionError(format!("expected {target}, found {}", value.kind()))
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
                    match value {
                        RowValues::Int(i) => <$ty>::try_from(*i).map_err(|e| {
                            SqlCrudError::ConversionError(format!(
                                "{i} does not fit in {}: {e}",
                                stringify!($ty)
                            ))
                        }),
                        RowValues::Bool(b) => Ok(<$ty>::from(*b)),
                        other => Err(mismatch(stringify!($ty), other)),
                    }
                }
            }

            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32);

impl FromSqlValue for u64 {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::Int(i) => u64::try_from(*i)
                .map_err(|e| SqlCrudError::ConversionError(format!("{i} does not fit in u64: {e}"))),
            other => Err(mismatch("u64", other)),
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        value.as_float().ok_or_else(|| mismatch("f64", value))
    }
}

impl FromSqlValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        value.as_float().map(|f| f as f32).ok_or_else(|| mismatch("f32", value))
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::Text(s) => Ok(s.clone()),
            RowValues::Uuid(id) => Ok(id.to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromSqlValue for char {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        let text = value.as_text().ok_or_else(|| mismatch("char", value))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(SqlCrudError::ConversionError(format!(
                "expected a single character, found {text:?}"
            ))),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::Blob(bytes) => Ok(bytes.clone()),
            RowValues::Text(s) => Ok(s.clone().into_bytes()),
            other => Err(mismatch("bytes", other)),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        value.as_timestamp().ok_or_else(|| mismatch("timestamp", value))
    }
}

impl FromSqlValue for NaiveDate {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        if let Some(ts) = value.as_timestamp() {
            return Ok(ts.date());
        }
        value
            .as_text()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .ok_or_else(|| mismatch("date", value))
    }
}

impl FromSqlValue for NaiveTime {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::Time(t) => Ok(*t),
            RowValues::Timestamp(ts) => Ok(ts.time()),
            RowValues::Text(s) => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .map_err(|e| SqlCrudError::ConversionError(format!("invalid time {s:?}: {e}"))),
            other => Err(mismatch("time", other)),
        }
    }
}

/// Naive timestamps are taken to be UTC.
impl FromSqlValue for DateTime<FixedOffset> {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::TimestampTz(dt) => Ok(*dt),
            RowValues::Text(s) => DateTime::parse_from_rfc3339(s).or_else(|_| {
                value
                    .as_timestamp()
                    .map(|ts| ts.and_utc().fixed_offset())
                    .ok_or_else(|| mismatch("timestamptz", value))
            }),
            other => other
                .as_timestamp()
                .map(|ts| ts.and_utc().fixed_offset())
                .ok_or_else(|| mismatch("timestamptz", other)),
        }
    }
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        DateTime::<FixedOffset>::from_sql_value(value).map(|dt| dt.with_timezone(&Utc))
    }
}

/// Integers are read as a microsecond count.
impl FromSqlValue for TimeDelta {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::Interval(d) => Ok(*d),
            RowValues::Int(micros) => Ok(TimeDelta::microseconds(*micros)),
            other => Err(mismatch("interval", other)),
        }
    }
}

impl FromSqlValue for Decimal {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::Decimal(d) => Ok(*d),
            RowValues::Int(i) => Ok(Decimal::from(*i)),
            RowValues::Float(f) => Decimal::try_from(*f)
                .map_err(|e| SqlCrudError::ConversionError(format!("{f} is not a decimal: {e}"))),
            RowValues::Text(s) => s
                .parse::<Decimal>()
                .map_err(|e| SqlCrudError::ConversionError(format!("invalid decimal {s:?}: {e}"))),
            other => Err(mismatch("decimal", other)),
        }
    }
}

impl FromSqlValue for Uuid {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        value.as_uuid().ok_or_else(|| mismatch("uuid", value))
    }
}

impl FromSqlValue for JsonValue {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        match value {
            RowValues::JSON(json) => Ok(json.clone()),
            RowValues::Text(s) => serde_json::from_str(s)
                .map_err(|e| SqlCrudError::ConversionError(format!("invalid json text: {e}"))),
            other => Err(mismatch("json", other)),
        }
    }
}

impl FromSqlValue for RowValues {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        Ok(value.clone())
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_sql_value(value).map(Some)
        }
    }
}

macro_rules! impl_array {
    ($($ty:ty),*) => {
        $(
            impl FromSqlValue for Vec<$ty> {
                fn from_sql_value(value: &RowValues) -> Result<Self, SqlCrudError> {
                    let items = value.as_array().ok_or_else(|| mismatch("array", value))?;
                    items.iter().map(<$ty>::from_sql_value).collect()
                }
            }

            impl From<Vec<$ty>> for RowValues {
                fn from(items: Vec<$ty>) -> Self {
                    RowValues::Array(items.into_iter().map(RowValues::from).collect())
                }
            }
        )*
    };
}

impl_array!(i16, i32, i64, f64, bool, String, Decimal);

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<f32> for RowValues {
    fn from(value: f32) -> Self {
        RowValues::Float(f64::from(value))
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<&String> for RowValues {
    fn from(value: &String) -> Self {
        RowValues::Text(value.clone())
    }
}

impl From<char> for RowValues {
    fn from(value: char) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<NaiveDate> for RowValues {
    fn from(value: NaiveDate) -> Self {
        RowValues::Timestamp(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<NaiveTime> for RowValues {
    fn from(value: NaiveTime) -> Self {
        RowValues::Time(value)
    }
}

impl From<DateTime<FixedOffset>> for RowValues {
    fn from(value: DateTime<FixedOffset>) -> Self {
        RowValues::TimestampTz(value)
    }
}

impl From<DateTime<Utc>> for RowValues {
    fn from(value: DateTime<Utc>) -> Self {
        RowValues::TimestampTz(value.fixed_offset())
    }
}

impl From<TimeDelta> for RowValues {
    fn from(value: TimeDelta) -> Self {
        RowValues::Interval(value)
    }
}

impl From<Decimal> for RowValues {
    fn from(value: Decimal) -> Self {
        RowValues::Decimal(value)
    }
}

impl From<Uuid> for RowValues {
    fn from(value: Uuid) -> Self {
        RowValues::Uuid(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Shape the key value(s) of a freshly inserted record into the caller's key type.
///
/// Scalars and `Option<scalar>` take a single-column key; tuples and `Vec<RowValues>` take
/// composite keys in declaration order.
pub trait FromKeyValues: Sized {
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` when the arity or value shape does not match.
    fn from_key_values(values: Vec<RowValues>) -> Result<Self, SqlCrudError>;
}

fn single(mut values: Vec<RowValues>) -> Result<RowValues, SqlCrudError> {
    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Err(SqlCrudError::ConversionError(format!(
            "expected a single key value, found {}",
            values.len()
        )))
    }
}

macro_rules! impl_scalar_key {
    ($($ty:ty),*) => {
        $(
            impl FromKeyValues for $ty {
                fn from_key_values(values: Vec<RowValues>) -> Result<Self, SqlCrudError> {
                    <$ty>::from_sql_value(&single(values)?)
                }
            }
        )*
    };
}

impl_scalar_key!(i16, i32, i64, u32, u64, String, Uuid, RowValues);

impl<T: FromSqlValue> FromKeyValues for Option<T> {
    fn from_key_values(values: Vec<RowValues>) -> Result<Self, SqlCrudError> {
        Option::<T>::from_sql_value(&single(values)?)
    }
}

/// Discards the key; for keyless models or when the caller does not need it.
impl FromKeyValues for () {
    fn from_key_values(_values: Vec<RowValues>) -> Result<Self, SqlCrudError> {
        Ok(())
    }
}

impl FromKeyValues for Vec<RowValues> {
    fn from_key_values(values: Vec<RowValues>) -> Result<Self, SqlCrudError> {
        Ok(values)
    }
}

impl<A: FromSqlValue, B: FromSqlValue> FromKeyValues for (A, B) {
    fn from_key_values(values: Vec<RowValues>) -> Result<Self, SqlCrudError> {
        match values.as_slice() {
            [a, b] => Ok((A::from_sql_value(a)?, B::from_sql_value(b)?)),
            _ => Err(SqlCrudError::ConversionError(format!(
                "expected two key values, found {}",
                values.len()
            ))),
        }
    }
}

impl<A: FromSqlValue, B: FromSqlValue, C: FromSqlValue> FromKeyValues for (A, B, C) {
    fn from_key_values(values: Vec<RowValues>) -> Result<Self, SqlCrudError> {
        match values.as_slice() {
            [a, b, c] => Ok((
                A::from_sql_value(a)?,
                B::from_sql_value(b)?,
                C::from_sql_value(c)?,
            )),
            _ => Err(SqlCrudError::ConversionError(format!(
                "expected three key values, found {}",
                values.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_narrow_with_range_check() {
        assert_eq!(i32::from_sql_value(&RowValues::Int(42)).unwrap(), 42);
        assert!(i16::from_sql_value(&RowValues::Int(i64::from(i32::MAX))).is_err());
        assert!(i32::from_sql_value(&RowValues::Null).is_err());
    }

    #[test]
    fn options_absorb_null() {
        assert_eq!(Option::<String>::from_sql_value(&RowValues::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_sql_value(&RowValues::Text("x".into())).unwrap(),
            Some("x".to_string())
        );
        assert_eq!(RowValues::from(None::<i32>), RowValues::Null);
    }

    #[test]
    fn arrays_round_trip_elementwise() {
        let bound = RowValues::from(vec![3_i32, 4]);
        assert_eq!(
            bound,
            RowValues::Array(vec![RowValues::Int(3), RowValues::Int(4)])
        );
        assert_eq!(Vec::<i32>::from_sql_value(&bound).unwrap(), vec![3, 4]);
    }

    #[test]
    fn uuid_reads_from_text() {
        let id = Uuid::now_v7();
        let text = RowValues::Text(id.to_string());
        assert_eq!(Uuid::from_sql_value(&text).unwrap(), id);
    }

    #[test]
    fn key_arity_is_checked() {
        assert_eq!(i64::from_key_values(vec![RowValues::Int(5)]).unwrap(), 5);
        assert!(i64::from_key_values(vec![RowValues::Int(1), RowValues::Int(2)]).is_err());
        let (a, b): (i32, i32) =
            FromKeyValues::from_key_values(vec![RowValues::Int(1), RowValues::Int(2)]).unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn decimals_read_exactly_from_text_and_numbers() {
        let price: Decimal = "12.34".parse().unwrap();
        assert_eq!(Decimal::from_sql_value(&RowValues::Text("12.34".into())).unwrap(), price);
        assert_eq!(Decimal::from_sql_value(&RowValues::Decimal(price)).unwrap(), price);
        assert_eq!(Decimal::from_sql_value(&RowValues::Int(3)).unwrap(), Decimal::from(3));
        assert_eq!(f64::from_sql_value(&RowValues::Decimal(price)).unwrap(), 12.34);
        assert!(Decimal::from_sql_value(&RowValues::Text("abc".into())).is_err());
    }

    #[test]
    fn times_offsets_and_intervals() {
        let t = NaiveTime::from_hms_milli_opt(8, 30, 0, 500).unwrap();
        assert_eq!(RowValues::from(t), RowValues::Time(t));
        assert_eq!(
            NaiveTime::from_sql_value(&RowValues::Text("08:30:00.500".into())).unwrap(),
            t
        );

        let at = DateTime::parse_from_rfc3339("2026-10-18T08:30:00+02:00").unwrap();
        let text = RowValues::Text(at.to_rfc3339());
        assert_eq!(DateTime::<FixedOffset>::from_sql_value(&text).unwrap(), at);
        assert_eq!(
            DateTime::<Utc>::from_sql_value(&RowValues::from(at)).unwrap(),
            at.with_timezone(&Utc)
        );
        // naive storage is read back as UTC
        let naive = RowValues::Text("2026-10-18 06:30:00".into());
        assert_eq!(DateTime::<FixedOffset>::from_sql_value(&naive).unwrap(), at);

        let span = TimeDelta::minutes(90);
        assert_eq!(TimeDelta::from_sql_value(&RowValues::from(span)).unwrap(), span);
        assert_eq!(
            TimeDelta::from_sql_value(&RowValues::Int(5_400_000_000)).unwrap(),
            span
        );
    }
}
