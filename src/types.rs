use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Values bound as statement parameters or read back from result rows.
///
/// Every executor speaks this one enum, so the statement generator never branches on driver
/// types:
/// ```rust
/// use sql_crud::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// Timestamp with a UTC offset
    TimestampTz(DateTime<FixedOffset>),
    /// Time of day
    Time(NaiveTime),
    /// Duration, stored as an interval or a microsecond count
    Interval(TimeDelta),
    /// Exact decimal number
    Decimal(Decimal),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// GUID value
    Uuid(Uuid),
    /// One-dimensional array of simple values (PostgreSQL only)
    Array(Vec<RowValues>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(value) => Some(*value),
            RowValues::Int(1) => Some(true),
            RowValues::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let RowValues::TimestampTz(value) = self {
            return Some(value.naive_utc());
        } else if let Some(s) = self.as_text() {
            // sqlite hands timestamps back as text
            for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(dt);
                }
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            RowValues::Decimal(value) => f64::try_from(*value).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            RowValues::Uuid(id) => Some(*id),
            RowValues::Text(s) => Uuid::parse_str(s).ok(),
            RowValues::Blob(bytes) => Uuid::from_slice(bytes).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[RowValues]> {
        if let RowValues::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// True for the values an auto-generated key carries before the database assigns one.
    #[must_use]
    pub(crate) fn is_unassigned_key(&self) -> bool {
        match self {
            RowValues::Null | RowValues::Int(0) => true,
            RowValues::Uuid(id) => id.is_nil(),
            _ => false,
        }
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "int",
            RowValues::Float(_) => "float",
            RowValues::Text(_) => "text",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::TimestampTz(_) => "timestamptz",
            RowValues::Time(_) => "time",
            RowValues::Interval(_) => "interval",
            RowValues::Decimal(_) => "decimal",
            RowValues::Null => "null",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "blob",
            RowValues::Uuid(_) => "uuid",
            RowValues::Array(_) => "array",
        }
    }
}
