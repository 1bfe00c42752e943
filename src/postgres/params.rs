use std::error::Error;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, to_sql_checked};
use tokio_util::bytes::{self, BufMut};

use crate::types::RowValues;

/// Borrowed Postgres parameters, in placeholder order.
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let mut references = Vec::with_capacity(params.len());
        for p in params {
            references.push(p as &(dyn ToSql + Sync));
        }
        Params { references }
    }

    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

/// Values are written in the column's own wire type: integers narrow to `INT2`/`INT4` (erroring
/// on overflow) or widen to floats, text binds to `UUID` and `NUMERIC` columns by parsing, and
/// naive timestamps bind to `TIMESTAMPTZ` as UTC and to `DATE` by their date part. Floats bind
/// to `NUMERIC` through their shortest decimal form.
impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql_checked(ty, out),
                Type::BOOL => (*i != 0).to_sql_checked(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql_checked(ty, out),
                _ => i.to_sql_checked(ty, out),
            },
            RowValues::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql_checked(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)?.to_sql_checked(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            RowValues::Text(s) => match *ty {
                Type::UUID => uuid::Uuid::parse_str(s)?.to_sql_checked(ty, out),
                Type::NUMERIC => s.parse::<Decimal>()?.to_sql_checked(ty, out),
                _ => s.to_sql_checked(ty, out),
            },
            RowValues::Decimal(d) => match *ty {
                Type::FLOAT4 => f32::try_from(*d)?.to_sql_checked(ty, out),
                Type::FLOAT8 => f64::try_from(*d)?.to_sql_checked(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR => d.to_string().to_sql_checked(ty, out),
                _ => d.to_sql_checked(ty, out),
            },
            RowValues::Bool(b) => b.to_sql_checked(ty, out),
            RowValues::Timestamp(dt) => match *ty {
                Type::TIMESTAMPTZ => {
                    DateTime::<Utc>::from_naive_utc_and_offset(*dt, Utc).to_sql_checked(ty, out)
                }
                Type::DATE => dt.date().to_sql_checked(ty, out),
                _ => dt.to_sql_checked(ty, out),
            },
            RowValues::TimestampTz(dt) => match *ty {
                Type::TIMESTAMP => dt.naive_utc().to_sql_checked(ty, out),
                _ => dt.to_sql_checked(ty, out),
            },
            RowValues::Time(t) => t.to_sql_checked(ty, out),
            RowValues::Interval(d) => match *ty {
                Type::INTERVAL => {
                    write_interval(*d, out)?;
                    Ok(IsNull::No)
                }
                _ => interval_micros(*d)?.to_sql_checked(ty, out),
            },
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => jsval.to_sql_checked(ty, out),
            RowValues::Blob(bytes) => bytes.to_sql_checked(ty, out),
            RowValues::Uuid(id) => id.to_sql_checked(ty, out),
            RowValues::Array(items) => items.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        if let Kind::Array(member) = ty.kind() {
            return Self::accepts(member);
        }
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::TIME
                | Type::INTERVAL
                | Type::NUMERIC
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
                | Type::UUID
        )
    }

    to_sql_checked!();
}

fn interval_micros(d: TimeDelta) -> Result<i64, Box<dyn Error + Sync + Send>> {
    Ok(d.num_microseconds().ok_or("interval overflows microseconds")?)
}

/// Binary `INTERVAL`: microseconds, then days and months, which stay zero.
fn write_interval(
    d: TimeDelta,
    out: &mut bytes::BytesMut,
) -> Result<(), Box<dyn Error + Sync + Send>> {
    out.put_i64(interval_micros(d)?);
    out.put_i32(0);
    out.put_i32(0);
    Ok(())
}
