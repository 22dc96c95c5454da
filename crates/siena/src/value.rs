//! Dynamically-typed SQL values.
//!
//! [`SqlValue`] is the owned representation used for both bind arguments and
//! decoded result-row cells, so rendered statements can be inspected and
//! compared in tests without a live connection.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QueryError, QueryResult};

/// A dynamically-typed SQL value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// NULL value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 16-bit signed integer
    SmallInt(i16),

    /// 32-bit signed integer
    Integer(i32),

    /// 64-bit signed integer
    BigInt(i64),

    /// 32-bit floating point
    Real(f32),

    /// 64-bit floating point
    Double(f64),

    /// Text string
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Timestamp without timezone
    Timestamp(NaiveDateTime),

    /// Timestamp with timezone (UTC)
    TimestampTz(DateTime<Utc>),

    /// UUID
    Uuid(Uuid),

    /// JSON value
    Json(serde_json::Value),
}

impl SqlValue {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Get the SQL type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Boolean(_) => "boolean",
            SqlValue::SmallInt(_) => "smallint",
            SqlValue::Integer(_) => "integer",
            SqlValue::BigInt(_) => "bigint",
            SqlValue::Real(_) => "real",
            SqlValue::Double(_) => "double precision",
            SqlValue::Text(_) => "varchar",
            SqlValue::Bytes(_) => "bytea",
            SqlValue::Date(_) => "date",
            SqlValue::Time(_) => "time",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamp with time zone",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Json(_) => "json",
        }
    }
}

/// Conversion of a Rust value into a [`SqlValue`] bind argument.
///
/// The associated `SqlTy` names the canonical expression type the value maps
/// to (`String` for `&str`), which is what typed expressions carry as their
/// result-type parameter.
pub trait ToValue {
    /// The canonical expression type for this value.
    type SqlTy;

    /// Convert into an owned [`SqlValue`].
    fn to_value(self) -> SqlValue;
}

macro_rules! impl_to_value {
    ($($rust:ty => $sql_ty:ty, $variant:ident, $conv:expr;)*) => {
        $(
            impl ToValue for $rust {
                type SqlTy = $sql_ty;

                fn to_value(self) -> SqlValue {
                    SqlValue::$variant($conv(self))
                }
            }
        )*
    };
}

impl_to_value! {
    bool => bool, Boolean, |v| v;
    i16 => i16, SmallInt, |v| v;
    i32 => i32, Integer, |v| v;
    i64 => i64, BigInt, |v| v;
    f32 => f32, Real, |v| v;
    f64 => f64, Double, |v| v;
    String => String, Text, |v| v;
    &str => String, Text, |v: &str| v.to_string();
    Vec<u8> => Vec<u8>, Bytes, |v| v;
    &[u8] => Vec<u8>, Bytes, |v: &[u8]| v.to_vec();
    NaiveDate => NaiveDate, Date, |v| v;
    NaiveTime => NaiveTime, Time, |v| v;
    NaiveDateTime => NaiveDateTime, Timestamp, |v| v;
    DateTime<Utc> => DateTime<Utc>, TimestampTz, |v| v;
    Uuid => Uuid, Uuid, |v| v;
    serde_json::Value => serde_json::Value, Json, |v| v;
}

impl<T: ToValue> ToValue for Option<T> {
    type SqlTy = Option<T::SqlTy>;

    fn to_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_value(),
            None => SqlValue::Null,
        }
    }
}

/// Conversion of a decoded [`SqlValue`] row cell back into a Rust value.
pub trait FromValue: Sized {
    /// Convert from a row cell, reporting the column label on failure.
    fn from_value(value: &SqlValue, column: &str) -> QueryResult<Self>;
}

fn mismatch<T>(value: &SqlValue, column: &str, expected: &str) -> QueryResult<T> {
    Err(QueryError::decode(
        column,
        format!("expected {expected}, got {}", value.type_name()),
    ))
}

macro_rules! impl_from_value {
    ($($rust:ty, $expected:literal, { $($pat:pat => $out:expr),* $(,)? };)*) => {
        $(
            impl FromValue for $rust {
                fn from_value(value: &SqlValue, column: &str) -> QueryResult<Self> {
                    match value {
                        $($pat => $out,)*
                        other => mismatch(other, column, $expected),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool, "boolean", { SqlValue::Boolean(v) => Ok(*v) };
    i16, "smallint", { SqlValue::SmallInt(v) => Ok(*v) };
    i32, "integer", {
        SqlValue::SmallInt(v) => Ok(i32::from(*v)),
        SqlValue::Integer(v) => Ok(*v),
    };
    i64, "bigint", {
        SqlValue::SmallInt(v) => Ok(i64::from(*v)),
        SqlValue::Integer(v) => Ok(i64::from(*v)),
        SqlValue::BigInt(v) => Ok(*v),
    };
    f32, "real", { SqlValue::Real(v) => Ok(*v) };
    f64, "double precision", {
        SqlValue::Real(v) => Ok(f64::from(*v)),
        SqlValue::Double(v) => Ok(*v),
    };
    String, "varchar", { SqlValue::Text(v) => Ok(v.clone()) };
    Vec<u8>, "bytea", { SqlValue::Bytes(v) => Ok(v.clone()) };
    NaiveDate, "date", { SqlValue::Date(v) => Ok(*v) };
    NaiveTime, "time", { SqlValue::Time(v) => Ok(*v) };
    NaiveDateTime, "timestamp", { SqlValue::Timestamp(v) => Ok(*v) };
    DateTime<Utc>, "timestamp with time zone", { SqlValue::TimestampTz(v) => Ok(*v) };
    Uuid, "uuid", { SqlValue::Uuid(v) => Ok(*v) };
    serde_json::Value, "json", { SqlValue::Json(v) => Ok(v.clone()) };
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &SqlValue, column: &str) -> QueryResult<Self> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_value(other, column).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_value_scalars() {
        assert_eq!(4002i64.to_value(), SqlValue::BigInt(4002));
        assert_eq!("Bob".to_value(), SqlValue::Text("Bob".to_string()));
        assert_eq!(None::<i32>.to_value(), SqlValue::Null);
        assert_eq!(Some(7i32).to_value(), SqlValue::Integer(7));
    }

    #[test]
    fn from_value_widening() {
        assert_eq!(i64::from_value(&SqlValue::Integer(5), "c").unwrap(), 5);
        assert_eq!(i64::from_value(&SqlValue::SmallInt(5), "c").unwrap(), 5);
        assert_eq!(f64::from_value(&SqlValue::Real(1.5), "c").unwrap(), 1.5);
    }

    #[test]
    fn from_value_null_handling() {
        assert_eq!(Option::<String>::from_value(&SqlValue::Null, "c").unwrap(), None);
        let err = String::from_value(&SqlValue::Null, "name").unwrap_err();
        assert!(matches!(err, QueryError::Decode { column, .. } if column == "name"));
    }

    #[test]
    fn from_value_type_mismatch() {
        let err = bool::from_value(&SqlValue::Text("t".to_string()), "flag").unwrap_err();
        assert!(matches!(err, QueryError::Decode { .. }));
    }
}
