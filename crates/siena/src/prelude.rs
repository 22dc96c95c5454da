//! Convenience re-exports for writing queries.

pub use crate::client::GenericClient;
pub use crate::database::Database;
pub use crate::dialect::{AnsiDialect, Db2Dialect, PostgresDialect};
pub use crate::error::{QueryError, QueryResult};
pub use crate::expr::boolean::BooleanExpr;
pub use crate::expr::builder::cond;
pub use crate::expr::case::case;
pub use crate::expr::cast::cast;
pub use crate::expr::function::{
    avg, coalesce, count, count_big, count_distinct, count_of, max, min, sum,
};
pub use crate::expr::scalar::{
    current_date, current_timestamp, day, instr, length, lower, month, substr, upper, year,
};
pub use crate::expr::tuple::{Comma, Projection};
pub use crate::expr::{literal, value, IntoExpr, TypedExpr};
pub use crate::row::{FromRow, Row};
pub use crate::stmt::select::{exists, not_exists};
pub use crate::stmt::Order;
pub use crate::table::{Alias, Column, Table, ToRow};
pub use crate::value::{FromValue, SqlValue, ToValue};

#[cfg(feature = "derive")]
pub use siena_derive::Table;
