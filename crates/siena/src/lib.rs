//! # siena
//!
//! A fluent, dialect-aware, type-safe SQL query builder.
//!
//! ## Features
//!
//! - **Typed columns**: queries are written against [`Column`] descriptors
//!   (usually generated by `#[derive(Table)]`), so a comparison against the
//!   wrong type fails to compile
//! - **Expression engine**: arithmetic, boolean composition, functions,
//!   CASE/CAST/COALESCE and sub-selects render with precedence-correct
//!   parenthesization, and bind arguments always match placeholder order
//! - **Deferred alias resolution**: column references resolve against the
//!   statement's aliases at render time, so self-joins disambiguate late
//! - **Dialects**: ANSI, PostgreSQL and DB2 renderings are swapped by
//!   configuration, down to per-function SQL
//! - **Row mapping**: every statement renders to a `(sql, args, row_mapper)`
//!   triple; projections compose scalar, tuple and whole-row mappers
//! - **Safe defaults**: DELETE requires WHERE, UPDATE requires SET
//!
//! ## Example
//!
//! ```ignore
//! use siena::prelude::*;
//!
//! #[derive(Table)]
//! #[table(name = "WIDGET", schema = "STORE")]
//! struct Widget {
//!     widget_id: i64,
//!     name: String,
//!     manufacturer_id: i64,
//! }
//!
//! let db = Database::new();
//! let prepared = db
//!     .from::<Widget>("w")
//!     .select(count().as_("n"))
//!     .where_(Widget::MANUFACTURER_ID)
//!     .is_equal_to(4002i64)
//!     .prepare()?;
//! assert_eq!(
//!     prepared.sql,
//!     "select count(*) as n from STORE.WIDGET w where w.MANUFACTURER_ID = ?"
//! );
//! # Ok::<(), siena::QueryError>(())
//! ```

pub mod client;
pub mod database;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod prelude;
pub mod row;
pub mod scope;
pub mod stmt;
pub mod table;
pub mod value;

pub use client::{decode_row, GenericClient};
pub use database::Database;
pub use dialect::{
    AnsiDialect, ConcatStyle, Db2Dialect, DbType, Dialect, FunctionName, FunctionRenderer,
    PostgresDialect,
};
pub use error::{QueryError, QueryResult};
pub use expr::boolean::{BooleanExpr, BooleanExprChain, OrChain};
pub use expr::builder::{cond, BetweenBuilder, ExpressionBuilder, IntoSubquery};
pub use expr::case::{case, CaseExpr, CaseWhen, CaseWhenNext};
pub use expr::cast::{cast, CastBuilder};
pub use expr::condition::Condition;
pub use expr::function::{
    avg, coalesce, count, count_big, count_big_distinct, count_big_of, count_distinct, count_of,
    max, min, sql_function, sum, unary_function, Coalesce, FunctionCall,
};
pub use expr::json::{json_array, json_object, jsonb_object, key_value, JsonKeyValue};
pub use expr::label::LabelGenerator;
pub use expr::precedence::Precedence;
pub use expr::scalar::{
    abs, ceil, current_date, current_timestamp, day, exp, floor, instr, length, ln, lower, month,
    substr, substring, upper, year,
};
pub use expr::tuple::{Comma, Labeled, Projection};
pub use expr::{literal, value, ExprKind, IntoExpr, SqlWriter, TypedExpr};
pub use row::{FromRow, Row, RowMapper, RowMapperFactory};
pub use scope::{AliasBinding, Scope};
pub use stmt::delete::{Delete, DeleteWhere};
pub use stmt::insert::Insert;
pub use stmt::select::{
    exists, exists_where, not_exists, not_exists_where, JoinKind, JoinOn, Select, SelectCore,
    SelectHaving, SelectWhere, TableProjection,
};
pub use stmt::update::{Update, UpdateWhere};
pub use stmt::{Order, Prepared};
pub use table::{Alias, AliasedColumn, Column, Table, ToRow};
pub use value::{FromValue, SqlValue, ToValue};

#[cfg(feature = "derive")]
pub use siena_derive::Table;

// Lets code generated by `#[derive(Table)]` resolve `::siena` paths from
// this crate's own tests.
#[cfg(test)]
extern crate self as siena;
