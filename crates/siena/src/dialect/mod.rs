//! SQL dialects.
//!
//! A [`Dialect`] decides placeholder style, literal syntax, type names and
//! per-function rendering. Dialects are swapped by configuration on
//! [`Database`](crate::database::Database); expressions never hard-code
//! dialect-specific SQL.

mod ansi;
mod db2;
mod postgres;

pub use ansi::AnsiDialect;
pub use db2::Db2Dialect;
pub use postgres::PostgresDialect;

use crate::error::{QueryError, QueryResult};
use crate::expr::function::FunctionCall;
use crate::expr::SqlWriter;
use crate::scope::Scope;
use crate::value::SqlValue;

/// The logical name of a SQL function, used to look up dialect overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionName(pub &'static str);

impl FunctionName {
    /// The lowercase SQL spelling of the function.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for FunctionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Dialect-specific rendering of one function.
///
/// The renderer writes both SQL text and bind arguments through the same
/// [`SqlWriter`], so a dialect that reorders or synthesizes arguments cannot
/// desynchronize text and binds; the renderer is the single source of truth
/// for bind order.
pub trait FunctionRenderer: Send + Sync {
    /// Render the call, recursing into its arguments as needed.
    fn render(&self, call: &FunctionCall, scope: &Scope<'_>, w: &mut SqlWriter<'_>)
    -> QueryResult<()>;
}

/// How a dialect spells string concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatStyle {
    /// `a || b`
    Operator,
    /// `concat(a, b)`
    Function,
}

/// Target types for CAST expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Char(u32),
    Varchar(u32),
    Date,
    Time,
    Timestamp,
}

/// A pluggable strategy object defining how SQL renders for one database
/// product. Defaults follow ANSI SQL.
pub trait Dialect: Send + Sync {
    /// Dialect name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Bind-parameter placeholder for the 1-based `index`.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    /// Inline literal syntax for a value.
    fn literal(&self, value: &SqlValue) -> QueryResult<String> {
        default_literal(value)
    }

    /// Dialect-specific renderer for a function, if it deviates from the
    /// default `name(arg, ...)` form.
    fn function(&self, name: FunctionName) -> Option<&dyn FunctionRenderer> {
        let _ = name;
        None
    }

    /// Concatenation spelling.
    fn concat_style(&self) -> ConcatStyle {
        ConcatStyle::Operator
    }

    /// Type name for CAST targets.
    fn type_name(&self, ty: &DbType) -> String {
        default_type_name(ty)
    }

    /// Selectivity hint appended to a comparison, where supported.
    fn selectivity_clause(&self, selectivity: f64) -> Option<String> {
        let _ = selectivity;
        None
    }

    /// Row-limiting clause, rendered after ORDER BY.
    fn fetch_clause(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut clause = String::new();
        if let Some(offset) = offset {
            clause.push_str(&format!(" offset {offset} rows"));
        }
        if let Some(limit) = limit {
            clause.push_str(&format!(" fetch first {limit} rows only"));
        }
        clause
    }
}

/// Functions rendered without parentheses when called with no arguments.
const NO_PAREN_FUNCTIONS: &[&str] = &[
    "current_date",
    "current_time",
    "current_timestamp",
    "localtime",
    "localtimestamp",
    "current_user",
];

pub(crate) fn is_no_paren(name: &str) -> bool {
    NO_PAREN_FUNCTIONS.contains(&name)
}

pub(crate) fn default_type_name(ty: &DbType) -> String {
    match ty {
        DbType::SmallInt => "smallint".to_string(),
        DbType::Integer => "integer".to_string(),
        DbType::BigInt => "bigint".to_string(),
        DbType::Real => "real".to_string(),
        DbType::DoublePrecision => "double precision".to_string(),
        DbType::Char(n) => format!("char({n})"),
        DbType::Varchar(n) => format!("varchar({n})"),
        DbType::Date => "date".to_string(),
        DbType::Time => "time".to_string(),
        DbType::Timestamp => "timestamp".to_string(),
    }
}

pub(crate) fn default_literal(value: &SqlValue) -> QueryResult<String> {
    Ok(match value {
        SqlValue::Null => "null".to_string(),
        SqlValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
        SqlValue::SmallInt(v) => v.to_string(),
        SqlValue::Integer(v) => v.to_string(),
        SqlValue::BigInt(v) => v.to_string(),
        SqlValue::Real(v) => v.to_string(),
        SqlValue::Double(v) => v.to_string(),
        SqlValue::Text(s) => quote_string(s),
        SqlValue::Bytes(b) => {
            let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
            format!("X'{hex}'")
        }
        SqlValue::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
        SqlValue::Time(t) => format!("TIME '{}'", t.format("%H:%M:%S")),
        SqlValue::Timestamp(ts) => format!("TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        SqlValue::TimestampTz(ts) => {
            format!("TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f %:z"))
        }
        SqlValue::Uuid(u) => format!("'{u}'"),
        SqlValue::Json(j) => {
            let text = serde_json::to_string(j)
                .map_err(|e| QueryError::invalid_argument(format!("unrenderable JSON: {e}")))?;
            quote_string(&text)
        }
    })
}

pub(crate) fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn literals() {
        assert_eq!(default_literal(&SqlValue::Null).unwrap(), "null");
        assert_eq!(default_literal(&SqlValue::BigInt(42)).unwrap(), "42");
        assert_eq!(
            default_literal(&SqlValue::Text("O'Brien".to_string())).unwrap(),
            "'O''Brien'"
        );
        let date = NaiveDate::from_ymd_opt(2013, 9, 14).unwrap();
        assert_eq!(
            default_literal(&SqlValue::Date(date)).unwrap(),
            "DATE '2013-09-14'"
        );
    }

    #[test]
    fn ansi_fetch_clause() {
        let dialect = AnsiDialect;
        assert_eq!(dialect.fetch_clause(None, None), "");
        assert_eq!(
            dialect.fetch_clause(Some(10), Some(20)),
            " offset 20 rows fetch first 10 rows only"
        );
    }
}
