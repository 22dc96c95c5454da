//! Scalar function families: string, numeric, date/time.

use super::function::{sql_function, unary_function};
use super::{IntoExpr, TypedExpr};
use chrono::{DateTime, NaiveDate, Utc};

// ---- string functions ----

/// `upper(s)`
pub fn upper(s: impl IntoExpr<String>) -> TypedExpr<String> {
    unary_function("upper", s)
}

/// `lower(s)`
pub fn lower(s: impl IntoExpr<String>) -> TypedExpr<String> {
    unary_function("lower", s)
}

/// `length(s)`
pub fn length(s: impl IntoExpr<String>) -> TypedExpr<i32> {
    sql_function("length", vec![s.into_expr().into_kind()])
}

/// `substr(s, start)`
pub fn substr(s: impl IntoExpr<String>, start: impl IntoExpr<i32>) -> TypedExpr<String> {
    sql_function(
        "substr",
        vec![s.into_expr().into_kind(), start.into_expr().into_kind()],
    )
}

/// `substr(s, start, length)`
pub fn substring(
    s: impl IntoExpr<String>,
    start: impl IntoExpr<i32>,
    length: impl IntoExpr<i32>,
) -> TypedExpr<String> {
    sql_function(
        "substr",
        vec![
            s.into_expr().into_kind(),
            start.into_expr().into_kind(),
            length.into_expr().into_kind(),
        ],
    )
}

/// `instr(string, substring)`: 1-based position of `needle` in `haystack`,
/// or zero. Dialects without `instr` rewrite it (Postgres renders
/// `position(needle in haystack)`, reordering the binds).
pub fn instr(haystack: impl IntoExpr<String>, needle: impl IntoExpr<String>) -> TypedExpr<i32> {
    sql_function(
        "instr",
        vec![haystack.into_expr().into_kind(), needle.into_expr().into_kind()],
    )
}

// ---- numeric functions ----

/// `abs(x)`
pub fn abs<T>(x: impl IntoExpr<T>) -> TypedExpr<T> {
    unary_function("abs", x)
}

/// `exp(x)`
pub fn exp<T>(x: impl IntoExpr<T>) -> TypedExpr<f64> {
    sql_function("exp", vec![x.into_expr().into_kind()])
}

/// `ln(x)`
pub fn ln<T>(x: impl IntoExpr<T>) -> TypedExpr<f64> {
    sql_function("ln", vec![x.into_expr().into_kind()])
}

/// `floor(x)`
pub fn floor<T>(x: impl IntoExpr<T>) -> TypedExpr<T> {
    unary_function("floor", x)
}

/// `ceil(x)`
pub fn ceil<T>(x: impl IntoExpr<T>) -> TypedExpr<T> {
    unary_function("ceil", x)
}

// ---- date/time functions ----

/// `current_date`
pub fn current_date() -> TypedExpr<NaiveDate> {
    sql_function("current_date", Vec::new())
}

/// `current_timestamp`
pub fn current_timestamp() -> TypedExpr<DateTime<Utc>> {
    sql_function("current_timestamp", Vec::new())
}

/// `year(d)`; rendered as `extract(year from d)` where the dialect has no
/// `year` function.
pub fn year<T>(d: impl IntoExpr<T>) -> TypedExpr<i32> {
    sql_function("year", vec![d.into_expr().into_kind()])
}

/// `month(d)`
pub fn month<T>(d: impl IntoExpr<T>) -> TypedExpr<i32> {
    sql_function("month", vec![d.into_expr().into_kind()])
}

/// `day(d)`
pub fn day<T>(d: impl IntoExpr<T>) -> TypedExpr<i32> {
    sql_function("day", vec![d.into_expr().into_kind()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{AnsiDialect, PostgresDialect};
    use crate::expr::value;
    use crate::scope::Scope;
    use crate::value::SqlValue;

    #[test]
    fn string_functions_render_by_name() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        assert_eq!(upper(value("x")).sql(&scope).unwrap(), "upper(?)");
        assert_eq!(
            substring(value("x"), value(1i32), value(2i32)).sql(&scope).unwrap(),
            "substr(?, ?, ?)"
        );
    }

    #[test]
    fn no_paren_functions_render_bare() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        assert_eq!(current_date().sql(&scope).unwrap(), "current_date");
        assert_eq!(
            current_timestamp().sql(&scope).unwrap(),
            "current_timestamp"
        );
    }

    #[test]
    fn year_extracts_on_postgres() {
        let pg = PostgresDialect::new();
        let scope = Scope::new(&pg);
        let date = chrono::NaiveDate::from_ymd_opt(2013, 9, 14).unwrap();
        let expr = year(value(date));
        assert_eq!(expr.sql(&scope).unwrap(), "extract(year from $1)");
    }

    #[test]
    fn instr_reorders_binds_on_postgres() {
        let pg = PostgresDialect::new();
        let scope = Scope::new(&pg);
        let expr = instr(value("haystack"), value("needle"));
        assert_eq!(expr.sql(&scope).unwrap(), "position($1 in $2)");
        // Bind order follows the rendered text, not declaration order.
        assert_eq!(
            expr.args(&scope).unwrap(),
            vec![
                SqlValue::Text("needle".to_string()),
                SqlValue::Text("haystack".to_string())
            ]
        );
    }
}
