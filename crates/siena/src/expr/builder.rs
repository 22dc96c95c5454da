//! Comparison builders.
//!
//! [`ExpressionBuilder`] closes over a left-hand expression and a
//! continuation; each `is_*` method completes a condition and threads the
//! resulting [`BooleanExpr`] through the continuation, handing control back
//! to the caller's fluent state (a statement's WHERE clause, a CASE `when`,
//! or a plain `QueryResult<BooleanExpr>` via [`cond`]).

use super::boolean::BooleanExpr;
use super::condition::Condition;
use super::precedence::Precedence;
use super::{ExprKind, IntoExpr, SqlWriter, TypedExpr};
use crate::error::{QueryError, QueryResult};
use crate::scope::Scope;
use crate::stmt::select::SelectCore;
use crate::value::SqlValue;

/// A sub-select usable as the right-hand side of `in (select ...)`, producing
/// values of type `T`.
pub trait IntoSubquery<T> {
    fn into_core(self) -> SelectCore;
}

/// Builds one comparison against a fixed left-hand side, then returns to the
/// fluent state `N`.
pub struct ExpressionBuilder<T, N> {
    lhs: TypedExpr<T>,
    on_complete: Box<dyn FnOnce(QueryResult<BooleanExpr>) -> N>,
    selectivity: Option<f64>,
}

impl<T, N> ExpressionBuilder<T, N> {
    /// Wrap a left-hand side and the continuation that consumes the finished
    /// boolean expression.
    pub fn new(
        lhs: TypedExpr<T>,
        on_complete: impl FnOnce(QueryResult<BooleanExpr>) -> N + 'static,
    ) -> Self {
        Self {
            lhs,
            on_complete: Box::new(on_complete),
            selectivity: None,
        }
    }

    /// Record a selectivity hint; rendered only by dialects that support it.
    pub fn with_selectivity(mut self, selectivity: f64) -> Self {
        self.selectivity = Some(selectivity);
        self
    }

    /// Render the left-hand side (builders are transparent wrappers).
    pub fn sql(&self, scope: &Scope<'_>) -> QueryResult<String> {
        self.lhs.sql(scope)
    }

    /// The left-hand side's args.
    pub fn args(&self, scope: &Scope<'_>) -> QueryResult<Vec<SqlValue>> {
        self.lhs.args(scope)
    }

    /// The left-hand side's precedence.
    pub fn precedence(&self) -> Precedence {
        self.lhs.precedence()
    }

    /// The left-hand side's default label.
    pub fn label(&self, scope: &Scope<'_>) -> QueryResult<String> {
        self.lhs.label(scope)
    }

    /// Render the left-hand side into a writer.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        self.lhs.build(scope, w)
    }

    fn complete(self, condition: QueryResult<Condition>) -> N {
        let lhs = self.lhs.kind;
        (self.on_complete)(condition.map(|c| c.against(lhs)))
    }

    fn op(self, op: &'static str, rhs: impl IntoExpr<T>) -> N {
        let selectivity = self.selectivity;
        self.complete(Ok(Condition::Op {
            op,
            rhs: rhs.into_expr().kind,
            selectivity,
        }))
    }

    /// `lhs = rhs`
    pub fn is_equal_to(self, rhs: impl IntoExpr<T>) -> N {
        self.op("=", rhs)
    }

    /// `lhs <> rhs`
    pub fn is_not_equal_to(self, rhs: impl IntoExpr<T>) -> N {
        self.op("<>", rhs)
    }

    /// `lhs > rhs`
    pub fn is_greater_than(self, rhs: impl IntoExpr<T>) -> N {
        self.op(">", rhs)
    }

    /// `lhs < rhs`
    pub fn is_less_than(self, rhs: impl IntoExpr<T>) -> N {
        self.op("<", rhs)
    }

    /// `lhs >= rhs`
    pub fn is_greater_than_or_equal_to(self, rhs: impl IntoExpr<T>) -> N {
        self.op(">=", rhs)
    }

    /// `lhs <= rhs`
    pub fn is_less_than_or_equal_to(self, rhs: impl IntoExpr<T>) -> N {
        self.op("<=", rhs)
    }

    fn op_in<V: IntoExpr<T>>(self, op: &'static str, values: impl IntoIterator<Item = V>) -> N {
        let values: Vec<ExprKind> = values.into_iter().map(|v| v.into_expr().kind).collect();
        if values.is_empty() {
            return self.complete(Err(QueryError::invalid_argument(
                "At least one value is required for an IN expression.",
            )));
        }
        self.complete(Ok(Condition::In { op, values }))
    }

    /// `lhs in (v1, ...)`; rejects an empty value list.
    pub fn is_in<V: IntoExpr<T>>(self, values: impl IntoIterator<Item = V>) -> N {
        self.op_in("in", values)
    }

    /// `lhs not in (v1, ...)`; rejects an empty value list.
    pub fn is_not_in<V: IntoExpr<T>>(self, values: impl IntoIterator<Item = V>) -> N {
        self.op_in("not in", values)
    }

    /// `lhs in (select ...)`
    pub fn is_in_select(self, select: impl IntoSubquery<T>) -> N {
        let core = Box::new(select.into_core());
        self.complete(Ok(Condition::InSelect {
            op: "in",
            select: core,
        }))
    }

    /// `lhs not in (select ...)`
    pub fn is_not_in_select(self, select: impl IntoSubquery<T>) -> N {
        let core = Box::new(select.into_core());
        self.complete(Ok(Condition::InSelect {
            op: "not in",
            select: core,
        }))
    }

    /// `lhs is null`
    pub fn is_null(self) -> N {
        self.complete(Ok(Condition::Null { negated: false }))
    }

    /// `lhs is not null`
    pub fn is_not_null(self) -> N {
        self.complete(Ok(Condition::Null { negated: true }))
    }

    /// `lhs like pattern`
    pub fn is_like(self, pattern: impl IntoExpr<T>) -> N {
        self.complete_like("like", pattern, None)
    }

    /// `lhs like pattern escape '...'`
    pub fn is_like_escape(self, pattern: impl IntoExpr<T>, escape: impl Into<String>) -> N {
        let escape = escape.into();
        self.complete_like("like", pattern, Some(escape))
    }

    /// `lhs not like pattern`
    pub fn is_not_like(self, pattern: impl IntoExpr<T>) -> N {
        self.complete_like("not like", pattern, None)
    }

    /// `lhs not like pattern escape '...'`
    pub fn is_not_like_escape(self, pattern: impl IntoExpr<T>, escape: impl Into<String>) -> N {
        let escape = escape.into();
        self.complete_like("not like", pattern, Some(escape))
    }

    fn complete_like(self, op: &'static str, pattern: impl IntoExpr<T>, escape: Option<String>) -> N {
        self.complete(Ok(Condition::Like {
            op,
            pattern: pattern.into_expr().kind,
            escape,
        }))
    }

    /// First half of `lhs between low and high`; only
    /// [`BetweenBuilder::and`] completes the expression.
    pub fn is_between(self, low: impl IntoExpr<T>) -> BetweenBuilder<T, N> {
        BetweenBuilder {
            lhs: self.lhs,
            on_complete: self.on_complete,
            low: low.into_expr().kind,
            negated: false,
        }
    }

    /// First half of `lhs not between low and high`.
    pub fn is_not_between(self, low: impl IntoExpr<T>) -> BetweenBuilder<T, N> {
        BetweenBuilder {
            lhs: self.lhs,
            on_complete: self.on_complete,
            low: low.into_expr().kind,
            negated: true,
        }
    }
}

/// Second half of the BETWEEN two-step protocol. There is no way to obtain a
/// boolean expression from this type except [`BetweenBuilder::and`].
pub struct BetweenBuilder<T, N> {
    lhs: TypedExpr<T>,
    on_complete: Box<dyn FnOnce(QueryResult<BooleanExpr>) -> N>,
    low: ExprKind,
    negated: bool,
}

impl<T, N> BetweenBuilder<T, N> {
    /// Supply the upper bound and complete the expression.
    pub fn and(self, high: impl IntoExpr<T>) -> N {
        let condition = Condition::Between {
            negated: self.negated,
            low: self.low,
            high: high.into_expr().kind,
        };
        (self.on_complete)(Ok(condition.against(self.lhs.kind)))
    }
}

/// Start a stand-alone comparison; the continuation is the identity, so the
/// `is_*` method returns the finished `QueryResult<BooleanExpr>` directly.
pub fn cond<T, L: IntoExpr<T>>(lhs: L) -> ExpressionBuilder<T, QueryResult<BooleanExpr>> {
    ExpressionBuilder::new(lhs.into_expr(), |result| result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{AnsiDialect, Db2Dialect};
    use crate::expr::value;
    use crate::scope::Scope;

    #[test]
    fn comparison_renders_lhs_op_rhs() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = cond(value(1i64)).is_less_than(2i64).unwrap();
        assert_eq!(expr.sql(&scope).unwrap(), "? < ?");
        assert_eq!(
            expr.args(&scope).unwrap(),
            vec![SqlValue::BigInt(1), SqlValue::BigInt(2)]
        );
    }

    #[test]
    fn empty_in_list_is_rejected_before_any_sql_exists() {
        let result = cond(value(1i64)).is_in(Vec::<i64>::new());
        let err = result.unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
        assert!(
            err.to_string()
                .contains("At least one value is required for an IN expression.")
        );
    }

    #[test]
    fn in_list_renders_placeholders_in_order() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = cond(value(9i32)).is_in([1i32, 2, 3]).unwrap();
        assert_eq!(expr.sql(&scope).unwrap(), "? in (?, ?, ?)");
        assert_eq!(
            expr.args(&scope).unwrap(),
            vec![
                SqlValue::Integer(9),
                SqlValue::Integer(1),
                SqlValue::Integer(2),
                SqlValue::Integer(3)
            ]
        );
    }

    #[test]
    fn between_two_step_renders_bounds_in_order() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = cond(value(5i32)).is_between(1i32).and(10i32).unwrap();
        assert_eq!(expr.sql(&scope).unwrap(), "? between ? and ?");
        assert_eq!(
            expr.args(&scope).unwrap(),
            vec![
                SqlValue::Integer(5),
                SqlValue::Integer(1),
                SqlValue::Integer(10)
            ]
        );
    }

    #[test]
    fn not_between_renders_negated() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = cond(value(5i32)).is_not_between(1i32).and(10i32).unwrap();
        assert_eq!(expr.sql(&scope).unwrap(), "? not between ? and ?");
    }

    #[test]
    fn like_with_escape() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = cond(value("a_b".to_string()))
            .is_like_escape("a\\_b", "\\")
            .unwrap();
        assert_eq!(expr.sql(&scope).unwrap(), "? like ? escape '\\'");
    }

    #[test]
    fn selectivity_renders_only_where_supported() {
        let ansi = AnsiDialect;
        let db2 = Db2Dialect;
        let expr = cond(value(1i32))
            .with_selectivity(0.5)
            .is_equal_to(2i32)
            .unwrap();
        assert_eq!(expr.sql(&Scope::new(&ansi)).unwrap(), "? = ?");
        assert_eq!(expr.sql(&Scope::new(&db2)).unwrap(), "? = ? selectivity 0.5");
    }

    #[test]
    fn null_checks() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        assert_eq!(
            cond(value(1i32)).is_null().unwrap().sql(&scope).unwrap(),
            "? is null"
        );
        assert_eq!(
            cond(value(1i32)).is_not_null().unwrap().sql(&scope).unwrap(),
            "? is not null"
        );
    }
}
