//! CASE expressions.
//!
//! `case(c1).then(r1).when(c2).then(r2).or_else(e)` builds
//! `case when c1 then r1 when c2 then r2 else e end`. All `then` arms share
//! the builder's type parameter, so branches of mismatched result type do
//! not construct.

use std::marker::PhantomData;

use super::boolean::BooleanExpr;
use super::label::LabelGenerator;
use super::{ExprKind, IntoExpr, SqlWriter, TypedExpr};
use crate::error::QueryResult;
use crate::scope::Scope;

/// The accumulated WHEN/THEN pairs of a CASE expression.
#[derive(Debug, Clone)]
pub struct CaseData {
    pub(crate) whens: Vec<(BooleanExpr, ExprKind)>,
    pub(crate) or_else: Option<Box<ExprKind>>,
    pub(crate) label: LabelGenerator,
}

impl CaseData {
    /// Render `case when ... then ... [else ...] end`; args flatten
    /// condition-then-result pairs in declared order, else-args last.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        w.push("case");
        for (condition, result) in &self.whens {
            w.push(" when ");
            condition.build(scope, w)?;
            w.push(" then ");
            result.build(scope, w)?;
        }
        if let Some(or_else) = &self.or_else {
            w.push(" else ");
            or_else.build(scope, w)?;
        }
        w.push(" end");
        Ok(())
    }
}

/// Start a CASE at its first WHEN condition.
pub fn case(condition: BooleanExpr) -> CaseWhen {
    CaseWhen { condition }
}

/// A first `when` awaiting its `then`.
#[derive(Debug, Clone)]
pub struct CaseWhen {
    condition: BooleanExpr,
}

impl CaseWhen {
    /// Supply the first branch result, fixing the CASE's type.
    pub fn then<T>(self, result: impl IntoExpr<T>) -> CaseExpr<T> {
        CaseExpr {
            data: CaseData {
                whens: vec![(self.condition, result.into_expr().kind)],
                or_else: None,
                label: LabelGenerator::new("case_"),
            },
            _type: PhantomData,
        }
    }
}

/// A CASE with at least one complete branch.
#[derive(Debug)]
pub struct CaseExpr<T> {
    data: CaseData,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for CaseExpr<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> CaseExpr<T> {
    /// Add another WHEN condition.
    pub fn when(self, condition: BooleanExpr) -> CaseWhenNext<T> {
        CaseWhenNext {
            case: self,
            condition,
        }
    }

    /// Finish with an ELSE branch.
    pub fn or_else(mut self, result: impl IntoExpr<T>) -> TypedExpr<T> {
        self.data.or_else = Some(Box::new(result.into_expr().kind));
        TypedExpr::new(ExprKind::Case(self.data))
    }

    /// Finish without an ELSE branch.
    pub fn end(self) -> TypedExpr<T> {
        TypedExpr::new(ExprKind::Case(self.data))
    }
}

impl<T> IntoExpr<T> for CaseExpr<T> {
    fn into_expr(self) -> TypedExpr<T> {
        self.end()
    }
}

/// A subsequent `when` awaiting its `then`.
#[derive(Debug)]
pub struct CaseWhenNext<T> {
    case: CaseExpr<T>,
    condition: BooleanExpr,
}

impl<T> Clone for CaseWhenNext<T> {
    fn clone(&self) -> Self {
        Self {
            case: self.case.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<T> CaseWhenNext<T> {
    /// Supply this branch's result.
    pub fn then(mut self, result: impl IntoExpr<T>) -> CaseExpr<T> {
        self.case
            .data
            .whens
            .push((self.condition, result.into_expr().kind));
        self.case
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::expr::builder::cond;
    use crate::expr::value;
    use crate::value::SqlValue;

    #[test]
    fn case_renders_branches_in_order() -> QueryResult<()> {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = case(cond(value(1i32)).is_equal_to(1)?)
            .then("one")
            .when(cond(value(2i32)).is_equal_to(2)?)
            .then("two")
            .or_else("many");
        assert_eq!(
            expr.sql(&scope)?,
            "case when ? = ? then ? when ? = ? then ? else ? end"
        );
        assert_eq!(
            expr.args(&scope)?,
            vec![
                SqlValue::Integer(1),
                SqlValue::Integer(1),
                SqlValue::Text("one".to_string()),
                SqlValue::Integer(2),
                SqlValue::Integer(2),
                SqlValue::Text("two".to_string()),
                SqlValue::Text("many".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn case_without_else() -> QueryResult<()> {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = case(cond(value(1i32)).is_null()?).then("null!").end();
        assert_eq!(expr.sql(&scope)?, "case when ? is null then ? end");
        Ok(())
    }
}
