//! The expression engine.
//!
//! Expressions are a closed AST ([`ExprKind`]) wrapped by [`TypedExpr`],
//! which carries the SQL result type as a phantom parameter. Rendering is a
//! single pass through a [`SqlWriter`]: SQL text and bind arguments are
//! appended together, so placeholders always occur in exactly the order the
//! argument list enumerates them.

pub mod arith;
pub mod boolean;
pub mod builder;
pub mod case;
pub mod cast;
pub mod column;
pub mod condition;
pub mod function;
pub mod json;
pub mod label;
pub mod precedence;
pub mod scalar;
pub mod tuple;

use std::marker::PhantomData;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::dialect::{ConcatStyle, DbType, Dialect};
use crate::error::QueryResult;
use crate::row::RowMapperFactory;
use crate::scope::Scope;
use crate::stmt::select::SelectCore;
use crate::value::{FromValue, SqlValue, ToValue};

use arith::ArithmeticChain;
use case::CaseData;
use column::ColumnRef;
use function::FunctionCall;
use label::LabelGenerator;
use precedence::Precedence;

/// Accumulates SQL text and bind arguments in one pass.
pub struct SqlWriter<'a> {
    dialect: &'a dyn Dialect,
    sql: String,
    args: Vec<SqlValue>,
}

impl<'a> SqlWriter<'a> {
    /// A fresh writer rendering for `dialect`.
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            args: Vec::new(),
        }
    }

    /// Append literal SQL text.
    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append a bind placeholder and record its argument.
    pub fn bind(&mut self, value: SqlValue) {
        let placeholder = self.dialect.placeholder(self.args.len() + 1);
        self.sql.push_str(&placeholder);
        self.args.push(value);
    }

    /// The dialect this writer renders for.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect
    }

    /// The SQL accumulated so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Finish, yielding the SQL text and the arguments in placeholder order.
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.args)
    }
}

/// The closed sum of expression node kinds.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A value rendered inline as a literal.
    Literal {
        value: SqlValue,
        label: LabelGenerator,
    },
    /// A value bound as a placeholder argument.
    Value {
        value: SqlValue,
        label: LabelGenerator,
    },
    /// A column reference, resolved against the scope at render time.
    Column(ColumnRef),
    /// A `+ - * /` chain.
    Arith(ArithmeticChain),
    /// String concatenation.
    Concat {
        parts: Vec<ExprKind>,
        label: LabelGenerator,
    },
    /// A function call, rendered by the dialect.
    Function(FunctionCall),
    /// A CASE expression.
    Case(CaseData),
    /// A CAST expression.
    Cast {
        inner: Box<ExprKind>,
        ty: DbType,
        label: LabelGenerator,
    },
    /// COALESCE over two or more alternatives.
    Coalesce {
        terms: Vec<ExprKind>,
        label: LabelGenerator,
    },
    /// A scalar sub-select.
    Subquery {
        select: Box<SelectCore>,
        label: LabelGenerator,
    },
    /// A parenthesised inner expression; never re-wrapped.
    Paren(Box<ExprKind>),
}

impl ExprKind {
    /// Render this node, appending SQL and args to the writer.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        match self {
            ExprKind::Literal { value, .. } => {
                w.push(&scope.dialect().literal(value)?);
                Ok(())
            }
            ExprKind::Value { value, .. } => {
                w.bind(value.clone());
                Ok(())
            }
            ExprKind::Column(column) => column.build(scope, w),
            ExprKind::Arith(chain) => chain.build(scope, w),
            ExprKind::Concat { parts, .. } => match scope.dialect().concat_style() {
                ConcatStyle::Operator => {
                    for (i, part) in parts.iter().enumerate() {
                        if i > 0 {
                            w.push(" || ");
                        }
                        part.build(scope, w)?;
                    }
                    Ok(())
                }
                ConcatStyle::Function => {
                    w.push("concat(");
                    for (i, part) in parts.iter().enumerate() {
                        if i > 0 {
                            w.push(", ");
                        }
                        part.build(scope, w)?;
                    }
                    w.push(")");
                    Ok(())
                }
            },
            ExprKind::Function(call) => call.build(scope, w),
            ExprKind::Case(case) => case.build(scope, w),
            ExprKind::Cast { inner, ty, .. } => {
                w.push("cast(");
                inner.build(scope, w)?;
                w.push(" as ");
                w.push(&scope.dialect().type_name(ty));
                w.push(")");
                Ok(())
            }
            ExprKind::Coalesce { terms, .. } => {
                w.push("coalesce(");
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    term.build(scope, w)?;
                }
                w.push(")");
                Ok(())
            }
            ExprKind::Subquery { select, .. } => {
                w.push("(");
                select.build_subquery(scope, w)?;
                w.push(")");
                Ok(())
            }
            ExprKind::Paren(inner) => {
                w.push("(");
                inner.build(scope, w)?;
                w.push(")");
                Ok(())
            }
        }
    }

    /// The precedence this node renders at.
    pub fn precedence(&self) -> Precedence {
        match self {
            ExprKind::Literal { .. } | ExprKind::Value { .. } | ExprKind::Column(_) => {
                Precedence::Column
            }
            ExprKind::Arith(chain) => chain.precedence(),
            ExprKind::Concat { .. } => Precedence::Concat,
            ExprKind::Function(_)
            | ExprKind::Case(_)
            | ExprKind::Cast { .. }
            | ExprKind::Coalesce { .. } => Precedence::Unary,
            ExprKind::Subquery { .. } | ExprKind::Paren(_) => Precedence::Parentheses,
        }
    }

    /// The default projection label for this node.
    pub fn label(&self, scope: &Scope<'_>) -> QueryResult<String> {
        match self {
            ExprKind::Literal { label, .. }
            | ExprKind::Value { label, .. }
            | ExprKind::Concat { label, .. }
            | ExprKind::Cast { label, .. }
            | ExprKind::Coalesce { label, .. }
            | ExprKind::Subquery { label, .. } => Ok(label.label(scope)),
            ExprKind::Column(column) => column.label(scope),
            ExprKind::Arith(chain) => chain.first.label(scope),
            ExprKind::Function(call) => call.label(scope),
            ExprKind::Case(case) => Ok(case.label.label(scope)),
            ExprKind::Paren(inner) => inner.label(scope),
        }
    }

    /// Wrap for use as an arithmetic operand: anything that does not bind
    /// tighter than `*`/`/` gets parentheses. Decided once, at construction
    /// of the containing chain.
    pub fn wrap_arith(self) -> ExprKind {
        if self.precedence() > Precedence::TimesDivide {
            self
        } else {
            ExprKind::Paren(Box::new(self))
        }
    }

    /// Wrap for use as a concatenation operand.
    pub fn wrap_concat(self) -> ExprKind {
        if self.precedence() > Precedence::Concat {
            self
        } else {
            ExprKind::Paren(Box::new(self))
        }
    }
}

/// A typed SQL expression: an AST node plus the Rust type its value decodes
/// to.
#[derive(Debug)]
pub struct TypedExpr<T> {
    pub(crate) kind: ExprKind,
    _type: PhantomData<fn() -> T>,
}

// Not derived: `T` is phantom, so no `T: Clone` bound belongs here.
impl<T> Clone for TypedExpr<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> TypedExpr<T> {
    pub(crate) fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            _type: PhantomData,
        }
    }

    /// The underlying AST node.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Consume into the underlying AST node.
    pub fn into_kind(self) -> ExprKind {
        self.kind
    }

    /// Render to SQL text for the scope.
    pub fn sql(&self, scope: &Scope<'_>) -> QueryResult<String> {
        let mut w = SqlWriter::new(scope.dialect());
        self.kind.build(scope, &mut w)?;
        Ok(w.finish().0)
    }

    /// The bind arguments, in placeholder order.
    pub fn args(&self, scope: &Scope<'_>) -> QueryResult<Vec<SqlValue>> {
        let mut w = SqlWriter::new(scope.dialect());
        self.kind.build(scope, &mut w)?;
        Ok(w.finish().1)
    }

    /// Render into an existing writer.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        self.kind.build(scope, w)
    }

    /// This expression's precedence.
    pub fn precedence(&self) -> Precedence {
        self.kind.precedence()
    }

    /// The default projection label.
    pub fn label(&self, scope: &Scope<'_>) -> QueryResult<String> {
        self.kind.label(scope)
    }

    /// Retype as nullable, for projection positions where NULL maps to
    /// `None`.
    pub fn optional(self) -> TypedExpr<Option<T>> {
        TypedExpr::new(self.kind)
    }

    /// Give this expression an explicit projection label.
    pub fn as_(self, label: impl Into<String>) -> tuple::Labeled<T> {
        tuple::Labeled {
            expr: self,
            label: label.into(),
        }
    }

    fn append_term(self, op: &'static str, precedence: Precedence, operand: ExprKind) -> Self {
        let kind = match self.kind {
            ExprKind::Arith(mut chain) => {
                chain.push(op, precedence, operand);
                ExprKind::Arith(chain)
            }
            first => ExprKind::Arith(ArithmeticChain::starting(first, op, precedence, operand)),
        };
        TypedExpr::new(kind)
    }

    /// `self + rhs`
    pub fn plus(self, rhs: impl IntoExpr<T>) -> Self {
        self.append_term("+", Precedence::PlusMinus, rhs.into_expr().kind)
    }

    /// `self - rhs`
    pub fn minus(self, rhs: impl IntoExpr<T>) -> Self {
        self.append_term("-", Precedence::PlusMinus, rhs.into_expr().kind)
    }

    /// `self * rhs`
    pub fn times(self, rhs: impl IntoExpr<T>) -> Self {
        self.append_term("*", Precedence::TimesDivide, rhs.into_expr().kind)
    }

    /// `self / rhs`
    pub fn divided_by(self, rhs: impl IntoExpr<T>) -> Self {
        self.append_term("/", Precedence::TimesDivide, rhs.into_expr().kind)
    }

    /// String concatenation; the rendering (`||` or `concat(...)`) is the
    /// dialect's choice.
    pub fn concat<U>(self, rhs: impl IntoExpr<U>) -> TypedExpr<String> {
        let operand = rhs.into_expr().kind.wrap_concat();
        let kind = match self.kind {
            ExprKind::Concat { mut parts, label } => {
                parts.push(operand);
                ExprKind::Concat { parts, label }
            }
            first => ExprKind::Concat {
                parts: vec![first.wrap_concat(), operand],
                label: LabelGenerator::new("concat_"),
            },
        };
        TypedExpr::new(kind)
    }
}

impl<T: FromValue + Send + Sync + 'static> TypedExpr<T> {
    /// Resolve the row-mapper factory for this expression.
    pub fn row_mapper_factory(&self, scope: &Scope<'_>) -> QueryResult<RowMapperFactory<T>> {
        Ok(RowMapperFactory::for_label(self.kind.label(scope)?))
    }
}

/// Conversion into a typed expression: expressions pass through, column
/// descriptors become unresolved column references, plain values become bind
/// parameters.
pub trait IntoExpr<T> {
    fn into_expr(self) -> TypedExpr<T>;
}

impl<T> IntoExpr<T> for TypedExpr<T> {
    fn into_expr(self) -> TypedExpr<T> {
        self
    }
}

/// A bind-parameter expression (`?` with the value as an argument).
pub fn value<V: ToValue>(v: V) -> TypedExpr<V::SqlTy> {
    TypedExpr::new(ExprKind::Value {
        value: v.to_value(),
        label: LabelGenerator::new("value_"),
    })
}

/// An inline literal expression, rendered by the dialect.
pub fn literal<V: ToValue>(v: V) -> TypedExpr<V::SqlTy> {
    TypedExpr::new(ExprKind::Literal {
        value: v.to_value(),
        label: LabelGenerator::new("literal_"),
    })
}

macro_rules! impl_into_expr_for_scalars {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoExpr<$t> for $t {
                fn into_expr(self) -> TypedExpr<$t> {
                    value(self)
                }
            }
        )*
    };
}

impl_into_expr_for_scalars!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Vec<u8>,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    Uuid,
    serde_json::Value,
);

impl IntoExpr<String> for &str {
    fn into_expr(self) -> TypedExpr<String> {
        value(self)
    }
}

impl IntoExpr<Vec<u8>> for &[u8] {
    fn into_expr(self) -> TypedExpr<Vec<u8>> {
        value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{AnsiDialect, PostgresDialect};

    #[test]
    fn value_binds_a_placeholder() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = value(42i64);
        assert_eq!(expr.sql(&scope).unwrap(), "?");
        assert_eq!(expr.args(&scope).unwrap(), vec![SqlValue::BigInt(42)]);
    }

    #[test]
    fn literal_renders_inline() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = literal("Bob");
        assert_eq!(expr.sql(&scope).unwrap(), "'Bob'");
        assert!(expr.args(&scope).unwrap().is_empty());
    }

    #[test]
    fn postgres_placeholders_are_numbered() {
        let dialect = PostgresDialect::new();
        let scope = Scope::new(&dialect);
        let expr = value(1i32).plus(2i32).minus(3i32);
        assert_eq!(expr.sql(&scope).unwrap(), "$1 + $2 - $3");
        assert_eq!(
            expr.args(&scope).unwrap(),
            vec![
                SqlValue::Integer(1),
                SqlValue::Integer(2),
                SqlValue::Integer(3)
            ]
        );
    }

    #[test]
    fn concat_renders_with_operator_by_default() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = value("a").concat(value("b")).concat(value("c"));
        assert_eq!(expr.sql(&scope).unwrap(), "? || ? || ?");
        assert_eq!(expr.args(&scope).unwrap().len(), 3);
    }

    #[test]
    fn row_mapper_factory_extracts_by_default_label() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = value(5i64);
        let label = expr.label(&scope).unwrap();
        let factory = expr.row_mapper_factory(&scope).unwrap();
        let mapper = factory.row_mapper(None);
        let row = crate::row::Row::new(vec![label], vec![SqlValue::BigInt(5)]).unwrap();
        assert_eq!(mapper(&row).unwrap(), 5);
    }
}
