//! Function-call expressions and the aggregate family.

use std::marker::PhantomData;

use super::label::LabelGenerator;
use super::tuple::{ProjItem, Projection};
use super::{ExprKind, IntoExpr, SqlWriter, TypedExpr};
use crate::dialect::{is_no_paren, FunctionName};
use crate::error::{QueryError, QueryResult};
use crate::row::RowMapper;
use crate::scope::Scope;
use crate::value::FromValue;

/// One function call: a logical name, arguments, and aggregate quantifiers.
/// Rendering is delegated to the dialect when it registers a renderer for
/// the name; the dialect's renderer owns both the SQL shape and the bind
/// order.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub(crate) name: FunctionName,
    pub(crate) args: Vec<ExprKind>,
    pub(crate) star: bool,
    pub(crate) distinct: bool,
    pub(crate) label_override: Option<&'static str>,
    pub(crate) label: LabelGenerator,
}

impl FunctionCall {
    fn new(name: &'static str, args: Vec<ExprKind>) -> Self {
        Self {
            name: FunctionName(name),
            args,
            star: false,
            distinct: false,
            label_override: None,
            label: LabelGenerator::new(format!("{name}_")),
        }
    }

    /// The logical function name.
    pub fn name(&self) -> FunctionName {
        self.name
    }

    /// Number of arguments.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Whether this call renders `*` instead of arguments.
    pub fn is_star(&self) -> bool {
        self.star
    }

    /// Whether this call carries the `distinct` quantifier.
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Render the argument at `index` into the writer.
    pub fn render_arg(
        &self,
        index: usize,
        scope: &Scope<'_>,
        w: &mut SqlWriter<'_>,
    ) -> QueryResult<()> {
        let arg = self.args.get(index).ok_or_else(|| {
            QueryError::invalid_argument(format!(
                "function {} has no argument {index}",
                self.name
            ))
        })?;
        arg.build(scope, w)
    }

    /// Render the quantifier and argument list (`distinct x, y` or `*`),
    /// without the name or parentheses.
    pub fn render_arg_list(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        if self.distinct {
            w.push("distinct ");
        }
        if self.star {
            w.push("*");
            return Ok(());
        }
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            arg.build(scope, w)?;
        }
        Ok(())
    }

    pub(crate) fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        if let Some(renderer) = scope.dialect().function(self.name) {
            return renderer.render(self, scope, w);
        }
        self.default_render(scope, w)
    }

    fn default_render(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        match self.name.as_str() {
            "json_object" | "jsonb_object" => return self.render_ansi_json_object(scope, w),
            _ => {}
        }
        if self.args.is_empty() && !self.star && is_no_paren(self.name.as_str()) {
            w.push(self.name.as_str());
            return Ok(());
        }
        w.push(self.name.as_str());
        w.push("(");
        self.render_arg_list(scope, w)?;
        w.push(")");
        Ok(())
    }

    /// ANSI JSON object constructor: `json_object(key k value v, ...)` over
    /// flattened key/value argument pairs.
    fn render_ansi_json_object(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        w.push(self.name.as_str());
        w.push("(");
        for (i, pair) in self.args.chunks(2).enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push("key ");
            pair[0].build(scope, w)?;
            w.push(" value ");
            if let Some(value) = pair.get(1) {
                value.build(scope, w)?;
            }
        }
        w.push(")");
        Ok(())
    }

    pub(crate) fn label(&self, scope: &Scope<'_>) -> QueryResult<String> {
        if let Some(label) = self.label_override {
            return Ok(label.to_string());
        }
        if self.args.len() == 1 {
            return Ok(self.label.label_for(&self.args[0].label(scope)?));
        }
        Ok(self.label.label(scope))
    }
}

fn call<T>(f: FunctionCall) -> TypedExpr<T> {
    TypedExpr::new(ExprKind::Function(f))
}

/// A general function call over pre-built argument nodes.
pub fn sql_function<T>(name: &'static str, args: Vec<ExprKind>) -> TypedExpr<T> {
    call(FunctionCall::new(name, args))
}

/// A function of one typed argument, keeping the argument's type.
pub fn unary_function<T>(name: &'static str, arg: impl IntoExpr<T>) -> TypedExpr<T> {
    call(FunctionCall::new(name, vec![arg.into_expr().kind]))
}

// ---- aggregates ----

/// `max(x)`
pub fn max<T>(arg: impl IntoExpr<T>) -> TypedExpr<T> {
    unary_function("max", arg)
}

/// `min(x)`
pub fn min<T>(arg: impl IntoExpr<T>) -> TypedExpr<T> {
    unary_function("min", arg)
}

/// `sum(x)`
pub fn sum<T>(arg: impl IntoExpr<T>) -> TypedExpr<T> {
    unary_function("sum", arg)
}

/// `avg(x)`
pub fn avg<T>(arg: impl IntoExpr<T>) -> TypedExpr<T> {
    unary_function("avg", arg)
}

/// `count(*)`, labelled `n`.
pub fn count() -> TypedExpr<i32> {
    let mut f = FunctionCall::new("count", Vec::new());
    f.star = true;
    f.label_override = Some("n");
    call(f)
}

/// `count(x)`
pub fn count_of<T>(arg: impl IntoExpr<T>) -> TypedExpr<i32> {
    call(FunctionCall::new("count", vec![arg.into_expr().kind]))
}

/// `count(distinct x)`, labelled `count_...` after its argument.
pub fn count_distinct<T>(arg: impl IntoExpr<T>) -> TypedExpr<i32> {
    let mut f = FunctionCall::new("count", vec![arg.into_expr().kind]);
    f.distinct = true;
    call(f)
}

/// `count_big(*)`, labelled `n`; dialects without a native `count_big`
/// rewrite it as a widened count.
pub fn count_big() -> TypedExpr<i64> {
    let mut f = FunctionCall::new("count_big", Vec::new());
    f.star = true;
    f.label_override = Some("n");
    call(f)
}

/// `count_big(x)`
pub fn count_big_of<T>(arg: impl IntoExpr<T>) -> TypedExpr<i64> {
    call(FunctionCall::new("count_big", vec![arg.into_expr().kind]))
}

/// `count_big(distinct x)`
pub fn count_big_distinct<T>(arg: impl IntoExpr<T>) -> TypedExpr<i64> {
    let mut f = FunctionCall::new("count_big", vec![arg.into_expr().kind]);
    f.distinct = true;
    call(f)
}

// ---- coalesce ----

/// An accumulating COALESCE: `coalesce(first).or_else(next)...`.
///
/// Type and row mapper derive from the first term.
#[derive(Debug)]
pub struct Coalesce<T> {
    terms: Vec<ExprKind>,
    label: LabelGenerator,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Coalesce<T> {
    fn clone(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            label: self.label.clone(),
            _type: PhantomData,
        }
    }
}

/// Start a COALESCE from its first alternative.
pub fn coalesce<T>(first: impl IntoExpr<T>) -> Coalesce<T> {
    Coalesce {
        terms: vec![first.into_expr().kind],
        label: LabelGenerator::new("coalesce_"),
        _type: PhantomData,
    }
}

impl<T> Coalesce<T> {
    /// Append one more alternative.
    pub fn or_else(mut self, next: impl IntoExpr<T>) -> Self {
        self.terms.push(next.into_expr().kind);
        self
    }

    /// Give the finished expression an explicit projection label.
    pub fn as_(self, label: impl Into<String>) -> super::tuple::Labeled<T> {
        self.into_expr().as_(label)
    }
}

impl<T> IntoExpr<T> for Coalesce<T> {
    fn into_expr(self) -> TypedExpr<T> {
        TypedExpr::new(ExprKind::Coalesce {
            terms: self.terms,
            label: self.label,
        })
    }
}

impl<T: FromValue + Send + Sync + 'static> Projection for Coalesce<T> {
    type Output = T;

    fn collect(&self, items: &mut Vec<ProjItem>) {
        self.clone().into_expr().collect(items);
    }

    fn row_mapper(&self, scope: &Scope<'_>) -> QueryResult<RowMapper<T>> {
        self.clone().into_expr().row_mapper(scope)
    }
}
