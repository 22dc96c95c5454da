//! Boolean expressions and AND/OR composition.

use super::precedence::Precedence;
use super::{ExprKind, SqlWriter};
use crate::error::{QueryError, QueryResult};
use crate::scope::Scope;
use crate::stmt::select::SelectCore;

/// A boolean-valued SQL expression.
#[derive(Debug, Clone)]
pub enum BooleanExpr {
    /// `lhs op rhs`, with an optional selectivity hint for dialects that
    /// support one.
    Comparison {
        lhs: Box<ExprKind>,
        op: &'static str,
        rhs: Box<ExprKind>,
        selectivity: Option<f64>,
    },
    /// `lhs [not] like pattern [escape '...']`
    Like {
        lhs: Box<ExprKind>,
        op: &'static str,
        pattern: Box<ExprKind>,
        escape: Option<String>,
    },
    /// `lhs [not] in (v1, v2, ...)`
    InList {
        lhs: Box<ExprKind>,
        op: &'static str,
        values: Vec<ExprKind>,
    },
    /// `lhs [not] in (select ...)`
    InSelect {
        lhs: Box<ExprKind>,
        op: &'static str,
        select: Box<SelectCore>,
    },
    /// `lhs is [not] null`
    IsNull {
        lhs: Box<ExprKind>,
        negated: bool,
    },
    /// `lhs [not] between low and high`
    Between {
        lhs: Box<ExprKind>,
        negated: bool,
        low: Box<ExprKind>,
        high: Box<ExprKind>,
    },
    /// `[not] exists (select ...)`
    Exists {
        negated: bool,
        select: Box<SelectCore>,
    },
    /// `not (inner)`
    Not(Box<BooleanExpr>),
    /// A started AND/OR chain.
    Chain(BooleanExprChain),
    /// A flat OR list.
    Or(OrChain),
    /// Parenthesised; never re-wrapped.
    Paren(Box<BooleanExpr>),
}

fn wrap_unless_above(expr: BooleanExpr, threshold: Precedence) -> BooleanExpr {
    if expr.precedence() > threshold {
        expr
    } else {
        BooleanExpr::Paren(Box::new(expr))
    }
}

impl BooleanExpr {
    /// Render this expression, appending SQL and args to the writer.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        match self {
            BooleanExpr::Comparison {
                lhs,
                op,
                rhs,
                selectivity,
            } => {
                lhs.build(scope, w)?;
                w.push(" ");
                w.push(op);
                w.push(" ");
                rhs.build(scope, w)?;
                if let Some(selectivity) = selectivity {
                    if let Some(clause) = scope.dialect().selectivity_clause(*selectivity) {
                        w.push(" ");
                        w.push(&clause);
                    }
                }
                Ok(())
            }
            BooleanExpr::Like {
                lhs,
                op,
                pattern,
                escape,
            } => {
                lhs.build(scope, w)?;
                w.push(" ");
                w.push(op);
                w.push(" ");
                pattern.build(scope, w)?;
                if let Some(escape) = escape {
                    w.push(" escape ");
                    w.push(&crate::dialect::quote_string(escape));
                }
                Ok(())
            }
            BooleanExpr::InList { lhs, op, values } => {
                lhs.build(scope, w)?;
                w.push(" ");
                w.push(op);
                w.push(" (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    value.build(scope, w)?;
                }
                w.push(")");
                Ok(())
            }
            BooleanExpr::InSelect { lhs, op, select } => {
                lhs.build(scope, w)?;
                w.push(" ");
                w.push(op);
                w.push(" (");
                select.build_subquery(scope, w)?;
                w.push(")");
                Ok(())
            }
            BooleanExpr::IsNull { lhs, negated } => {
                lhs.build(scope, w)?;
                w.push(if *negated { " is not null" } else { " is null" });
                Ok(())
            }
            BooleanExpr::Between {
                lhs,
                negated,
                low,
                high,
            } => {
                lhs.build(scope, w)?;
                w.push(if *negated { " not between " } else { " between " });
                low.build(scope, w)?;
                w.push(" and ");
                high.build(scope, w)?;
                Ok(())
            }
            BooleanExpr::Exists { negated, select } => {
                w.push(if *negated { "not exists (" } else { "exists (" });
                select.build_subquery(scope, w)?;
                w.push(")");
                Ok(())
            }
            BooleanExpr::Not(inner) => {
                w.push("not (");
                inner.build(scope, w)?;
                w.push(")");
                Ok(())
            }
            BooleanExpr::Chain(chain) => chain.build(scope, w),
            BooleanExpr::Or(chain) => chain.build(scope, w),
            BooleanExpr::Paren(inner) => {
                w.push("(");
                inner.build(scope, w)?;
                w.push(")");
                Ok(())
            }
        }
    }

    /// The precedence this expression renders at.
    pub fn precedence(&self) -> Precedence {
        match self {
            BooleanExpr::Comparison { .. }
            | BooleanExpr::Like { .. }
            | BooleanExpr::InList { .. }
            | BooleanExpr::InSelect { .. }
            | BooleanExpr::IsNull { .. } => Precedence::Comparison,
            BooleanExpr::Between { .. } => Precedence::Between,
            BooleanExpr::Exists { .. } | BooleanExpr::Not(_) => Precedence::Unary,
            BooleanExpr::Chain(chain) => chain.precedence(),
            BooleanExpr::Or(_) => Precedence::Or,
            BooleanExpr::Paren(_) => Precedence::Parentheses,
        }
    }

    /// Render to SQL text.
    pub fn sql(&self, scope: &Scope<'_>) -> QueryResult<String> {
        let mut w = SqlWriter::new(scope.dialect());
        self.build(scope, &mut w)?;
        Ok(w.finish().0)
    }

    /// The bind arguments, in placeholder order.
    pub fn args(&self, scope: &Scope<'_>) -> QueryResult<Vec<crate::value::SqlValue>> {
        let mut w = SqlWriter::new(scope.dialect());
        self.build(scope, &mut w)?;
        Ok(w.finish().1)
    }

    /// Negate.
    pub fn not(self) -> BooleanExpr {
        BooleanExpr::Not(Box::new(self))
    }

    /// Combine with AND.
    ///
    /// Appending AND to a flat OR list binds to the list's last operand
    /// (`a or b and c` groups as `a or (b and c)`); anything else extends or
    /// starts a chain.
    pub fn and(self, other: BooleanExpr) -> BooleanExpr {
        match self {
            BooleanExpr::Chain(mut chain) => {
                chain.push_term("and", Precedence::And, other);
                BooleanExpr::Chain(chain)
            }
            BooleanExpr::Or(mut chain) => {
                chain.append_and(other);
                BooleanExpr::Or(chain)
            }
            first => {
                let mut chain = BooleanExprChain::of(first);
                chain.push_term("and", Precedence::And, other);
                BooleanExpr::Chain(chain)
            }
        }
    }

    /// Combine with OR.
    pub fn or(self, other: BooleanExpr) -> BooleanExpr {
        match self {
            BooleanExpr::Chain(mut chain) => {
                chain.push_term("or", Precedence::Or, other);
                BooleanExpr::Chain(chain)
            }
            BooleanExpr::Or(mut chain) => {
                chain.append_or(other);
                BooleanExpr::Or(chain)
            }
            first => {
                let mut chain = OrChain::of(first);
                chain.append_or(other);
                BooleanExpr::Or(chain)
            }
        }
    }
}

/// An AND/OR chain with an explicit started/unstarted lifecycle: `start`
/// must be called exactly once before terms can be appended. Statement
/// builders use the unstarted state for their not-yet-seen WHERE clause.
#[derive(Debug, Clone, Default)]
pub struct BooleanExprChain {
    first: Option<Box<BooleanExpr>>,
    terms: Vec<BoolTerm>,
}

#[derive(Debug, Clone)]
struct BoolTerm {
    op: &'static str,
    precedence: Precedence,
    operand: BooleanExpr,
}

impl BooleanExprChain {
    /// An unstarted chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain started with `first`.
    pub fn of(first: BooleanExpr) -> Self {
        Self {
            first: Some(Box::new(wrap_unless_above(first, Precedence::Or))),
            terms: Vec::new(),
        }
    }

    /// Whether the chain has been started.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Start the chain.
    pub fn start(&mut self, expression: BooleanExpr) -> QueryResult<()> {
        if self.first.is_some() {
            return Err(QueryError::illegal_state(
                "Expression chain has already been started",
            ));
        }
        self.first = Some(Box::new(wrap_unless_above(expression, Precedence::Or)));
        Ok(())
    }

    /// Append an OR term; the chain must have been started.
    pub fn append_or(&mut self, expression: BooleanExpr) -> QueryResult<()> {
        self.check_started()?;
        self.push_term("or", Precedence::Or, expression);
        Ok(())
    }

    /// Append an AND term; the chain must have been started.
    pub fn append_and(&mut self, expression: BooleanExpr) -> QueryResult<()> {
        self.check_started()?;
        self.push_term("and", Precedence::And, expression);
        Ok(())
    }

    fn check_started(&self) -> QueryResult<()> {
        if self.first.is_none() {
            return Err(QueryError::illegal_state(
                "Expression chain has not been started",
            ));
        }
        Ok(())
    }

    pub(crate) fn push_term(
        &mut self,
        op: &'static str,
        precedence: Precedence,
        operand: BooleanExpr,
    ) {
        self.terms.push(BoolTerm {
            op,
            precedence,
            operand: wrap_unless_above(operand, precedence),
        });
    }

    /// The loosest precedence across the first operand and every term.
    pub fn precedence(&self) -> Precedence {
        self.terms.iter().map(|t| t.precedence).fold(
            self.first
                .as_ref()
                .map_or(Precedence::Unary, |f| f.precedence()),
            Precedence::min,
        )
    }

    /// Render the chain; an unstarted chain renders nothing.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        let Some(first) = &self.first else {
            return Ok(());
        };
        first.build(scope, w)?;
        for term in &self.terms {
            w.push(" ");
            w.push(term.op);
            w.push(" ");
            term.operand.build(scope, w)?;
        }
        Ok(())
    }
}

/// A flat OR list: `a or b or c`.
#[derive(Debug, Clone)]
pub struct OrChain {
    operands: Vec<BooleanExpr>,
}

impl OrChain {
    /// An OR list with one operand.
    pub fn of(first: BooleanExpr) -> Self {
        Self {
            operands: vec![wrap_unless_above(first, Precedence::Or)],
        }
    }

    /// Append one more OR operand.
    pub fn append_or(&mut self, expression: BooleanExpr) {
        self.operands.push(wrap_unless_above(expression, Precedence::Or));
    }

    /// Append AND, binding it to the last OR operand so `a or b and c`
    /// groups as `a or (b and c)`.
    pub fn append_and(&mut self, expression: BooleanExpr) {
        // `of` guarantees at least one operand.
        if let Some(last) = self.operands.pop() {
            self.operands.push(last.and(expression));
        }
    }

    /// OR lists always report OR precedence.
    pub fn precedence(&self) -> Precedence {
        Precedence::Or
    }

    /// Render the operands joined with ` or `.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                w.push(" or ");
            }
            operand.build(scope, w)?;
        }
        Ok(())
    }
}
