//! Conditions: the right-hand side of a comparison.
//!
//! A [`Condition`] owns everything about a comparison except its left-hand
//! expression; binding one to a left-hand side yields a
//! [`BooleanExpr`]. Conditions are produced by the `is_*` methods of
//! [`ExpressionBuilder`](super::builder::ExpressionBuilder).

use super::boolean::BooleanExpr;
use super::ExprKind;
use crate::stmt::select::SelectCore;

/// The operator, operand and hints of a comparison, awaiting its left-hand
/// side.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `op rhs`, e.g. `= ?`
    Op {
        op: &'static str,
        rhs: ExprKind,
        selectivity: Option<f64>,
    },
    /// `[not] like pattern [escape '...']`
    Like {
        op: &'static str,
        pattern: ExprKind,
        escape: Option<String>,
    },
    /// `[not] in (v1, ...)`
    In {
        op: &'static str,
        values: Vec<ExprKind>,
    },
    /// `[not] in (select ...)`
    InSelect {
        op: &'static str,
        select: Box<SelectCore>,
    },
    /// `is [not] null`
    Null { negated: bool },
    /// `[not] between low and high`
    Between {
        negated: bool,
        low: ExprKind,
        high: ExprKind,
    },
}

impl Condition {
    /// Bind this condition to its left-hand expression.
    pub fn against(self, lhs: ExprKind) -> BooleanExpr {
        let lhs = Box::new(lhs);
        match self {
            Condition::Op {
                op,
                rhs,
                selectivity,
            } => BooleanExpr::Comparison {
                lhs,
                op,
                rhs: Box::new(rhs),
                selectivity,
            },
            Condition::Like {
                op,
                pattern,
                escape,
            } => BooleanExpr::Like {
                lhs,
                op,
                pattern: Box::new(pattern),
                escape,
            },
            Condition::In { op, values } => BooleanExpr::InList { lhs, op, values },
            Condition::InSelect { op, select } => BooleanExpr::InSelect { lhs, op, select },
            Condition::Null { negated } => BooleanExpr::IsNull { lhs, negated },
            Condition::Between {
                negated,
                low,
                high,
            } => BooleanExpr::Between {
                lhs,
                negated,
                low: Box::new(low),
                high: Box::new(high),
            },
        }
    }
}
