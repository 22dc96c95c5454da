//! Arithmetic chains.

use super::precedence::Precedence;
use super::{ExprKind, SqlWriter};
use crate::error::QueryResult;
use crate::scope::Scope;

/// A left-associative `+ - * /` chain: a first operand plus ordered terms.
///
/// Operands are precedence-wrapped when the chain is constructed, not at
/// render time; mutating an operand after it has been wrapped has no effect
/// on the wrapping decision.
#[derive(Debug, Clone)]
pub struct ArithmeticChain {
    pub(crate) first: Box<ExprKind>,
    pub(crate) terms: Vec<Term>,
}

#[derive(Debug, Clone)]
pub(crate) struct Term {
    op: &'static str,
    precedence: Precedence,
    operand: ExprKind,
}

impl ArithmeticChain {
    /// Start a chain from `first op operand`.
    pub fn starting(
        first: ExprKind,
        op: &'static str,
        precedence: Precedence,
        operand: ExprKind,
    ) -> Self {
        let mut chain = Self {
            first: Box::new(first.wrap_arith()),
            terms: Vec::new(),
        };
        chain.push(op, precedence, operand);
        chain
    }

    /// Append one more term.
    pub fn push(&mut self, op: &'static str, precedence: Precedence, operand: ExprKind) {
        self.terms.push(Term {
            op,
            precedence,
            operand: operand.wrap_arith(),
        });
    }

    /// The loosest precedence across the first operand and every term; this
    /// is what an outer consumer parenthesizes the whole chain by.
    pub fn precedence(&self) -> Precedence {
        self.terms
            .iter()
            .map(|t| t.precedence)
            .fold(self.first.precedence(), Precedence::min)
    }

    /// Render `first` then each ` op operand`, in encounter order; args
    /// flatten in the same order.
    pub fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        self.first.build(scope, w)?;
        for term in &self.terms {
            w.push(" ");
            w.push(term.op);
            w.push(" ");
            term.operand.build(scope, w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::AnsiDialect;
    use crate::expr::value;
    use crate::scope::Scope;
    use crate::value::SqlValue;

    #[test]
    fn chain_renders_in_encounter_order() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = value(1i32).plus(2i32).times(3i32).minus(4i32);
        assert_eq!(expr.sql(&scope).unwrap(), "? + ? * ? - ?");
        assert_eq!(
            expr.args(&scope).unwrap(),
            vec![
                SqlValue::Integer(1),
                SqlValue::Integer(2),
                SqlValue::Integer(3),
                SqlValue::Integer(4)
            ]
        );
    }

    #[test]
    fn loose_operands_are_wrapped_on_construction() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let sum = value(1i32).plus(2i32);
        let expr = value(3i32).times(sum);
        assert_eq!(expr.sql(&scope).unwrap(), "? * (? + ?)");
        assert_eq!(
            expr.args(&scope).unwrap(),
            vec![
                SqlValue::Integer(3),
                SqlValue::Integer(1),
                SqlValue::Integer(2)
            ]
        );
    }

    #[test]
    fn tight_operands_are_not_wrapped() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = value(1i32).plus(value(2i32));
        assert_eq!(expr.sql(&scope).unwrap(), "? + ?");
    }

    #[test]
    fn chain_reports_loosest_precedence() {
        use crate::expr::precedence::Precedence;
        let product = value(1i32).times(2i32);
        assert_eq!(product.precedence(), Precedence::TimesDivide);
        let mixed = value(1i32).times(2i32).plus(3i32);
        assert_eq!(mixed.precedence(), Precedence::PlusMinus);
    }

    #[test]
    fn division_by_a_chain_keeps_grouping() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let quotient = value(6i32).divided_by(3i32);
        let expr = value(12i32).divided_by(quotient);
        assert_eq!(expr.sql(&scope).unwrap(), "? / (? / ?)");
    }
}
