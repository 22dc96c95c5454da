//! Operator precedence model.

/// Relative binding strength of the operator class an expression renders as,
/// from loosest to tightest. Parenthesisation compares the child's precedence
/// against the threshold of the parent's operator position: the child is
/// wrapped iff its precedence is not strictly higher than the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// OR terms
    Or,
    /// AND terms
    And,
    /// Comparison operators (`=`, `<`, `like`, `is null`, `in`, ...)
    Comparison,
    /// BETWEEN
    Between,
    /// `+` / `-`
    PlusMinus,
    /// `*` / `/`
    TimesDivide,
    /// String concatenation
    Concat,
    /// Self-delimiting forms: function calls, CASE, CAST, NOT, EXISTS
    Unary,
    /// Column references, literals, bind placeholders
    Column,
    /// Already parenthesised; never re-wrapped
    Parentheses,
}

impl Precedence {
    /// The looser of two precedences, used to reduce a chain's terms down to
    /// the precedence the chain reports to its own consumers.
    pub fn min(self, other: Precedence) -> Precedence {
        std::cmp::Ord::min(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_loosest_first() {
        assert!(Precedence::Or < Precedence::And);
        assert!(Precedence::And < Precedence::Comparison);
        assert!(Precedence::Comparison < Precedence::Between);
        assert!(Precedence::Between < Precedence::PlusMinus);
        assert!(Precedence::PlusMinus < Precedence::TimesDivide);
        assert!(Precedence::TimesDivide < Precedence::Concat);
        assert!(Precedence::Concat < Precedence::Unary);
        assert!(Precedence::Unary < Precedence::Column);
        assert!(Precedence::Column < Precedence::Parentheses);
    }

    #[test]
    fn min_reduction() {
        assert_eq!(Precedence::Or.min(Precedence::Column), Precedence::Or);
        assert_eq!(Precedence::Unary.min(Precedence::Unary), Precedence::Unary);
    }
}
