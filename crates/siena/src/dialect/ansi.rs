//! ANSI SQL dialect.

use super::Dialect;

/// Plain ANSI SQL: `?` placeholders, `||` concatenation, `offset ... rows
/// fetch first ... rows only` row limiting. The trait defaults are ANSI, so
/// this dialect overrides nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }
}
