//! DB2 dialect.

use super::Dialect;

/// DB2: ANSI rendering plus support for the `selectivity` comparison hint.
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2Dialect;

impl Dialect for Db2Dialect {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn selectivity_clause(&self, selectivity: f64) -> Option<String> {
        Some(format!("selectivity {selectivity}"))
    }
}
