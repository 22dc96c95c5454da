//! Default column-alias generation.

use std::sync::{Arc, OnceLock};

use crate::scope::Scope;

/// Produces a default projection label from a prefix plus a disambiguating
/// ordinal drawn from the scope's statement-local counter.
///
/// The ordinal is assigned on first use and cached, so the same expression
/// rendered twice in one scope yields the same label; clones of an expression
/// share the cell, so a statement's SQL text and its row mapper agree on the
/// label even though they walk separate copies of the tree.
#[derive(Debug, Clone)]
pub struct LabelGenerator {
    prefix: String,
    ordinal: Arc<OnceLock<u32>>,
}

impl LabelGenerator {
    /// Create a generator for the given prefix (e.g. `"coalesce_"`).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ordinal: Arc::new(OnceLock::new()),
        }
    }

    /// The label: `{prefix}{ordinal}`.
    pub fn label(&self, scope: &Scope<'_>) -> String {
        let ordinal = self.ordinal.get_or_init(|| scope.next_label_ordinal());
        format!("{}{}", self.prefix, ordinal)
    }

    /// The label for a generator that decorates a labelled argument:
    /// `{prefix}{suffix}`.
    pub fn label_for(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }
}
