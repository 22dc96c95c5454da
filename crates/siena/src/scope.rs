//! Render-time resolution context.

use std::any::TypeId;
use std::cell::Cell;

use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::table::Table;

/// One table alias in effect while rendering a statement.
#[derive(Debug, Clone)]
pub struct AliasBinding {
    pub(crate) alias: String,
    pub(crate) row_type: TypeId,
    pub(crate) table: &'static str,
}

impl AliasBinding {
    /// Bind table `R` to an alias name.
    pub fn of<R: Table>(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            row_type: TypeId::of::<R>(),
            table: R::NAME,
        }
    }
}

/// The context threaded through every `sql`/`args`/`label`/row-mapper call:
/// the active dialect, the aliases in effect, and the statement-local label
/// counter. Sub-select scopes chain to their parent so correlated columns
/// resolve outward.
pub struct Scope<'a> {
    dialect: &'a dyn Dialect,
    bindings: Vec<AliasBinding>,
    parent: Option<&'a Scope<'a>>,
    labels: Cell<u32>,
}

impl<'a> Scope<'a> {
    /// A scope with no aliases, for rendering stand-alone expressions.
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self::with_bindings(dialect, Vec::new())
    }

    /// A scope with the given aliases in effect.
    pub fn with_bindings(dialect: &'a dyn Dialect, bindings: Vec<AliasBinding>) -> Self {
        Self {
            dialect,
            bindings,
            parent: None,
            labels: Cell::new(0),
        }
    }

    /// A nested scope for a sub-select; resolution falls back to `self`.
    pub fn child<'b>(&'b self, bindings: Vec<AliasBinding>) -> Scope<'b> {
        Scope {
            dialect: self.dialect,
            bindings,
            parent: Some(self),
            labels: Cell::new(0),
        }
    }

    /// The active dialect.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect
    }

    /// Next ordinal for default-label generation.
    pub fn next_label_ordinal(&self) -> u32 {
        let next = self.labels.get() + 1;
        self.labels.set(next);
        next
    }

    /// Resolve the alias to qualify a column of `row_type` with.
    ///
    /// With an explicit `name`, the binding of that name must exist in the
    /// scope chain and refer to the expected table. Without one, exactly one
    /// binding for the table must be in effect at some level of the chain;
    /// none is [`QueryError::NoSuchAlias`], several at the same level is
    /// [`QueryError::AmbiguousAlias`].
    pub fn find_alias(
        &self,
        row_type: TypeId,
        table: &str,
        name: Option<&str>,
    ) -> QueryResult<String> {
        match name {
            Some(name) => self.find_named(row_type, table, name),
            None => self.find_unnamed(row_type, table),
        }
    }

    fn find_named(&self, row_type: TypeId, table: &str, name: &str) -> QueryResult<String> {
        if let Some(binding) = self.bindings.iter().find(|b| b.alias == name) {
            if binding.row_type == row_type {
                Ok(binding.alias.clone())
            } else {
                Err(QueryError::invalid_argument(format!(
                    "alias '{name}' does not refer to table {table}"
                )))
            }
        } else if let Some(parent) = self.parent {
            parent.find_named(row_type, table, name)
        } else {
            Err(QueryError::NoSuchAlias(format!("{table} (alias '{name}')")))
        }
    }

    fn find_unnamed(&self, row_type: TypeId, table: &str) -> QueryResult<String> {
        let mut matches = self.bindings.iter().filter(|b| b.row_type == row_type);
        match (matches.next(), matches.next()) {
            (Some(binding), None) => Ok(binding.alias.clone()),
            (Some(_), Some(_)) => Err(QueryError::AmbiguousAlias(table.to_string())),
            (None, _) => match self.parent {
                Some(parent) => parent.find_unnamed(row_type, table),
                None => Err(QueryError::NoSuchAlias(table.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;

    fn binding<R: Table>(alias: &str) -> AliasBinding {
        AliasBinding::of::<R>(alias)
    }

    #[derive(Debug, PartialEq)]
    struct Doodad;

    impl crate::row::FromRow for Doodad {
        fn from_row(_row: &crate::row::Row) -> QueryResult<Self> {
            Ok(Doodad)
        }
    }

    impl Table for Doodad {
        const SCHEMA: &'static str = "";
        const NAME: &'static str = "DOODAD";
        const COLUMNS: &'static [&'static str] = &[];

        fn from_aliased_row(_row: &crate::row::Row, _alias: &str) -> QueryResult<Self> {
            Ok(Doodad)
        }
    }

    #[derive(Debug, PartialEq)]
    struct Gadget;

    impl crate::row::FromRow for Gadget {
        fn from_row(_row: &crate::row::Row) -> QueryResult<Self> {
            Ok(Gadget)
        }
    }

    impl Table for Gadget {
        const SCHEMA: &'static str = "";
        const NAME: &'static str = "GADGET";
        const COLUMNS: &'static [&'static str] = &[];

        fn from_aliased_row(_row: &crate::row::Row, _alias: &str) -> QueryResult<Self> {
            Ok(Gadget)
        }
    }

    #[test]
    fn single_binding_resolves_without_a_name() {
        let dialect = AnsiDialect;
        let scope = Scope::with_bindings(&dialect, vec![binding::<Doodad>("d")]);
        let alias = scope
            .find_alias(TypeId::of::<Doodad>(), "DOODAD", None)
            .unwrap();
        assert_eq!(alias, "d");
    }

    #[test]
    fn two_bindings_without_a_name_are_ambiguous() {
        let dialect = AnsiDialect;
        let scope = Scope::with_bindings(
            &dialect,
            vec![binding::<Doodad>("d1"), binding::<Doodad>("d2")],
        );
        let result = scope.find_alias(TypeId::of::<Doodad>(), "DOODAD", None);
        assert!(matches!(result, Err(QueryError::AmbiguousAlias(_))));
        let named = scope
            .find_alias(TypeId::of::<Doodad>(), "DOODAD", Some("d2"))
            .unwrap();
        assert_eq!(named, "d2");
    }

    #[test]
    fn named_binding_must_match_the_table() {
        let dialect = AnsiDialect;
        let scope = Scope::with_bindings(&dialect, vec![binding::<Doodad>("d")]);
        let result = scope.find_alias(TypeId::of::<Gadget>(), "GADGET", Some("d"));
        assert!(matches!(result, Err(QueryError::InvalidArgument(_))));
    }

    #[test]
    fn resolution_falls_back_to_the_parent_scope() {
        let dialect = AnsiDialect;
        let outer = Scope::with_bindings(&dialect, vec![binding::<Doodad>("d")]);
        let inner = outer.child(vec![binding::<Gadget>("g")]);
        let alias = inner
            .find_alias(TypeId::of::<Doodad>(), "DOODAD", None)
            .unwrap();
        assert_eq!(alias, "d");
        let missing = inner.find_alias(TypeId::of::<String>(), "OTHER", None);
        assert!(matches!(missing, Err(QueryError::NoSuchAlias(_))));
    }

    #[test]
    fn label_ordinals_advance_per_scope() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        assert_eq!(scope.next_label_ordinal(), 1);
        assert_eq!(scope.next_label_ordinal(), 2);
    }
}

