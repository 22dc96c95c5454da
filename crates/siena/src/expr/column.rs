//! Column reference expressions.
//!
//! Two parallel representations exist: references built from an
//! [`Alias`] are resolved at construction, while references built from a
//! bare [`Column`] descriptor (optionally qualified with an alias name) are
//! resolved against the [`Scope`] each time they render. Deferral matters
//! for self-joins: an expression can be written before the from/join clause
//! that disambiguates it is complete.

use std::any::TypeId;

use super::tuple::{Comma, ProjItem, Projection};
use super::{ExprKind, IntoExpr, SqlWriter, TypedExpr};
use crate::error::QueryResult;
use crate::row::RowMapper;
use crate::scope::Scope;
use crate::table::{Alias, AliasedColumn, Column, Table};
use crate::value::FromValue;

/// How the owning alias of a column reference is determined.
#[derive(Debug, Clone)]
pub enum ColumnTarget {
    /// Resolve via the scope: optionally constrained to an alias name.
    Unresolved(Option<String>),
    /// Already bound to a concrete alias.
    Resolved(String),
}

/// A reference to `alias.COLUMN`.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub(crate) column: &'static str,
    pub(crate) table: &'static str,
    pub(crate) row_type: TypeId,
    pub(crate) target: ColumnTarget,
}

impl ColumnRef {
    fn resolve(&self, scope: &Scope<'_>) -> QueryResult<String> {
        match &self.target {
            ColumnTarget::Resolved(alias) => Ok(alias.clone()),
            ColumnTarget::Unresolved(name) => {
                scope.find_alias(self.row_type, self.table, name.as_deref())
            }
        }
    }

    pub(crate) fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        let alias = self.resolve(scope)?;
        w.push(&alias);
        w.push(".");
        w.push(self.column);
        Ok(())
    }

    pub(crate) fn label(&self, scope: &Scope<'_>) -> QueryResult<String> {
        let alias = self.resolve(scope)?;
        Ok(format!("{}_{}", alias, self.column))
    }
}

impl<T, R: Table> IntoExpr<T> for Column<T, R> {
    fn into_expr(self) -> TypedExpr<T> {
        TypedExpr::new(ExprKind::Column(ColumnRef {
            column: self.name(),
            table: R::NAME,
            row_type: TypeId::of::<R>(),
            target: ColumnTarget::Unresolved(None),
        }))
    }
}

impl<T, R: Table> IntoExpr<T> for AliasedColumn<T, R> {
    fn into_expr(self) -> TypedExpr<T> {
        TypedExpr::new(ExprKind::Column(ColumnRef {
            column: self.column.name(),
            table: R::NAME,
            row_type: TypeId::of::<R>(),
            target: ColumnTarget::Unresolved(Some(self.alias)),
        }))
    }
}

impl<R: Table> Alias<R> {
    /// A resolved reference to a column of this alias.
    pub fn col<T>(&self, column: Column<T, R>) -> TypedExpr<T> {
        TypedExpr::new(ExprKind::Column(ColumnRef {
            column: column.name(),
            table: R::NAME,
            row_type: TypeId::of::<R>(),
            target: ColumnTarget::Resolved(self.name().to_string()),
        }))
    }
}

impl<T, R> Projection for Column<T, R>
where
    T: FromValue + Send + Sync + 'static,
    R: Table,
{
    type Output = T;

    fn collect(&self, items: &mut Vec<ProjItem>) {
        (*self).into_expr().collect(items);
    }

    fn row_mapper(&self, scope: &Scope<'_>) -> QueryResult<RowMapper<T>> {
        (*self).into_expr().row_mapper(scope)
    }
}

impl<T, R> Projection for AliasedColumn<T, R>
where
    T: FromValue + Send + Sync + 'static,
    R: Table,
{
    type Output = T;

    fn collect(&self, items: &mut Vec<ProjItem>) {
        self.clone().into_expr().collect(items);
    }

    fn row_mapper(&self, scope: &Scope<'_>) -> QueryResult<RowMapper<T>> {
        self.clone().into_expr().row_mapper(scope)
    }
}

impl<T, R, Q> Comma<Q> for Column<T, R> {
    type Grown = (Column<T, R>, Q);

    fn comma(self, next: Q) -> Self::Grown {
        (self, next)
    }
}

impl<T, R, Q> Comma<Q> for AliasedColumn<T, R> {
    type Grown = (AliasedColumn<T, R>, Q);

    fn comma(self, next: Q) -> Self::Grown {
        (self, next)
    }
}
