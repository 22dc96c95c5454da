//! The DELETE builder.

use std::marker::PhantomData;

use super::BuildError;
use crate::database::Database;
use crate::error::{QueryError, QueryResult};
use crate::expr::boolean::{BooleanExpr, BooleanExprChain};
use crate::expr::builder::ExpressionBuilder;
use crate::expr::{IntoExpr, SqlWriter};
use crate::scope::{AliasBinding, Scope};
use crate::table::Table;
use crate::value::SqlValue;

/// A DELETE from table `R`. Rendering without a WHERE clause is refused
/// unless [`Delete::all_rows`] was called.
pub struct Delete<R: Table> {
    db: Database,
    alias: String,
    where_clause: BooleanExprChain,
    all_rows: bool,
    build_error: Option<BuildError>,
    _row: PhantomData<fn() -> R>,
}

impl<R: Table> Delete<R> {
    pub(crate) fn new(db: Database, alias: &str) -> Self {
        Self {
            db,
            alias: alias.to_string(),
            where_clause: BooleanExprChain::new(),
            all_rows: false,
            build_error: None,
            _row: PhantomData,
        }
    }

    /// Explicitly request a full-table delete.
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    /// Start the WHERE clause from a left-hand expression.
    pub fn where_<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, DeleteWhere<R>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.where_clause.start(expr));
            self.record(outcome);
            DeleteWhere { delete: self }
        })
    }

    /// Start the WHERE clause from a pre-built boolean expression.
    pub fn where_expr(mut self, expr: BooleanExpr) -> DeleteWhere<R> {
        let outcome = self.where_clause.start(expr);
        self.record(outcome);
        DeleteWhere { delete: self }
    }

    fn record(&mut self, result: QueryResult<()>) {
        if let Err(error) = result {
            if self.build_error.is_none() {
                self.build_error = Some(BuildError::from(error));
            }
        }
    }

    /// Render to `(sql, args)`.
    pub fn prepare(&self) -> QueryResult<(String, Vec<SqlValue>)> {
        if let Some(error) = &self.build_error {
            return Err(error.to_query_error());
        }
        if self.where_clause.is_empty() && !self.all_rows {
            return Err(QueryError::validation(
                "DELETE requires a WHERE clause; call all_rows() to delete every row",
            ));
        }
        let bindings = vec![AliasBinding::of::<R>(self.alias.clone())];
        let scope = Scope::with_bindings(self.db.dialect(), bindings);
        let mut w = SqlWriter::new(self.db.dialect());
        w.push("delete from ");
        w.push(&R::qualified_name());
        w.push(" ");
        w.push(&self.alias);
        if !self.where_clause.is_empty() {
            w.push(" where ");
            self.where_clause.build(&scope, &mut w)?;
        }
        let (sql, args) = w.finish();
        tracing::debug!(target: "siena::sql", %sql, args = args.len(), "prepared delete");
        Ok((sql, args))
    }

    /// The SQL text alone.
    pub fn to_sql(&self) -> QueryResult<String> {
        self.prepare().map(|(sql, _)| sql)
    }

    /// The bind arguments alone.
    pub fn to_args(&self) -> QueryResult<Vec<SqlValue>> {
        self.prepare().map(|(_, args)| args)
    }
}

/// A DELETE whose WHERE chain has been started.
pub struct DeleteWhere<R: Table> {
    delete: Delete<R>,
}

impl<R: Table> DeleteWhere<R> {
    /// AND another comparison onto the WHERE chain.
    pub fn and<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, DeleteWhere<R>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.delete.where_clause.append_and(expr));
            self.delete.record(outcome);
            self
        })
    }

    /// OR another comparison onto the WHERE chain.
    pub fn or<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, DeleteWhere<R>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.delete.where_clause.append_or(expr));
            self.delete.record(outcome);
            self
        })
    }

    /// Render to `(sql, args)`.
    pub fn prepare(&self) -> QueryResult<(String, Vec<SqlValue>)> {
        self.delete.prepare()
    }

    /// The SQL text alone.
    pub fn to_sql(&self) -> QueryResult<String> {
        self.delete.to_sql()
    }

    /// The bind arguments alone.
    pub fn to_args(&self) -> QueryResult<Vec<SqlValue>> {
        self.delete.to_args()
    }
}
