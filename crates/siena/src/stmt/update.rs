//! The UPDATE builder.

use std::marker::PhantomData;

use super::BuildError;
use crate::database::Database;
use crate::error::{QueryError, QueryResult};
use crate::expr::boolean::{BooleanExpr, BooleanExprChain};
use crate::expr::builder::ExpressionBuilder;
use crate::expr::{ExprKind, IntoExpr, SqlWriter};
use crate::scope::{AliasBinding, Scope};
use crate::table::{Column, Table};
use crate::value::SqlValue;

/// An UPDATE of table `R`. Rendering without at least one SET clause is an
/// error; an update without a WHERE clause updates every row.
pub struct Update<R: Table> {
    db: Database,
    alias: String,
    sets: Vec<(&'static str, ExprKind)>,
    where_clause: BooleanExprChain,
    build_error: Option<BuildError>,
    _row: PhantomData<fn() -> R>,
}

impl<R: Table> Update<R> {
    pub(crate) fn new(db: Database, alias: &str) -> Self {
        Self {
            db,
            alias: alias.to_string(),
            sets: Vec::new(),
            where_clause: BooleanExprChain::new(),
            build_error: None,
            _row: PhantomData,
        }
    }

    /// Set a column to a value or expression of the column's type.
    pub fn set<T, V: IntoExpr<T>>(mut self, column: Column<T, R>, value: V) -> Self {
        self.sets.push((column.name(), value.into_expr().into_kind()));
        self
    }

    /// Start the WHERE clause from a left-hand expression.
    pub fn where_<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, UpdateWhere<R>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.where_clause.start(expr));
            self.record(outcome);
            UpdateWhere { update: self }
        })
    }

    /// Start the WHERE clause from a pre-built boolean expression.
    pub fn where_expr(mut self, expr: BooleanExpr) -> UpdateWhere<R> {
        let outcome = self.where_clause.start(expr);
        self.record(outcome);
        UpdateWhere { update: self }
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
        if self.sets.is_empty() {
            return Err(QueryError::validation(
                "UPDATE requires at least one SET clause",
            ));
        }
        let bindings = vec![AliasBinding::of::<R>(self.alias.clone())];
        let scope = Scope::with_bindings(self.db.dialect(), bindings);
        let mut w = SqlWriter::new(self.db.dialect());
        w.push("update ");
        w.push(&R::qualified_name());
        w.push(" as ");
        w.push(&self.alias);
        w.push(" set ");
        for (i, (column, value)) in self.sets.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(column);
            w.push(" = ");
            value.build(&scope, &mut w)?;
        }
        if !self.where_clause.is_empty() {
            w.push(" where ");
            self.where_clause.build(&scope, &mut w)?;
        }
        let (sql, args) = w.finish();
        tracing::debug!(target: "siena::sql", %sql, args = args.len(), "prepared update");
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

/// An UPDATE whose WHERE chain has been started.
pub struct UpdateWhere<R: Table> {
    update: Update<R>,
}

impl<R: Table> UpdateWhere<R> {
    /// AND another comparison onto the WHERE chain.
    pub fn and<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, UpdateWhere<R>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.update.where_clause.append_and(expr));
            self.update.record(outcome);
            self
        })
    }

    /// OR another comparison onto the WHERE chain.
    pub fn or<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, UpdateWhere<R>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.update.where_clause.append_or(expr));
            self.update.record(outcome);
            self
        })
    }

    /// Render to `(sql, args)`.
    pub fn prepare(&self) -> QueryResult<(String, Vec<SqlValue>)> {
        self.update.prepare()
    }

    /// The SQL text alone.
    pub fn to_sql(&self) -> QueryResult<String> {
        self.update.to_sql()
    }

    /// The bind arguments alone.
    pub fn to_args(&self) -> QueryResult<Vec<SqlValue>> {
        self.update.to_args()
    }
}
