//! The SELECT builder.
//!
//! The fluent grammar moves through a small set of states: `Select` (after
//! `from`/joins), `SelectWhere` (a started WHERE chain accepting
//! `and`/`or`), and `SelectHaving` (the same for HAVING). Comparison methods
//! hand control back to the next state through
//! [`ExpressionBuilder`] continuations.

use std::any::TypeId;
use std::marker::PhantomData;

use super::{BuildError, Order, Prepared};
use crate::database::Database;
use crate::error::QueryResult;
use crate::expr::boolean::{BooleanExpr, BooleanExprChain};
use crate::expr::builder::{ExpressionBuilder, IntoSubquery};
use crate::expr::column::{ColumnRef, ColumnTarget};
use crate::expr::label::LabelGenerator;
use crate::expr::tuple::{ProjItem, Projection};
use crate::expr::{ExprKind, IntoExpr, SqlWriter, TypedExpr};
use crate::row::RowMapper;
use crate::scope::{AliasBinding, Scope};
use crate::table::Table;

/// Join flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "join",
            JoinKind::Left => "left join",
            JoinKind::Right => "right join",
            JoinKind::Full => "full outer join",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FromClause {
    table: String,
    alias: String,
    row_type: TypeId,
    table_name: &'static str,
}

#[derive(Debug, Clone)]
pub(crate) struct JoinClause {
    kind: JoinKind,
    table: String,
    alias: String,
    row_type: TypeId,
    table_name: &'static str,
    on: Option<BooleanExpr>,
}

/// The untyped body of a SELECT: everything needed to render it, detached
/// from the projected Rust type so sub-selects can be embedded in
/// expressions.
#[derive(Debug, Clone)]
pub struct SelectCore {
    pub(crate) items: Vec<ProjItem>,
    pub(crate) from: FromClause,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) where_clause: BooleanExprChain,
    pub(crate) group_by: Vec<ExprKind>,
    pub(crate) having: BooleanExprChain,
    pub(crate) order_by: Vec<(ExprKind, Order)>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) build_error: Option<BuildError>,
}

impl SelectCore {
    fn new<R: Table>(alias: &str) -> Self {
        Self {
            items: Vec::new(),
            from: FromClause {
                table: R::qualified_name(),
                alias: alias.to_string(),
                row_type: TypeId::of::<R>(),
                table_name: R::NAME,
            },
            joins: Vec::new(),
            where_clause: BooleanExprChain::new(),
            group_by: Vec::new(),
            having: BooleanExprChain::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            build_error: None,
        }
    }

    pub(crate) fn bindings(&self) -> Vec<AliasBinding> {
        let mut bindings = vec![AliasBinding {
            alias: self.from.alias.clone(),
            row_type: self.from.row_type,
            table: self.from.table_name,
        }];
        for join in &self.joins {
            bindings.push(AliasBinding {
                alias: join.alias.clone(),
                row_type: join.row_type,
                table: join.table_name,
            });
        }
        bindings
    }

    pub(crate) fn render(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        if let Some(error) = &self.build_error {
            return Err(error.to_query_error());
        }
        w.push("select ");
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            item.build(scope, w)?;
        }
        w.push(" from ");
        w.push(&self.from.table);
        w.push(" ");
        w.push(&self.from.alias);
        for join in &self.joins {
            w.push(" ");
            w.push(join.kind.keyword());
            w.push(" ");
            w.push(&join.table);
            w.push(" ");
            w.push(&join.alias);
            if let Some(on) = &join.on {
                w.push(" on ");
                on.build(scope, w)?;
            }
        }
        if !self.where_clause.is_empty() {
            w.push(" where ");
            self.where_clause.build(scope, w)?;
        }
        if !self.group_by.is_empty() {
            w.push(" group by ");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                expr.build(scope, w)?;
            }
        }
        if !self.having.is_empty() {
            w.push(" having ");
            self.having.build(scope, w)?;
        }
        if !self.order_by.is_empty() {
            w.push(" order by ");
            for (i, (expr, order)) in self.order_by.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                expr.build(scope, w)?;
                w.push(" ");
                w.push(order.keyword());
            }
        }
        w.push(&scope.dialect().fetch_clause(self.limit, self.offset));
        Ok(())
    }

    /// Render as a sub-select of an outer statement: the sub-select's
    /// aliases stack on the outer scope so correlated columns resolve
    /// outward.
    pub(crate) fn build_subquery(&self, outer: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        let scope = outer.child(self.bindings());
        self.render(&scope, w)
    }

    fn record(&mut self, result: QueryResult<()>) {
        if let Err(error) = result {
            if self.build_error.is_none() {
                self.build_error = Some(BuildError::from(error));
            }
        }
    }
}

/// Projection of a whole table row: every column of `R`, labelled
/// `{alias}_{COLUMN}`, mapped back through `R::from_aliased_row`.
#[derive(Debug)]
pub struct TableProjection<R: Table> {
    alias: String,
    _row: PhantomData<fn() -> R>,
}

impl<R: Table> Clone for TableProjection<R> {
    fn clone(&self) -> Self {
        Self {
            alias: self.alias.clone(),
            _row: PhantomData,
        }
    }
}

impl<R: Table> TableProjection<R> {
    fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            _row: PhantomData,
        }
    }
}

impl<R: Table> Projection for TableProjection<R> {
    type Output = R;

    fn collect(&self, items: &mut Vec<ProjItem>) {
        for &column in R::COLUMNS {
            items.push(ProjItem {
                kind: ExprKind::Column(ColumnRef {
                    column,
                    table: R::NAME,
                    row_type: TypeId::of::<R>(),
                    target: ColumnTarget::Resolved(self.alias.clone()),
                }),
                label: None,
            });
        }
    }

    fn row_mapper(&self, _scope: &Scope<'_>) -> QueryResult<RowMapper<R>> {
        let alias = self.alias.clone();
        Ok(Box::new(move |row| R::from_aliased_row(row, &alias)))
    }
}

/// A SELECT from table `R` projecting `P::Output`.
pub struct Select<R: Table, P: Projection> {
    db: Database,
    core: SelectCore,
    projection: P,
    _row: PhantomData<fn() -> R>,
}

impl<R: Table> Select<R, TableProjection<R>> {
    pub(crate) fn new(db: Database, alias: &str) -> Self {
        let projection = TableProjection::new(alias);
        let mut core = SelectCore::new::<R>(alias);
        projection.collect(&mut core.items);
        Self {
            db,
            core,
            projection,
            _row: PhantomData,
        }
    }
}

impl<R: Table, P: Projection> Select<R, P> {
    /// Replace the projection.
    pub fn select<Q: Projection>(self, projection: Q) -> Select<R, Q> {
        let mut core = self.core;
        core.items.clear();
        projection.collect(&mut core.items);
        Select {
            db: self.db,
            core,
            projection,
            _row: PhantomData,
        }
    }

    fn join_to<B: Table>(self, kind: JoinKind, alias: &str) -> JoinOn<R, P, B> {
        JoinOn {
            select: self,
            kind,
            alias: alias.to_string(),
            _joined: PhantomData,
        }
    }

    /// `join B b on ...`
    pub fn join<B: Table>(self, alias: &str) -> JoinOn<R, P, B> {
        self.join_to(JoinKind::Inner, alias)
    }

    /// `left join B b on ...`
    pub fn left_join<B: Table>(self, alias: &str) -> JoinOn<R, P, B> {
        self.join_to(JoinKind::Left, alias)
    }

    /// `right join B b on ...`
    pub fn right_join<B: Table>(self, alias: &str) -> JoinOn<R, P, B> {
        self.join_to(JoinKind::Right, alias)
    }

    /// `full outer join B b on ...`
    pub fn full_join<B: Table>(self, alias: &str) -> JoinOn<R, P, B> {
        self.join_to(JoinKind::Full, alias)
    }

    /// Start the WHERE clause from a left-hand expression.
    pub fn where_<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, SelectWhere<R, P>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.core.where_clause.start(expr));
            self.core.record(outcome);
            SelectWhere { select: self }
        })
    }

    /// Start the WHERE clause from a pre-built boolean expression.
    pub fn where_expr(mut self, expr: BooleanExpr) -> SelectWhere<R, P> {
        let outcome = self.core.where_clause.start(expr);
        self.core.record(outcome);
        SelectWhere { select: self }
    }

    /// Append a GROUP BY expression.
    pub fn group_by<T, L: IntoExpr<T>>(mut self, expr: L) -> Self {
        self.core.group_by.push(expr.into_expr().into_kind());
        self
    }

    /// Start the HAVING clause.
    pub fn having<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, SelectHaving<R, P>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.core.having.start(expr));
            self.core.record(outcome);
            SelectHaving { select: self }
        })
    }

    /// Append an ORDER BY item.
    pub fn order_by<T, L: IntoExpr<T>>(mut self, expr: L, order: Order) -> Self {
        self.core.order_by.push((expr.into_expr().into_kind(), order));
        self
    }

    /// Limit the number of rows fetched.
    pub fn limit(mut self, limit: u64) -> Self {
        self.core.limit = Some(limit);
        self
    }

    /// Skip the first `offset` rows.
    pub fn offset(mut self, offset: u64) -> Self {
        self.core.offset = Some(offset);
        self
    }

    /// Render to the `(sql, args, row_mapper)` triple.
    pub fn prepare(&self) -> QueryResult<Prepared<P::Output>> {
        if let Some(error) = &self.core.build_error {
            return Err(error.to_query_error());
        }
        let scope = Scope::with_bindings(self.db.dialect(), self.core.bindings());
        let mut w = SqlWriter::new(self.db.dialect());
        self.core.render(&scope, &mut w)?;
        let row_mapper = self.projection.row_mapper(&scope)?;
        let (sql, args) = w.finish();
        tracing::debug!(target: "siena::sql", %sql, args = args.len(), "prepared select");
        Ok(Prepared {
            sql,
            args,
            row_mapper,
        })
    }

    /// The SQL text alone.
    pub fn to_sql(&self) -> QueryResult<String> {
        self.prepare().map(|p| p.sql)
    }

    /// The bind arguments alone.
    pub fn to_args(&self) -> QueryResult<Vec<crate::value::SqlValue>> {
        self.prepare().map(|p| p.args)
    }

    /// Use this SELECT as a scalar sub-select expression.
    pub fn as_expr(self) -> TypedExpr<P::Output> {
        TypedExpr::new(ExprKind::Subquery {
            select: Box::new(self.core),
            label: LabelGenerator::new("select_"),
        })
    }
}

/// One pending join, awaiting its ON condition.
pub struct JoinOn<R: Table, P: Projection, B: Table> {
    select: Select<R, P>,
    kind: JoinKind,
    alias: String,
    _joined: PhantomData<fn() -> B>,
}

impl<R: Table, P: Projection, B: Table> JoinOn<R, P, B> {
    /// Give the ON condition via a comparison builder.
    pub fn on<T, L: IntoExpr<T>>(self, lhs: L) -> ExpressionBuilder<T, Select<R, P>> {
        let JoinOn {
            mut select,
            kind,
            alias,
            _joined,
        } = self;
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            match result {
                Ok(expr) => select.core.joins.push(JoinClause {
                    kind,
                    table: B::qualified_name(),
                    alias,
                    row_type: TypeId::of::<B>(),
                    table_name: B::NAME,
                    on: Some(expr),
                }),
                Err(error) => select.core.record(Err(error)),
            }
            select
        })
    }

    /// Give a pre-built ON condition.
    pub fn on_expr(self, on: BooleanExpr) -> Select<R, P> {
        let JoinOn {
            mut select,
            kind,
            alias,
            _joined,
        } = self;
        select.core.joins.push(JoinClause {
            kind,
            table: B::qualified_name(),
            alias,
            row_type: TypeId::of::<B>(),
            table_name: B::NAME,
            on: Some(on),
        });
        select
    }
}

/// A SELECT whose WHERE chain has been started; accepts `and`/`or`.
pub struct SelectWhere<R: Table, P: Projection> {
    select: Select<R, P>,
}

impl<R: Table, P: Projection> SelectWhere<R, P> {
    /// AND another comparison onto the WHERE chain.
    pub fn and<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, SelectWhere<R, P>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.select.core.where_clause.append_and(expr));
            self.select.core.record(outcome);
            self
        })
    }

    /// OR another comparison onto the WHERE chain.
    pub fn or<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, SelectWhere<R, P>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.select.core.where_clause.append_or(expr));
            self.select.core.record(outcome);
            self
        })
    }

    /// AND a pre-built boolean expression onto the WHERE chain.
    pub fn and_expr(mut self, expr: BooleanExpr) -> Self {
        let outcome = self.select.core.where_clause.append_and(expr);
        self.select.core.record(outcome);
        self
    }

    /// OR a pre-built boolean expression onto the WHERE chain.
    pub fn or_expr(mut self, expr: BooleanExpr) -> Self {
        let outcome = self.select.core.where_clause.append_or(expr);
        self.select.core.record(outcome);
        self
    }

    /// Append a GROUP BY expression.
    pub fn group_by<T, L: IntoExpr<T>>(mut self, expr: L) -> Self {
        self.select = self.select.group_by(expr);
        self
    }

    /// Start the HAVING clause.
    pub fn having<T, L: IntoExpr<T>>(self, lhs: L) -> ExpressionBuilder<T, SelectHaving<R, P>> {
        self.select.having(lhs)
    }

    /// Append an ORDER BY item.
    pub fn order_by<T, L: IntoExpr<T>>(mut self, expr: L, order: Order) -> Self {
        self.select = self.select.order_by(expr, order);
        self
    }

    /// Limit the number of rows fetched.
    pub fn limit(mut self, limit: u64) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    /// Skip the first `offset` rows.
    pub fn offset(mut self, offset: u64) -> Self {
        self.select = self.select.offset(offset);
        self
    }

    /// Render to the `(sql, args, row_mapper)` triple.
    pub fn prepare(&self) -> QueryResult<Prepared<P::Output>> {
        self.select.prepare()
    }

    /// The SQL text alone.
    pub fn to_sql(&self) -> QueryResult<String> {
        self.select.to_sql()
    }

    /// The bind arguments alone.
    pub fn to_args(&self) -> QueryResult<Vec<crate::value::SqlValue>> {
        self.select.to_args()
    }

    /// Use this SELECT as a scalar sub-select expression.
    pub fn as_expr(self) -> TypedExpr<P::Output> {
        self.select.as_expr()
    }

    pub(crate) fn into_select(self) -> Select<R, P> {
        self.select
    }
}

/// A SELECT whose HAVING chain has been started.
pub struct SelectHaving<R: Table, P: Projection> {
    select: Select<R, P>,
}

impl<R: Table, P: Projection> SelectHaving<R, P> {
    /// AND another comparison onto the HAVING chain.
    pub fn and<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, SelectHaving<R, P>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.select.core.having.append_and(expr));
            self.select.core.record(outcome);
            self
        })
    }

    /// OR another comparison onto the HAVING chain.
    pub fn or<T, L: IntoExpr<T>>(mut self, lhs: L) -> ExpressionBuilder<T, SelectHaving<R, P>> {
        ExpressionBuilder::new(lhs.into_expr(), move |result| {
            let outcome = result.and_then(|expr| self.select.core.having.append_or(expr));
            self.select.core.record(outcome);
            self
        })
    }

    /// Append an ORDER BY item.
    pub fn order_by<T, L: IntoExpr<T>>(mut self, expr: L, order: Order) -> Self {
        self.select = self.select.order_by(expr, order);
        self
    }

    /// Limit the number of rows fetched.
    pub fn limit(mut self, limit: u64) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    /// Skip the first `offset` rows.
    pub fn offset(mut self, offset: u64) -> Self {
        self.select = self.select.offset(offset);
        self
    }

    /// Render to the `(sql, args, row_mapper)` triple.
    pub fn prepare(&self) -> QueryResult<Prepared<P::Output>> {
        self.select.prepare()
    }

    /// The SQL text alone.
    pub fn to_sql(&self) -> QueryResult<String> {
        self.select.to_sql()
    }

    /// The bind arguments alone.
    pub fn to_args(&self) -> QueryResult<Vec<crate::value::SqlValue>> {
        self.select.to_args()
    }
}

impl<T, R: Table, P: Projection<Output = T>> IntoSubquery<T> for Select<R, P> {
    fn into_core(self) -> SelectCore {
        self.core
    }
}

impl<T, R: Table, P: Projection<Output = T>> IntoSubquery<T> for SelectWhere<R, P> {
    fn into_core(self) -> SelectCore {
        self.select.core
    }
}

/// `exists (select ...)`
pub fn exists<R: Table, P: Projection>(select: Select<R, P>) -> BooleanExpr {
    BooleanExpr::Exists {
        negated: false,
        select: Box::new(select.core),
    }
}

/// `not exists (select ...)`
pub fn not_exists<R: Table, P: Projection>(select: Select<R, P>) -> BooleanExpr {
    BooleanExpr::Exists {
        negated: true,
        select: Box::new(select.core),
    }
}

/// `exists` over a SELECT with a started WHERE chain.
pub fn exists_where<R: Table, P: Projection>(select: SelectWhere<R, P>) -> BooleanExpr {
    exists(select.into_select())
}

/// `not exists` over a SELECT with a started WHERE chain.
pub fn not_exists_where<R: Table, P: Projection>(select: SelectWhere<R, P>) -> BooleanExpr {
    not_exists(select.into_select())
}
