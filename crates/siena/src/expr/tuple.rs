//! Projections: scalar, labelled, and tuple.
//!
//! A [`Projection`] contributes items to a SELECT list and composes the row
//! mapper for its output type. Tuples of projections are projections, with
//! the element mappers composed positionally; the impls are generated
//! mechanically for arities 2 through 16, and [`Comma::comma`] grows a
//! projection by one arity level (there is no `comma` at the top arity).

use super::{ExprKind, SqlWriter, TypedExpr};
use crate::error::QueryResult;
use crate::row::RowMapper;
use crate::scope::Scope;
use crate::value::FromValue;

/// One rendered item of a SELECT list: an expression and its label.
#[derive(Debug, Clone)]
pub struct ProjItem {
    pub(crate) kind: ExprKind,
    pub(crate) label: Option<String>,
}

impl ProjItem {
    pub(crate) fn resolved_label(&self, scope: &Scope<'_>) -> QueryResult<String> {
        match &self.label {
            Some(label) => Ok(label.clone()),
            None => self.kind.label(scope),
        }
    }

    pub(crate) fn build(&self, scope: &Scope<'_>, w: &mut SqlWriter<'_>) -> QueryResult<()> {
        self.kind.build(scope, w)?;
        w.push(" as ");
        w.push(&self.resolved_label(scope)?);
        Ok(())
    }
}

/// Something that can be projected by a SELECT statement.
pub trait Projection: Send + Sync + 'static {
    /// The Rust type one result row maps to.
    type Output;

    /// Append this projection's items to the SELECT list.
    fn collect(&self, items: &mut Vec<ProjItem>);

    /// Compose the row mapper for [`Projection::Output`].
    fn row_mapper(&self, scope: &Scope<'_>) -> QueryResult<RowMapper<Self::Output>>;
}

impl<T: FromValue + Send + Sync + 'static> Projection for TypedExpr<T> {
    type Output = T;

    fn collect(&self, items: &mut Vec<ProjItem>) {
        items.push(ProjItem {
            kind: self.kind.clone(),
            label: None,
        });
    }

    fn row_mapper(&self, scope: &Scope<'_>) -> QueryResult<RowMapper<T>> {
        let label = self.kind.label(scope)?;
        Ok(Box::new(move |row| row.get::<T>(&label)))
    }
}

/// A projection with an explicit label (`expr as label`).
#[derive(Debug)]
pub struct Labeled<T> {
    pub(crate) expr: TypedExpr<T>,
    pub(crate) label: String,
}

impl<T> Clone for Labeled<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            label: self.label.clone(),
        }
    }
}

impl<T: FromValue + Send + Sync + 'static> Projection for Labeled<T> {
    type Output = T;

    fn collect(&self, items: &mut Vec<ProjItem>) {
        items.push(ProjItem {
            kind: self.expr.kind.clone(),
            label: Some(self.label.clone()),
        });
    }

    fn row_mapper(&self, _scope: &Scope<'_>) -> QueryResult<RowMapper<T>> {
        let label = self.label.clone();
        Ok(Box::new(move |row| row.get::<T>(&label)))
    }
}

macro_rules! impl_tuple_projection {
    ($( ($($P:ident $idx:tt),+) )+) => {
        $(
            impl<$($P: Projection),+> Projection for ($($P,)+) {
                type Output = ($($P::Output,)+);

                fn collect(&self, items: &mut Vec<ProjItem>) {
                    $( self.$idx.collect(items); )+
                }

                fn row_mapper(&self, scope: &Scope<'_>) -> QueryResult<RowMapper<Self::Output>> {
                    $(
                        #[allow(non_snake_case)]
                        let $P = self.$idx.row_mapper(scope)?;
                    )+
                    Ok(Box::new(move |row| Ok(( $( $P(row)?, )+ ))))
                }
            }
        )+
    };
}

impl_tuple_projection! {
    (P1 0, P2 1)
    (P1 0, P2 1, P3 2)
    (P1 0, P2 1, P3 2, P4 3)
    (P1 0, P2 1, P3 2, P4 3, P5 4)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8, P10 9)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8, P10 9, P11 10)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8, P10 9, P11 10, P12 11)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8, P10 9, P11 10, P12 11, P13 12)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8, P10 9, P11 10, P12 11, P13 12, P14 13)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8, P10 9, P11 10, P12 11, P13 12, P14 13, P15 14)
    (P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7, P9 8, P10 9, P11 10, P12 11, P13 12, P14 13, P15 14, P16 15)
}

/// Grow a projection by one arity level.
pub trait Comma<Q>: Sized {
    /// The next-larger tuple shape.
    type Grown;

    /// Append one more projection.
    fn comma(self, next: Q) -> Self::Grown;
}

impl<T, Q> Comma<Q> for TypedExpr<T> {
    type Grown = (TypedExpr<T>, Q);

    fn comma(self, next: Q) -> Self::Grown {
        (self, next)
    }
}

impl<T, Q> Comma<Q> for Labeled<T> {
    type Grown = (Labeled<T>, Q);

    fn comma(self, next: Q) -> Self::Grown {
        (self, next)
    }
}

macro_rules! impl_tuple_comma {
    ($( ($($P:ident),+) )+) => {
        $(
            impl<$($P,)+ Q> Comma<Q> for ($($P,)+) {
                type Grown = ($($P,)+ Q);

                #[allow(non_snake_case)]
                fn comma(self, next: Q) -> Self::Grown {
                    let ($($P,)+) = self;
                    ($($P,)+ next)
                }
            }
        )+
    };
}

impl_tuple_comma! {
    (P1, P2)
    (P1, P2, P3)
    (P1, P2, P3, P4)
    (P1, P2, P3, P4, P5)
    (P1, P2, P3, P4, P5, P6)
    (P1, P2, P3, P4, P5, P6, P7)
    (P1, P2, P3, P4, P5, P6, P7, P8)
    (P1, P2, P3, P4, P5, P6, P7, P8, P9)
    (P1, P2, P3, P4, P5, P6, P7, P8, P9, P10)
    (P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11)
    (P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12)
    (P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12, P13)
    (P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12, P13, P14)
    (P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12, P13, P14, P15)
}
