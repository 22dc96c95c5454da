//! CAST expressions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::label::LabelGenerator;
use super::{ExprKind, IntoExpr, TypedExpr};
use crate::dialect::DbType;

/// Start a CAST; the target-type method fixes both the SQL type name and the
/// Rust result type.
pub fn cast<T>(expr: impl IntoExpr<T>) -> CastBuilder {
    CastBuilder {
        inner: expr.into_expr().into_kind(),
    }
}

/// A CAST awaiting its target type.
#[derive(Debug, Clone)]
pub struct CastBuilder {
    inner: ExprKind,
}

impl CastBuilder {
    fn to<T>(self, ty: DbType) -> TypedExpr<T> {
        TypedExpr::new(ExprKind::Cast {
            inner: Box::new(self.inner),
            ty,
            label: LabelGenerator::new("cast_"),
        })
    }

    /// `cast(x as smallint)`
    pub fn as_small_int(self) -> TypedExpr<i16> {
        self.to(DbType::SmallInt)
    }

    /// `cast(x as integer)`
    pub fn as_integer(self) -> TypedExpr<i32> {
        self.to(DbType::Integer)
    }

    /// `cast(x as bigint)`
    pub fn as_big_int(self) -> TypedExpr<i64> {
        self.to(DbType::BigInt)
    }

    /// `cast(x as real)`
    pub fn as_real(self) -> TypedExpr<f32> {
        self.to(DbType::Real)
    }

    /// `cast(x as double precision)`
    pub fn as_double(self) -> TypedExpr<f64> {
        self.to(DbType::DoublePrecision)
    }

    /// `cast(x as char(n))`
    pub fn as_char(self, length: u32) -> TypedExpr<String> {
        self.to(DbType::Char(length))
    }

    /// `cast(x as varchar(n))`
    pub fn as_varchar(self, length: u32) -> TypedExpr<String> {
        self.to(DbType::Varchar(length))
    }

    /// `cast(x as date)`
    pub fn as_date(self) -> TypedExpr<NaiveDate> {
        self.to(DbType::Date)
    }

    /// `cast(x as time)`
    pub fn as_time(self) -> TypedExpr<NaiveTime> {
        self.to(DbType::Time)
    }

    /// `cast(x as timestamp)`
    pub fn as_timestamp(self) -> TypedExpr<NaiveDateTime> {
        self.to(DbType::Timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::expr::value;
    use crate::scope::Scope;

    #[test]
    fn cast_renders_dialect_type_name() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        assert_eq!(
            cast(value(42i64)).as_varchar(10).sql(&scope).unwrap(),
            "cast(? as varchar(10))"
        );
        assert_eq!(
            cast(value("9")).as_big_int().sql(&scope).unwrap(),
            "cast(? as bigint)"
        );
    }
}
