//! JSON constructor functions.

use super::function::sql_function;
use super::{ExprKind, IntoExpr, TypedExpr};

/// A key/value pair for the JSON object constructors.
#[derive(Debug, Clone)]
pub struct JsonKeyValue {
    pub(crate) key: ExprKind,
    pub(crate) value: ExprKind,
}

/// Pair a string key with a value expression.
pub fn key_value<T>(key: impl IntoExpr<String>, value: impl IntoExpr<T>) -> JsonKeyValue {
    JsonKeyValue {
        key: key.into_expr().into_kind(),
        value: value.into_expr().into_kind(),
    }
}

fn flatten(pairs: Vec<JsonKeyValue>) -> Vec<ExprKind> {
    let mut args = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        args.push(pair.key);
        args.push(pair.value);
    }
    args
}

/// `json_object(key k value v, ...)`; Postgres renders `json_build_object`.
pub fn json_object(pairs: Vec<JsonKeyValue>) -> TypedExpr<serde_json::Value> {
    sql_function("json_object", flatten(pairs))
}

/// The binary-JSON variant, where the dialect distinguishes one.
pub fn jsonb_object(pairs: Vec<JsonKeyValue>) -> TypedExpr<serde_json::Value> {
    sql_function("jsonb_object", flatten(pairs))
}

/// `json_array(v1, v2, ...)`
pub fn json_array(values: Vec<ExprKind>) -> TypedExpr<serde_json::Value> {
    sql_function("json_array", values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{AnsiDialect, PostgresDialect};
    use crate::expr::value;
    use crate::scope::Scope;

    #[test]
    fn json_object_renders_ansi_key_value_form() {
        let dialect = AnsiDialect;
        let scope = Scope::new(&dialect);
        let expr = json_object(vec![
            key_value(value("a"), value(1i32)),
            key_value(value("b"), value(2i32)),
        ]);
        assert_eq!(
            expr.sql(&scope).unwrap(),
            "json_object(key ? value ?, key ? value ?)"
        );
        assert_eq!(expr.args(&scope).unwrap().len(), 4);
    }

    #[test]
    fn json_object_renders_builder_form_on_postgres() {
        let pg = PostgresDialect::new();
        let scope = Scope::new(&pg);
        let expr = json_object(vec![key_value(value("a"), value(1i32))]);
        assert_eq!(expr.sql(&scope).unwrap(), "json_build_object($1, $2)");
    }
}
