//! Statement builders: SELECT and the DML family.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

#[cfg(test)]
mod tests;

use crate::error::QueryError;
use crate::row::RowMapper;
use crate::value::SqlValue;

/// The produced artifact of a SELECT: SQL text, bind arguments in
/// placeholder order, and the row mapper for the projected type.
pub struct Prepared<T> {
    pub sql: String,
    pub args: Vec<SqlValue>,
    pub row_mapper: RowMapper<T>,
}

/// Ordering direction for ORDER BY items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// A construction-time error, recorded on the statement and surfaced on the
/// first attempt to render it. Fluent continuations cannot return a
/// `Result`, so misuse (an empty IN list, a double-started chain) parks the
/// error here instead of producing SQL.
#[derive(Debug, Clone)]
pub(crate) enum BuildError {
    IllegalState(String),
    InvalidArgument(String),
    Other(String),
}

impl BuildError {
    pub(crate) fn to_query_error(&self) -> QueryError {
        match self {
            BuildError::IllegalState(m) => QueryError::IllegalState(m.clone()),
            BuildError::InvalidArgument(m) => QueryError::InvalidArgument(m.clone()),
            BuildError::Other(m) => QueryError::Validation(m.clone()),
        }
    }
}

impl From<QueryError> for BuildError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::IllegalState(m) => BuildError::IllegalState(m),
            QueryError::InvalidArgument(m) => BuildError::InvalidArgument(m),
            other => BuildError::Other(other.to_string()),
        }
    }
}
