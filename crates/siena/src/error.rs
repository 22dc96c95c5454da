//! Error types for siena

use thiserror::Error;

/// Result type alias for siena operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query construction, rendering and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// A fluent builder was used out of protocol (e.g. an expression chain
    /// appended to before it was started).
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// A builder method was given an argument it cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No alias for the requested table is in scope at render time.
    #[error("No alias for {0} is in scope")]
    NoSuchAlias(String),

    /// More than one alias for the requested table is in scope and the
    /// reference did not name one.
    #[error("More than one alias for {0} is in scope; qualify the column with an alias name")]
    AmbiguousAlias(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Statement-level validation error (e.g. UPDATE without SET)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A query expected to return a row returned none
    #[error("Not found: {0}")]
    NotFound(String),

    /// The active dialect cannot render the requested construct.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Error reported by the database client
    #[error("Client error: {0}")]
    Client(#[from] tokio_postgres::Error),
}

impl QueryError {
    /// Create an illegal state error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an illegal state error
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
