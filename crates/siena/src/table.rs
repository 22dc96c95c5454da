//! Compile-time table and column descriptors.
//!
//! Columns are referenced through [`Column`] descriptors rather than strings,
//! so a reference to a column of the wrong table or of the wrong type fails to
//! compile. Descriptors are usually generated by `#[derive(Table)]`, but can
//! be written by hand.

use std::marker::PhantomData;

use crate::error::QueryResult;
use crate::row::{FromRow, Row};
use crate::value::SqlValue;

/// A database table bound to a Rust row type.
pub trait Table: FromRow + Send + Sync + Sized + 'static {
    /// Schema name, empty when the table is unqualified.
    const SCHEMA: &'static str;

    /// Table name.
    const NAME: &'static str;

    /// Column names, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// Map a row whose labels are `{alias}_{COLUMN}` projections.
    fn from_aliased_row(row: &Row, alias: &str) -> QueryResult<Self>;

    /// The schema-qualified table name.
    fn qualified_name() -> String {
        if Self::SCHEMA.is_empty() {
            Self::NAME.to_string()
        } else {
            format!("{}.{}", Self::SCHEMA, Self::NAME)
        }
    }
}

/// A row type whose column values can be listed for INSERT.
pub trait ToRow: Table {
    /// Values for every column in [`Table::COLUMNS`] order.
    fn column_values(&self) -> Vec<SqlValue>;
}

/// A typed column descriptor: the column `name` of table `R`, holding SQL
/// values of Rust type `T`.
pub struct Column<T, R> {
    name: &'static str,
    _marker: PhantomData<fn() -> (T, R)>,
}

impl<T, R> Column<T, R> {
    /// Create a descriptor. Normally generated by `#[derive(Table)]`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The SQL column name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Qualify this column with an alias name, resolved against the scope at
    /// render time.
    pub fn aliased(self, alias: impl Into<String>) -> AliasedColumn<T, R> {
        AliasedColumn {
            column: self,
            alias: alias.into(),
        }
    }

    /// Retype the column as nullable for projection positions where NULL must
    /// map to `None` rather than fail to decode.
    pub fn optional(self) -> Column<Option<T>, R> {
        Column::new(self.name)
    }
}

impl<T, R> Clone for Column<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, R> Copy for Column<T, R> {}

impl<T, R> std::fmt::Debug for Column<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Column").field(&self.name).finish()
    }
}

/// A column descriptor qualified with an alias name (`w.NAME`); still
/// resolved against the scope at render time.
#[derive(Debug)]
pub struct AliasedColumn<T, R> {
    pub(crate) column: Column<T, R>,
    pub(crate) alias: String,
}

impl<T, R> Clone for AliasedColumn<T, R> {
    fn clone(&self) -> Self {
        Self {
            column: self.column,
            alias: self.alias.clone(),
        }
    }
}

impl<T, R> AliasedColumn<T, R> {
    /// Retype as nullable, as [`Column::optional`].
    pub fn optional(self) -> AliasedColumn<Option<T>, R> {
        AliasedColumn {
            column: self.column.optional(),
            alias: self.alias,
        }
    }
}

/// A concrete binding of a table to an alias name, already resolved.
///
/// Unlike [`AliasedColumn`], expressions built from an `Alias` never consult
/// the scope for resolution.
#[derive(Debug)]
pub struct Alias<R> {
    name: String,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for Alias<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: Table> Alias<R> {
    /// Bind table `R` to an alias name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// The alias name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
