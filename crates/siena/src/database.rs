//! The database configuration object and statement entry points.

use std::sync::Arc;

use crate::dialect::{AnsiDialect, Dialect};
use crate::stmt::delete::Delete;
use crate::stmt::insert::Insert;
use crate::stmt::select::{Select, TableProjection};
use crate::stmt::update::Update;
use crate::table::Table;

/// Holds the active dialect and starts statements. Cheap to clone; every
/// statement built from a `Database` carries a handle to it.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    dialect: Box<dyn Dialect>,
}

impl Database {
    /// A database rendering ANSI SQL.
    pub fn new() -> Self {
        Self::with_dialect(AnsiDialect)
    }

    /// A database rendering for the given dialect.
    pub fn with_dialect(dialect: impl Dialect + 'static) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                dialect: Box::new(dialect),
            }),
        }
    }

    /// The active dialect.
    pub fn dialect(&self) -> &dyn Dialect {
        self.inner.dialect.as_ref()
    }

    /// Start a SELECT from table `R` bound to `alias`, projecting the whole
    /// row.
    pub fn from<R: Table>(&self, alias: &str) -> Select<R, TableProjection<R>> {
        Select::new(self.clone(), alias)
    }

    /// Start an INSERT into table `R`.
    pub fn insert_into<R: Table>(&self) -> Insert<R> {
        Insert::new(self.clone())
    }

    /// Start an UPDATE of table `R` bound to `alias`.
    pub fn update<R: Table>(&self, alias: &str) -> Update<R> {
        Update::new(self.clone(), alias)
    }

    /// Start a DELETE from table `R` bound to `alias`.
    pub fn delete_from<R: Table>(&self, alias: &str) -> Delete<R> {
        Delete::new(self.clone(), alias)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.inner.dialect.name())
            .finish()
    }
}
