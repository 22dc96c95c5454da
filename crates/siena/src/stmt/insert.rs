//! The INSERT builder.

use std::marker::PhantomData;

use super::BuildError;
use crate::database::Database;
use crate::error::{QueryError, QueryResult};
use crate::table::{Column, Table, ToRow};
use crate::value::{SqlValue, ToValue};

/// An INSERT into table `R`, built either from typed `set` pairs (one row,
/// chosen columns) or from whole rows via [`Insert::row`] (every column, any
/// number of rows). The two styles do not mix.
pub struct Insert<R: Table> {
    db: Database,
    sets: Vec<(&'static str, SqlValue)>,
    rows: Vec<Vec<SqlValue>>,
    build_error: Option<BuildError>,
    _row: PhantomData<fn() -> R>,
}

impl<R: Table> Insert<R> {
    pub(crate) fn new(db: Database) -> Self {
        Self {
            db,
            sets: Vec::new(),
            rows: Vec::new(),
            build_error: None,
            _row: PhantomData,
        }
    }

    /// Set one column's value. The value's type must match the column's.
    pub fn set<T, V: ToValue<SqlTy = T>>(mut self, column: Column<T, R>, value: V) -> Self {
        self.sets.push((column.name(), value.to_value()));
        self
    }

    /// Append a whole row.
    pub fn row(mut self, row: &R) -> Self
    where
        R: ToRow,
    {
        self.rows.push(row.column_values());
        self
    }

    /// Render to `(sql, args)`.
    pub fn prepare(&self) -> QueryResult<(String, Vec<SqlValue>)> {
        if let Some(error) = &self.build_error {
            return Err(error.to_query_error());
        }
        if !self.sets.is_empty() && !self.rows.is_empty() {
            return Err(QueryError::illegal_state(
                "INSERT cannot mix set() columns with whole rows",
            ));
        }
        let (columns, rows): (Vec<&'static str>, Vec<&[SqlValue]>) = if self.sets.is_empty() {
            if self.rows.is_empty() {
                return Err(QueryError::validation("INSERT requires at least one value"));
            }
            (
                R::COLUMNS.to_vec(),
                self.rows.iter().map(Vec::as_slice).collect(),
            )
        } else {
            let columns = self.sets.iter().map(|(c, _)| *c).collect();
            (columns, Vec::new())
        };

        let dialect = self.db.dialect();
        let mut sql = format!(
            "insert into {} ({}) values ",
            R::qualified_name(),
            columns.join(", ")
        );
        let mut args = Vec::new();
        let bind = |args: &mut Vec<SqlValue>, sql: &mut String, value: &SqlValue| {
            sql.push_str(&dialect.placeholder(args.len() + 1));
            args.push(value.clone());
        };
        if self.sets.is_empty() {
            for (r, row) in rows.iter().enumerate() {
                if row.len() != columns.len() {
                    return Err(QueryError::invalid_argument(format!(
                        "row has {} values but {} has {} columns",
                        row.len(),
                        R::NAME,
                        columns.len()
                    )));
                }
                if r > 0 {
                    sql.push_str(", ");
                }
                sql.push('(');
                for (i, value) in row.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    bind(&mut args, &mut sql, value);
                }
                sql.push(')');
            }
        } else {
            sql.push('(');
            for (i, (_, value)) in self.sets.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                bind(&mut args, &mut sql, value);
            }
            sql.push(')');
        }
        tracing::debug!(target: "siena::sql", %sql, args = args.len(), "prepared insert");
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
