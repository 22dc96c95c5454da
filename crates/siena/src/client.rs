//! Execution seam.
//!
//! Statements render locally; executing them is delegated to anything
//! implementing [`GenericClient`] (a `tokio_postgres` client or
//! transaction). This module also bridges [`SqlValue`] bind arguments to
//! `ToSql` and decodes `tokio_postgres` rows into [`Row`]s for the row
//! mappers. Pooling and transaction management stay outside.

use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::Row as PgRow;

use crate::error::{QueryError, QueryResult};
use crate::expr::tuple::Projection;
use crate::row::Row;
use crate::stmt::delete::{Delete, DeleteWhere};
use crate::stmt::insert::Insert;
use crate::stmt::select::{Select, SelectHaving, SelectWhere};
use crate::stmt::update::{Update, UpdateWhere};
use crate::table::Table;
use crate::value::SqlValue;

/// The narrow client interface statements execute through.
pub trait GenericClient: Sync {
    /// Run a query, returning raw rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = QueryResult<Vec<PgRow>>> + Send;

    /// Run a statement, returning the affected-row count.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = QueryResult<u64>> + Send;
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<Vec<PgRow>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(QueryError::from)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(QueryError::from)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<Vec<PgRow>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(QueryError::from)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(QueryError::from)
    }
}

static NULL_PARAM: Option<i32> = None;

impl SqlValue {
    /// Borrow this value as a `ToSql` bind parameter.
    pub fn pg_param(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlValue::Null => &NULL_PARAM,
            SqlValue::Boolean(v) => v,
            SqlValue::SmallInt(v) => v,
            SqlValue::Integer(v) => v,
            SqlValue::BigInt(v) => v,
            SqlValue::Real(v) => v,
            SqlValue::Double(v) => v,
            SqlValue::Text(v) => v,
            SqlValue::Bytes(v) => v,
            SqlValue::Date(v) => v,
            SqlValue::Time(v) => v,
            SqlValue::Timestamp(v) => v,
            SqlValue::TimestampTz(v) => v,
            SqlValue::Uuid(v) => v,
            SqlValue::Json(v) => v,
        }
    }
}

fn pg_params(args: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(SqlValue::pg_param).collect()
}

fn decode_cell(row: &PgRow, index: usize, ty: &Type) -> QueryResult<SqlValue> {
    macro_rules! cell {
        ($t:ty, $variant:ident) => {
            row.try_get::<_, Option<$t>>(index)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::$variant))
                .map_err(QueryError::from)
        };
    }
    if *ty == Type::BOOL {
        cell!(bool, Boolean)
    } else if *ty == Type::INT2 {
        cell!(i16, SmallInt)
    } else if *ty == Type::INT4 {
        cell!(i32, Integer)
    } else if *ty == Type::INT8 {
        cell!(i64, BigInt)
    } else if *ty == Type::FLOAT4 {
        cell!(f32, Real)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        cell!(String, Text)
    } else if *ty == Type::FLOAT8 {
        cell!(f64, Double)
    } else if *ty == Type::BYTEA {
        cell!(Vec<u8>, Bytes)
    } else if *ty == Type::DATE {
        cell!(chrono::NaiveDate, Date)
    } else if *ty == Type::TIME {
        cell!(chrono::NaiveTime, Time)
    } else if *ty == Type::TIMESTAMP {
        cell!(chrono::NaiveDateTime, Timestamp)
    } else if *ty == Type::TIMESTAMPTZ {
        cell!(chrono::DateTime<chrono::Utc>, TimestampTz)
    } else if *ty == Type::UUID {
        cell!(uuid::Uuid, Uuid)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        cell!(serde_json::Value, Json)
    } else {
        Err(QueryError::Unsupported(format!(
            "cannot decode column of type {ty}"
        )))
    }
}

/// Decode a `tokio_postgres` row into a [`Row`] of labels and values.
pub fn decode_row(row: &PgRow) -> QueryResult<Row> {
    let mut labels = Vec::with_capacity(row.columns().len());
    let mut values = Vec::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        labels.push(column.name().to_string());
        values.push(decode_cell(row, index, column.type_())?);
    }
    Row::new(labels, values)
}

macro_rules! impl_select_fetch {
    ($($state:ident),+) => {
        $(
            impl<R: Table, P: Projection> $state<R, P> {
                /// Execute and map every row.
                pub async fn fetch_all(&self, client: &impl GenericClient) -> QueryResult<Vec<P::Output>> {
                    let prepared = self.prepare()?;
                    let rows = client.query(&prepared.sql, &pg_params(&prepared.args)).await?;
                    rows.iter()
                        .map(|row| (prepared.row_mapper)(&decode_row(row)?))
                        .collect()
                }

                /// Execute and map at most one row.
                pub async fn fetch_opt(&self, client: &impl GenericClient) -> QueryResult<Option<P::Output>> {
                    let mut all = self.fetch_all(client).await?;
                    Ok(if all.is_empty() { None } else { Some(all.swap_remove(0)) })
                }

                /// Execute and map exactly one row.
                pub async fn fetch_one(&self, client: &impl GenericClient) -> QueryResult<P::Output> {
                    self.fetch_opt(client)
                        .await?
                        .ok_or_else(|| QueryError::NotFound("query returned no rows".to_string()))
                }
            }
        )+
    };
}

impl_select_fetch!(Select, SelectWhere, SelectHaving);

macro_rules! impl_dml_execute {
    ($($stmt:ident),+ $(,)?) => {
        $(
            impl<R: Table> $stmt<R> {
                /// Execute, returning the affected-row count.
                pub async fn execute(&self, client: &impl GenericClient) -> QueryResult<u64> {
                    let (sql, args) = self.prepare()?;
                    client.execute(&sql, &pg_params(&args)).await
                }
            }
        )+
    };
}

impl_dml_execute!(Insert, Update, UpdateWhere, Delete, DeleteWhere);
