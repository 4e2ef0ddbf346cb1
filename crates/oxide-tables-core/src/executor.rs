//! The narrow contract between compiled statements and a database driver.
//!
//! The core never talks to a database. Backends implement [`Executor`] to run
//! SQL text with its ordered parameters, and [`RawRow`] to read one value of a
//! returned row by position and declared type.

use tracing::debug;

use crate::ast::SqlType;
use crate::error::{Error, Result};
use crate::generator::CompiledStatement;
use crate::value::SqlValue;

/// Runs SQL statements with bound parameters.
///
/// Parameters must be bound in slice order. Implementations should use at
/// most one connection per call.
#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Row type returned by [`query`](Self::query).
    type Row: RawRow;

    /// Error reported by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> std::result::Result<u64, Self::Error>;

    /// Runs a query and returns every row of its result.
    async fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> std::result::Result<Vec<Self::Row>, Self::Error>;
}

/// One row returned by an [`Executor`].
pub trait RawRow {
    /// Error reported when a value cannot be read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the value at `index` (0-based), declared as `sql_type`.
    ///
    /// NULL must be returned as [`SqlValue::Null`].
    fn get(&self, index: usize, sql_type: SqlType) -> std::result::Result<SqlValue, Self::Error>;
}

pub(crate) async fn execute<X: Executor>(executor: &X, statement: &CompiledStatement) -> Result<u64> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Running statement");
    executor
        .execute(&statement.sql, &statement.params)
        .await
        .map_err(|e| Error::execution(&statement.sql, e))
}

pub(crate) async fn query<X: Executor>(
    executor: &X,
    statement: &CompiledStatement,
) -> Result<Vec<X::Row>> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Running query");
    let rows = executor
        .query(&statement.sql, &statement.params)
        .await
        .map_err(|e| Error::execution(&statement.sql, e))?;
    debug!(rows = rows.len(), "Query returned");
    Ok(rows)
}
