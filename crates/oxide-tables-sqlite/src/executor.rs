//! [`Executor`] implementation over a sqlx SQLite pool.

use oxide_tables_core::ast::SqlType;
use oxide_tables_core::executor::{Executor, RawRow};
use oxide_tables_core::value::SqlValue;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::debug;

/// Runs compiled statements on a SQLite database.
///
/// Each call borrows one connection from the pool for the duration of the
/// statement.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// Connects to the database at `url`, e.g. `sqlite://app.db?mode=rwc`.
    ///
    /// # Errors
    ///
    /// Returns the driver error when the database cannot be opened.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        debug!(url = %url, "Connecting to SQLite");
        let pool = SqlitePool::connect(url).await?;
        Ok(Self { pool })
    }

    /// Opens a private in-memory database.
    ///
    /// The pool keeps a single connection open for its whole lifetime, as the
    /// database disappears with its last connection.
    ///
    /// # Errors
    ///
    /// Returns the driver error when the database cannot be opened.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Executor for SqliteExecutor {
    type Row = SqliteRecord;
    type Error = sqlx::Error;

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, Self::Error> {
        debug!(sql = %sql, "Executing SQL");
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Self::Row>, Self::Error> {
        debug!(sql = %sql, "Executing SQL");
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(SqliteRecord).collect())
    }
}

/// One row returned by SQLite.
pub struct SqliteRecord(SqliteRow);

impl std::fmt::Debug for SqliteRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SqliteRecord").finish_non_exhaustive()
    }
}

impl SqliteRecord {
    /// The driver row.
    #[must_use]
    pub const fn inner(&self) -> &SqliteRow {
        &self.0
    }
}

impl RawRow for SqliteRecord {
    type Error = sqlx::Error;

    fn get(&self, index: usize, sql_type: SqlType) -> Result<SqlValue, Self::Error> {
        // BOOLEAN and INTEGER are stored as integers, everything else as text.
        let value = match sql_type {
            SqlType::Boolean => self
                .0
                .try_get::<Option<bool>, _>(index)?
                .map(SqlValue::Bool),
            SqlType::Integer | SqlType::Serial => self
                .0
                .try_get::<Option<i64>, _>(index)?
                .map(SqlValue::Int),
            _ => self
                .0
                .try_get::<Option<String>, _>(index)?
                .map(SqlValue::Text),
        };
        Ok(value.unwrap_or(SqlValue::Null))
    }
}

fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Uuid(u) => query.bind(u.hyphenated().to_string()),
        SqlValue::Date(d) => query.bind(*d),
        SqlValue::Time(t) => query.bind(*t),
        SqlValue::DateTime(dt) => query.bind(*dt),
        SqlValue::TimestampTz(dt) => query.bind(*dt),
    }
}
