//! # oxide-tables-sqlite
//!
//! SQLite execution backend for `oxide-tables-core`, built on sqlx.
//!
//! # How SQLite storage differs from other dialects
//!
//! - **[Type affinity]**: BOOLEAN values are stored as `0`/`1` integers;
//!   UUID, DATE, TIME, DATETIME and TIMESTAMP values are stored as ISO-8601
//!   text. The generator converts parameters before binding and the row
//!   reader hands integers and text back to the core, which parses them.
//! - **Serial columns**: a SERIAL column is declared `INTEGER` and must be the
//!   single-column primary key, which makes it an alias of the [rowid].
//! - **In-memory databases**: each connection to `sqlite::memory:` opens its
//!   own database, so [`SqliteExecutor::in_memory`] keeps exactly one
//!   connection alive.
//!
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//! [rowid]: https://www.sqlite.org/lang_createtable.html#rowid
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_tables_core::dialect::Dialect;
//! use oxide_tables_core::schema::{varchar, Property, Tables};
//! use oxide_tables_sqlite::SqliteExecutor;
//!
//! struct Role {
//!     label: String,
//! }
//!
//! impl Role {
//!     const LABEL: Property<Self, String> = Property::new("label", |r: &Self| r.label.clone());
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tables = Tables::builder(Dialect::Sqlite)
//!     .table::<Role>("roles", |t| t.column(varchar(Role::LABEL).primary_key()))
//!     .build()?;
//! let executor = SqliteExecutor::in_memory().await?;
//!
//! tables.create_table::<Role>().execute(&executor).await?;
//! tables
//!     .insert_one(&Role { label: String::from("admin") })
//!     .execute(&executor)
//!     .await?;
//! let labels: Vec<String> = tables
//!     .select::<Role>()
//!     .map(|row| row.get(Role::LABEL))
//!     .fetch_all(&executor)
//!     .await?
//!     .collect::<Result<_, _>>()?;
//! # Ok(())
//! # }
//! ```

mod executor;

pub use executor::{SqliteExecutor, SqliteRecord};
