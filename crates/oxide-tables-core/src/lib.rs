//! # oxide-tables-core
//!
//! A typed table-mapping registry and SQL statement builder.
//!
//! This crate provides:
//! - Explicit, typed property descriptors mapping plain structs to tables
//! - A registry validating tables, keys and dialect support once, at startup
//! - Typestate statement builders for CREATE TABLE, INSERT, SELECT, UPDATE and
//!   DELETE
//! - A SQL generator for H2, PostgreSQL and SQLite that binds every value as a
//!   parameter
//!
//! The crate does no I/O. Statements run through an [`Executor`], implemented
//! by a driver crate such as `oxide-tables-sqlite`.
//!
//! ## Declaring tables
//!
//! ```rust
//! use oxide_tables_core::dialect::Dialect;
//! use oxide_tables_core::schema::{varchar, Property, Tables};
//!
//! struct User {
//!     id: String,
//!     firstname: String,
//!     alias: Option<String>,
//! }
//!
//! impl User {
//!     const ID: Property<Self, String> = Property::new("id", |u: &Self| u.id.clone());
//!     const FIRSTNAME: Property<Self, String> =
//!         Property::new("firstname", |u: &Self| u.firstname.clone());
//!     const ALIAS: Property<Self, Option<String>> =
//!         Property::new("alias", |u: &Self| u.alias.clone());
//! }
//!
//! let tables = Tables::builder(Dialect::Sqlite)
//!     .table::<User>("users", |t| {
//!         t.column(varchar(User::ID).primary_key())
//!             .column(varchar(User::FIRSTNAME).name("fname"))
//!             .column(varchar(User::ALIAS))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let select = tables
//!     .select::<User>()
//!     .map(|row| row.get(User::FIRSTNAME))
//!     .where_clause(User::ALIAS.eq(None))
//!     .compile()
//!     .unwrap();
//!
//! assert_eq!(
//!     select.sql,
//!     "SELECT users.id, users.fname, users.alias FROM users WHERE users.alias IS NULL"
//! );
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values never reach the SQL text; they are returned as ordered parameters:
//!
//! ```rust
//! # use oxide_tables_core::dialect::Dialect;
//! # use oxide_tables_core::schema::{varchar, Property, Tables};
//! # use oxide_tables_core::value::SqlValue;
//! # struct User { id: String }
//! # impl User {
//! #     const ID: Property<Self, String> = Property::new("id", |u: &Self| u.id.clone());
//! # }
//! # let tables = Tables::builder(Dialect::Postgresql)
//! #     .table::<User>("users", |t| t.column(varchar(User::ID)))
//! #     .build()
//! #     .unwrap();
//! let user_input = String::from("'; DROP TABLE users; --");
//! let compiled = tables
//!     .delete_from::<User>()
//!     .where_clause(User::ID.eq(user_input.clone()))
//!     .compile()
//!     .unwrap();
//!
//! assert_eq!(compiled.sql, "DELETE FROM users WHERE users.id = $1");
//! assert_eq!(compiled.params, vec![SqlValue::Text(user_input)]);
//! ```

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod generator;
pub mod row;
pub mod schema;
pub mod value;

pub use dialect::Dialect;
pub use error::{Error, Result};
pub use executor::{Executor, RawRow};
pub use generator::CompiledStatement;
pub use row::{Entity, FetchAll, ValueProvider};
pub use schema::{Property, Tables};
pub use value::{ColumnValue, SqlValue};
