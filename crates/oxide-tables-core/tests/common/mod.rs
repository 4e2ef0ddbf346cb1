#![allow(dead_code)]

use std::sync::Mutex;

use oxide_tables_core::ast::SqlType;
use oxide_tables_core::dialect::Dialect;
use oxide_tables_core::executor::{Executor, RawRow};
use oxide_tables_core::schema::{integer, varchar, Tables};
use oxide_tables_core::value::SqlValue;
use oxide_tables_derive::Entity;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Entity)]
pub struct Role {
    pub id: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Entity)]
pub struct User {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub alias: Option<String>,
    pub role_id: i32,
}

/// `roles(id, label)` and `users(id, fname, lname, alias, role_id)`.
pub fn tables(dialect: Dialect) -> Tables {
    Tables::builder(dialect)
        .table::<Role>("roles", |t| {
            t.column(integer(Role::ID).primary_key())
                .column(varchar(Role::LABEL))
        })
        .table::<User>("users", |t| {
            t.column(varchar(User::ID).primary_key())
                .column(varchar(User::FIRSTNAME).name("fname"))
                .column(varchar(User::LASTNAME).name("lname"))
                .column(varchar(User::ALIAS))
                .column(integer(User::ROLE_ID).foreign_key::<Role>())
        })
        .build()
        .unwrap_or_else(|e| panic!("fixture tables are valid: {e}"))
}

pub fn jdoe() -> User {
    User {
        id: String::from("jdoe"),
        firstname: String::from("John"),
        lastname: String::from("Doe"),
        alias: None,
        role_id: 1,
    }
}

pub fn bboss() -> User {
    User {
        id: String::from("bboss"),
        firstname: String::from("Big"),
        lastname: String::from("Boss"),
        alias: Some(String::from("TheBoss")),
        role_id: 2,
    }
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

/// Column values of `user`, in `users` column order.
pub fn user_row(user: &User) -> Vec<SqlValue> {
    vec![
        text(&user.id),
        text(&user.firstname),
        text(&user.lastname),
        user.alias.as_deref().map_or(SqlValue::Null, text),
        SqlValue::Int(i64::from(user.role_id)),
    ]
}

// =============================================================================
// In-memory executor
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CannedError(pub String);

#[derive(Debug, Clone)]
pub struct CannedRow(pub Vec<SqlValue>);

impl RawRow for CannedRow {
    type Error = CannedError;

    fn get(&self, index: usize, _sql_type: SqlType) -> Result<SqlValue, Self::Error> {
        self.0
            .get(index)
            .cloned()
            .ok_or_else(|| CannedError(format!("no column {index}")))
    }
}

/// Returns the same canned rows to every query and records every statement.
#[derive(Debug, Default)]
pub struct CannedExecutor {
    rows: Vec<Vec<SqlValue>>,
    affected: u64,
    failure: Option<String>,
    log: Mutex<Vec<(String, Vec<SqlValue>)>>,
}

impl CannedExecutor {
    pub fn returning(rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn affecting(affected: u64) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(String::from(message)),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[SqlValue]) -> Result<(), CannedError> {
        self.log
            .lock()
            .unwrap()
            .push((String::from(sql), params.to_vec()));
        match &self.failure {
            Some(message) => Err(CannedError(message.clone())),
            None => Ok(()),
        }
    }
}

impl Executor for CannedExecutor {
    type Row = CannedRow;
    type Error = CannedError;

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, Self::Error> {
        self.record(sql, params)?;
        Ok(self.affected)
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Self::Row>, Self::Error> {
        self.record(sql, params)?;
        Ok(self.rows.iter().cloned().map(CannedRow).collect())
    }
}
