//! DELETE builders.
//!
//! [`Delete`] needs a join or a WHERE predicate before it can run, so a
//! forgotten predicate does not compile:
//!
//! ```compile_fail
//! # use oxide_tables_core::schema::Tables;
//! # struct User;
//! # async fn run(tables: &Tables, executor: &impl oxide_tables_core::executor::Executor) {
//! tables.delete_from::<User>().execute(executor).await;
//! # }
//! ```
//!
//! Deleting every row is the explicit [`DeleteAll`] statement, started with
//! [`Tables::delete_all_from`].

use std::any::TypeId;
use std::marker::PhantomData;

use crate::ast::{DeleteStatement, JoinKind, Statement};
use crate::error::Result;
use crate::executor::{execute, Executor};
use crate::generator::{generate, CompiledStatement};
use crate::schema::{ColumnKey, Tables};

use super::{CanJoin, Clauses, Filtered, Initial, JoinOn, Joined, Joining, Predicate, Runnable};

impl Tables {
    /// Starts a DELETE of some rows of the table mapped to `E`.
    pub fn delete_from<E: 'static>(&self) -> Delete<'_, E, Initial> {
        Delete {
            clauses: Clauses::new::<E>(self),
            _state: PhantomData,
        }
    }

    /// Starts a DELETE of every row of the table mapped to `E`.
    pub fn delete_all_from<E: 'static>(&self) -> DeleteAll<'_, E> {
        DeleteAll {
            clauses: Clauses::new::<E>(self),
            _entity: PhantomData,
        }
    }
}

/// A DELETE restricted by joins or a predicate.
#[must_use]
pub struct Delete<'a, E, S> {
    clauses: Clauses<'a>,
    _state: PhantomData<fn() -> (E, S)>,
}

impl<'a, E, S> Delete<'a, E, S> {
    fn into_state<S2>(self) -> Delete<'a, E, S2> {
        Delete {
            clauses: self.clauses,
            _state: PhantomData,
        }
    }
}

impl<'a, E, S: CanJoin> Delete<'a, E, S> {
    /// Restricts the delete to rows having a match in the table mapped to
    /// `R`.
    pub fn inner_join<R: 'static>(self) -> JoinOn<Self, R> {
        JoinOn::new(self, JoinKind::Inner)
    }

    /// Adds the WHERE predicate.
    pub fn where_clause(mut self, predicate: Predicate) -> Delete<'a, E, Filtered> {
        self.clauses.filter(predicate);
        self.into_state()
    }
}

impl<'a, E, S: CanJoin> Joining for Delete<'a, E, S> {
    type Joined = Delete<'a, E, Joined>;

    fn join_on(
        mut self,
        kind: JoinKind,
        target: TypeId,
        target_name: &'static str,
        local: ColumnKey,
    ) -> Self::Joined {
        self.clauses.join(kind, target, target_name, local);
        self.into_state()
    }
}

impl<E> Delete<'_, E, Filtered> {
    /// `<current predicate> AND predicate`
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.clauses.and(predicate);
        self
    }

    /// `<current predicate> OR predicate`
    pub fn or(mut self, predicate: Predicate) -> Self {
        self.clauses.or(predicate);
        self
    }
}

impl<E, S: Runnable> Delete<'_, E, S> {
    /// Compiles the statement without running it.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building the statement.
    pub fn compile(self) -> Result<CompiledStatement> {
        compile(self.clauses)
    }

    /// Runs the statement and returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns build errors before anything is sent, then execution errors.
    pub async fn execute<X: Executor>(self, executor: &X) -> Result<u64> {
        let statement = self.compile()?;
        execute(executor, &statement).await
    }
}

/// A DELETE of every row of the table mapped to `E`.
#[must_use]
pub struct DeleteAll<'a, E> {
    clauses: Clauses<'a>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> DeleteAll<'_, E> {
    /// Compiles the statement without running it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::error::Error::Validation) when `E`
    /// is not mapped.
    pub fn compile(self) -> Result<CompiledStatement> {
        compile(self.clauses)
    }

    /// Runs the statement and returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns build errors before anything is sent, then execution errors.
    pub async fn execute<X: Executor>(self, executor: &X) -> Result<u64> {
        let statement = self.compile()?;
        execute(executor, &statement).await
    }
}

fn compile(clauses: Clauses<'_>) -> Result<CompiledStatement> {
    let dialect = clauses.tables().dialect();
    let resolved = clauses.resolve()?;
    let statement = Statement::Delete(DeleteStatement {
        table: String::from(resolved.root.name()),
        joins: resolved.joins,
        filter: resolved.filter,
    });
    generate(&statement, dialect)
}
