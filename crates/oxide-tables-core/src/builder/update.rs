//! UPDATE builder.

use std::any::TypeId;
use std::marker::PhantomData;

use crate::ast::{Assignment, JoinKind, Statement, UpdateStatement};
use crate::error::{Error, Result};
use crate::executor::{execute, Executor};
use crate::generator::{generate, CompiledStatement};
use crate::schema::{ColumnKey, Property, Tables};
use crate::value::{ColumnValue, SqlValue};

use super::{
    Assigned, CanAssign, CanJoin, Clauses, Filtered, JoinOn, Joined, Joining, Predicate,
    Runnable, Unassigned,
};

impl Tables {
    /// Starts an UPDATE of the table mapped to `E`.
    pub fn update<E: 'static>(&self) -> Update<'_, E, Unassigned> {
        Update {
            clauses: Clauses::new::<E>(self),
            assignments: Vec::new(),
            _state: PhantomData,
        }
    }
}

/// An UPDATE of the table mapped to `E`.
///
/// `execute` is only available once at least one column is assigned.
#[must_use]
pub struct Update<'a, E, S> {
    clauses: Clauses<'a>,
    assignments: Vec<(ColumnKey, SqlValue)>,
    _state: PhantomData<fn() -> (E, S)>,
}

impl<'a, E, S> Update<'a, E, S> {
    fn into_state<S2>(self) -> Update<'a, E, S2> {
        Update {
            clauses: self.clauses,
            assignments: self.assignments,
            _state: PhantomData,
        }
    }
}

impl<'a, E: 'static, S: CanAssign> Update<'a, E, S> {
    /// Assigns `value` to the column mapping `property`. Assigning the same
    /// column again replaces the earlier value.
    pub fn set<V: ColumnValue>(mut self, property: Property<E, V>, value: V) -> Update<'a, E, Assigned> {
        let key = property.key();
        let value = value.to_sql_value();
        match self.assignments.iter_mut().find(|(k, _)| *k == key) {
            Some(assignment) => assignment.1 = value,
            None => self.assignments.push((key, value)),
        }
        self.into_state()
    }
}

impl<'a, E, S: CanJoin + Runnable> Update<'a, E, S> {
    /// Restricts the update to rows having a match in the table mapped to
    /// `R`.
    pub fn inner_join<R: 'static>(self) -> JoinOn<Self, R> {
        JoinOn::new(self, JoinKind::Inner)
    }

    /// Adds the WHERE predicate.
    pub fn where_clause(mut self, predicate: Predicate) -> Update<'a, E, Filtered> {
        self.clauses.filter(predicate);
        self.into_state()
    }
}

impl<'a, E, S: CanJoin + Runnable> Joining for Update<'a, E, S> {
    type Joined = Update<'a, E, Joined>;

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

impl<E> Update<'_, E, Filtered> {
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

impl<E, S: Runnable> Update<'_, E, S> {
    /// Compiles the statement without running it.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building the statement, or
    /// [`Error::Validation`] when NULL is assigned to a non-nullable column.
    pub fn compile(self) -> Result<CompiledStatement> {
        let dialect = self.clauses.tables().dialect();
        let resolved = self.clauses.resolve()?;
        let assignments = self
            .assignments
            .into_iter()
            .map(|(key, value)| {
                let column = resolved.root.column(key).ok_or_else(|| {
                    Error::validation(format!(
                        "property `{key}` is not a column of `{}`",
                        resolved.root.name()
                    ))
                })?;
                if value.is_null() && !column.is_nullable() {
                    return Err(Error::validation(format!(
                        "column `{}` cannot be set to NULL",
                        column.qualified_name()
                    )));
                }
                Ok(Assignment {
                    column: String::from(column.name()),
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let statement = Statement::Update(UpdateStatement {
            table: String::from(resolved.root.name()),
            assignments,
            joins: resolved.joins,
            filter: resolved.filter,
        });
        generate(&statement, dialect)
    }

    /// Runs the statement and returns the number of updated rows.
    ///
    /// # Errors
    ///
    /// Returns build errors before anything is sent, then execution errors.
    pub async fn execute<X: Executor>(self, executor: &X) -> Result<u64> {
        let statement = self.compile()?;
        execute(executor, &statement).await
    }
}
