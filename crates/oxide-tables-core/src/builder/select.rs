//! SELECT builder.

use std::any::TypeId;
use std::marker::PhantomData;

use crate::ast::{ColumnRef, JoinKind, SelectStatement, Statement};
use crate::error::{Error, Result};
use crate::executor::{query, Executor};
use crate::generator::{generate, CompiledStatement};
use crate::row::{Entity, FetchAll, Projector, RowLayout, ValueProvider};
use crate::schema::{ColumnKey, Tables};

use super::{CanJoin, Clauses, Filtered, Initial, JoinOn, Joined, Joining, Predicate};

impl Tables {
    /// Starts a SELECT driven by the table mapped to `E`.
    pub fn select<E: 'static>(&self) -> Projection<'_, E> {
        Projection {
            tables: self,
            _entity: PhantomData,
        }
    }

    /// Shorthand for `select::<E>().all()`.
    pub fn select_all<E: Entity>(&self) -> Select<'_, E, Initial> {
        self.select::<E>().all()
    }
}

/// First stage of a SELECT: chooses what each row is turned into.
#[must_use]
pub struct Projection<'a, E> {
    tables: &'a Tables,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: 'static> Projection<'a, E> {
    /// Returns every row as an `E`.
    pub fn all(self) -> Select<'a, E, Initial>
    where
        E: Entity,
    {
        self.map(E::from_row)
    }

    /// Turns every row into a `T` with `projection`.
    ///
    /// The projection reads columns through the [`ValueProvider`]; the
    /// columns of every table of the statement are available.
    pub fn map<T>(
        self,
        projection: impl Fn(&ValueProvider<'_>) -> Result<T> + Send + Sync + 'a,
    ) -> Select<'a, T, Initial> {
        Select {
            clauses: Clauses::new::<E>(self.tables),
            projection: Box::new(projection),
            _state: PhantomData,
        }
    }
}

/// A SELECT producing values of type `T`.
///
/// The selected columns are every column of the driving table followed by
/// every column of each joined table, in declaration order.
#[must_use]
pub struct Select<'a, T, S> {
    clauses: Clauses<'a>,
    projection: Projector<'a, T>,
    _state: PhantomData<S>,
}

impl<'a, T, S> Select<'a, T, S> {
    fn into_state<S2>(self) -> Select<'a, T, S2> {
        Select {
            clauses: self.clauses,
            projection: self.projection,
            _state: PhantomData,
        }
    }
}

impl<'a, T, S: CanJoin> Select<'a, T, S> {
    /// Inner joins the table mapped to `R`.
    pub fn inner_join<R: 'static>(self) -> JoinOn<Self, R> {
        JoinOn::new(self, JoinKind::Inner)
    }

    /// Left outer joins the table mapped to `R`. Its columns read as NULL on
    /// rows without a match; see
    /// [`ValueProvider::get_optional`](crate::row::ValueProvider::get_optional).
    pub fn left_join<R: 'static>(self) -> JoinOn<Self, R> {
        JoinOn::new(self, JoinKind::LeftOuter)
    }

    /// Adds the WHERE predicate.
    pub fn where_clause(mut self, predicate: Predicate) -> Select<'a, T, Filtered> {
        self.clauses.filter(predicate);
        self.into_state()
    }
}

impl<'a, T, S: CanJoin> Joining for Select<'a, T, S> {
    type Joined = Select<'a, T, Joined>;

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

impl<T> Select<'_, T, Filtered> {
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

impl<'a, T, S> Select<'a, T, S> {
    /// Compiles the statement without running it.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building the statement.
    pub fn compile(self) -> Result<CompiledStatement> {
        prepare(self.clauses).map(|(statement, _)| statement)
    }

    /// Runs the query and returns its only row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cardinality`] when the query returns no row or
    /// several rows, besides build, execution and decoding errors.
    pub async fn fetch_one<X: Executor>(self, executor: &X) -> Result<T> {
        let (statement, layout) = prepare(self.clauses)?;
        let rows = query(executor, &statement).await?;
        match rows.as_slice() {
            [row] => layout.project(row, &self.projection),
            _ => Err(Error::Cardinality { rows: rows.len() }),
        }
    }

    /// Runs the query and returns its first row, if any.
    ///
    /// # Errors
    ///
    /// Returns build, execution and decoding errors. No row is not an error.
    pub async fn fetch_first<X: Executor>(self, executor: &X) -> Result<Option<T>> {
        let (statement, layout) = prepare(self.clauses)?;
        let rows = query(executor, &statement).await?;
        rows.first()
            .map(|row| layout.project(row, &self.projection))
            .transpose()
    }

    /// Runs the query and returns a lazy iterator over its rows.
    ///
    /// # Errors
    ///
    /// Returns build and execution errors. Decoding errors are reported by
    /// the iterator, row by row.
    pub async fn fetch_all<X: Executor>(self, executor: &X) -> Result<FetchAll<'a, X::Row, T>> {
        let (statement, layout) = prepare(self.clauses)?;
        let rows = query(executor, &statement).await?;
        Ok(FetchAll::new(rows, layout, self.projection))
    }
}

fn prepare(clauses: Clauses<'_>) -> Result<(CompiledStatement, RowLayout)> {
    let dialect = clauses.tables().dialect();
    let resolved = clauses.resolve()?;
    let layout = RowLayout::of_tables(&resolved.scope);
    let columns = resolved
        .scope
        .iter()
        .flat_map(|table| table.columns())
        .map(|c| ColumnRef::new(c.table(), c.name()))
        .collect();
    let statement = Statement::Select(SelectStatement {
        columns,
        from: String::from(resolved.root.name()),
        joins: resolved.joins,
        filter: resolved.filter,
    });
    Ok((generate(&statement, dialect)?, layout))
}
