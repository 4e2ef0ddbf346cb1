//! Typed statement builders.
//!
//! Statements are started from a [`Tables`] registry and move through a
//! forward-only pipeline encoded with the typestate pattern:
//!
//! - SELECT: projection, joins, WHERE (with `and`/`or` chains), then
//!   `fetch_one`, `fetch_first` or `fetch_all`.
//! - UPDATE: at least one `set`, joins, WHERE, then `execute`.
//! - DELETE: joins or WHERE, then `execute`. Deleting every row is the
//!   separate [`DeleteAll`] statement.
//!
//! Each state only exposes the operations legal from it. Errors found while
//! building (an unmapped type, a join with no foreign key) are recorded and
//! returned by `compile` or the terminal operation, before any SQL is produced.
//!
//! ```rust
//! use oxide_tables_core::dialect::Dialect;
//! use oxide_tables_core::schema::{varchar, Property, Tables};
//!
//! struct User {
//!     id: String,
//!     lastname: String,
//! }
//!
//! impl User {
//!     const ID: Property<Self, String> = Property::new("id", |u: &Self| u.id.clone());
//!     const LASTNAME: Property<Self, String> =
//!         Property::new("lastname", |u: &Self| u.lastname.clone());
//! }
//!
//! let tables = Tables::builder(Dialect::Postgresql)
//!     .table::<User>("users", |t| {
//!         t.column(varchar(User::ID).primary_key())
//!             .column(varchar(User::LASTNAME).name("lname"))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let compiled = tables
//!     .update::<User>()
//!     .set(User::LASTNAME, String::from("Doe"))
//!     .where_clause(User::ID.eq(String::from("jdoe")))
//!     .compile()
//!     .unwrap();
//!
//! assert_eq!(compiled.sql, "UPDATE users SET lname = $1 WHERE users.id = $2");
//! ```

mod create;
mod delete;
mod insert;
mod predicate;
mod select;
mod update;

use std::any::{type_name, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::ast::{ColumnRef, Condition, Join, JoinKind};
use crate::error::{Error, Result};
use crate::schema::{unmapped, ColumnKey, Property, TableMeta, Tables};

pub use create::{CreateAllTables, CreateTable};
pub use delete::{Delete, DeleteAll};
pub use insert::Insert;
pub use predicate::Predicate;
pub use select::{Projection, Select};
pub use update::Update;

// =============================================================================
// Typestate Markers
// =============================================================================

/// Marker: statement started, nothing added yet.
#[derive(Debug, Clone, Copy)]
pub struct Initial;

/// Marker: at least one table has been joined.
#[derive(Debug, Clone, Copy)]
pub struct Joined;

/// Marker: a WHERE predicate has been given.
#[derive(Debug, Clone, Copy)]
pub struct Filtered;

/// Marker: UPDATE without any assignment yet.
#[derive(Debug, Clone, Copy)]
pub struct Unassigned;

/// Marker: UPDATE with at least one assignment.
#[derive(Debug, Clone, Copy)]
pub struct Assigned;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Initial {}
    impl Sealed for super::Joined {}
    impl Sealed for super::Filtered {}
    impl Sealed for super::Unassigned {}
    impl Sealed for super::Assigned {}
}

/// States from which tables can be joined and a WHERE predicate given.
pub trait CanJoin: sealed::Sealed {}

impl CanJoin for Initial {}
impl CanJoin for Assigned {}
impl CanJoin for Joined {}

/// States of an UPDATE accepting assignments.
pub trait CanAssign: sealed::Sealed {}

impl CanAssign for Unassigned {}
impl CanAssign for Assigned {}

/// States of UPDATE and DELETE that can be executed.
pub trait Runnable: sealed::Sealed {}

impl Runnable for Assigned {}
impl Runnable for Joined {}
impl Runnable for Filtered {}

// =============================================================================
// Joins
// =============================================================================

/// A builder that accepts joins.
pub trait Joining: Sized {
    /// Builder state after the join.
    type Joined;

    #[doc(hidden)]
    fn join_on(
        self,
        kind: JoinKind,
        target: TypeId,
        target_name: &'static str,
        local: ColumnKey,
    ) -> Self::Joined;
}

/// A pending join of the table mapped to `R`, waiting for its join column.
#[must_use]
pub struct JoinOn<B, R> {
    builder: B,
    kind: JoinKind,
    _related: PhantomData<fn() -> R>,
}

impl<B: Joining, R: 'static> JoinOn<B, R> {
    pub(crate) const fn new(builder: B, kind: JoinKind) -> Self {
        Self {
            builder,
            kind,
            _related: PhantomData,
        }
    }

    /// Joins through the foreign key containing `column`.
    ///
    /// `column` is either a foreign key column of a table already in the
    /// statement referencing `R`, or a foreign key column of `R` referencing a
    /// table already in the statement. When no such foreign key is declared,
    /// the statement fails with [`Error::Mapping`].
    pub fn on<X: 'static, V>(self, column: Property<X, V>) -> B::Joined {
        self.builder
            .join_on(self.kind, TypeId::of::<R>(), type_name::<R>(), column.key())
    }
}

// =============================================================================
// Shared clause state
// =============================================================================

struct PendingJoin {
    kind: JoinKind,
    table: Arc<TableMeta>,
    on: Vec<(ColumnKey, ColumnKey)>,
}

/// Tables, joins and predicate accumulated by a statement builder.
pub(crate) struct Clauses<'a> {
    tables: &'a Tables,
    root: Option<Arc<TableMeta>>,
    joins: Vec<PendingJoin>,
    filter: Option<Predicate>,
    error: Option<Error>,
}

/// Clauses resolved against the registry.
pub(crate) struct Resolved {
    pub(crate) root: Arc<TableMeta>,
    pub(crate) scope: Vec<Arc<TableMeta>>,
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Option<Condition>,
}

impl<'a> Clauses<'a> {
    pub(crate) fn new<E: 'static>(tables: &'a Tables) -> Self {
        let root = tables.meta_of(TypeId::of::<E>()).cloned();
        let error = root
            .is_none()
            .then(|| Error::validation(unmapped::<E>()));
        Self {
            tables,
            root,
            joins: Vec::new(),
            filter: None,
            error,
        }
    }

    pub(crate) const fn tables(&self) -> &'a Tables {
        self.tables
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub(crate) fn join(
        &mut self,
        kind: JoinKind,
        target: TypeId,
        target_name: &'static str,
        column: ColumnKey,
    ) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.try_join(kind, target, target_name, column) {
            self.fail(err);
        }
    }

    fn try_join(
        &mut self,
        kind: JoinKind,
        target: TypeId,
        target_name: &'static str,
        column: ColumnKey,
    ) -> Result<()> {
        let related = self.tables.meta_of(target).cloned().ok_or_else(|| {
            Error::validation(format!(
                "type `{target_name}` is not mapped to a table"
            ))
        })?;
        if self.scope().any(|m| m.entity() == target) {
            return Err(Error::validation(format!(
                "table `{}` is already part of the statement",
                related.name()
            )));
        }

        let on = if let Some(owner) = self.scope().find(|m| m.entity() == column.entity()) {
            owner
                .foreign_keys()
                .iter()
                .find(|fk| fk.referenced_entity() == Some(target) && fk.columns().contains(&column))
                .map(|fk| fk.pairs().collect::<Vec<_>>())
        } else if column.entity() == target {
            related
                .foreign_keys()
                .iter()
                .find(|fk| {
                    fk.columns().contains(&column)
                        && self
                            .scope()
                            .any(|m| fk.referenced_entity() == Some(m.entity()))
                })
                .map(|fk| fk.pairs().map(|(local, remote)| (remote, local)).collect())
        } else {
            return Err(Error::validation(format!(
                "column `{column}` belongs neither to the statement nor to `{}`",
                related.name()
            )));
        };

        let on = on.ok_or_else(|| {
            Error::mapping(format!(
                "no foreign key through `{column}` links `{}` to the statement",
                related.name()
            ))
        })?;
        self.joins.push(PendingJoin {
            kind,
            table: related,
            on,
        });
        Ok(())
    }

    pub(crate) fn filter(&mut self, predicate: Predicate) {
        self.filter = Some(predicate);
    }

    pub(crate) fn and(&mut self, predicate: Predicate) {
        self.filter = Some(match self.filter.take() {
            Some(filter) => filter.and(predicate),
            None => predicate,
        });
    }

    pub(crate) fn or(&mut self, predicate: Predicate) {
        self.filter = Some(match self.filter.take() {
            Some(filter) => filter.or(predicate),
            None => predicate,
        });
    }

    fn scope(&self) -> impl Iterator<Item = &Arc<TableMeta>> {
        self.root.iter().chain(self.joins.iter().map(|j| &j.table))
    }

    fn column_ref(&self, key: ColumnKey) -> Result<ColumnRef> {
        self.scope()
            .find_map(|meta| meta.column(key))
            .map(|c| ColumnRef::new(c.table(), c.name()))
            .ok_or_else(|| {
                Error::validation(format!(
                    "column `{key}` does not belong to a table of the statement"
                ))
            })
    }

    /// Resolves the operand of `IS [NOT] NULL`. A NOT NULL column only
    /// qualifies when its table is left-joined, where a missing match reads
    /// as NULL.
    fn nullable_ref(&self, key: ColumnKey) -> Result<ColumnRef> {
        let outer = self
            .joins
            .iter()
            .any(|j| j.kind == JoinKind::LeftOuter && j.table.entity() == key.entity());
        let column = self
            .scope()
            .find_map(|meta| meta.column(key))
            .ok_or_else(|| {
                Error::validation(format!(
                    "column `{key}` does not belong to a table of the statement"
                ))
            })?;
        if !column.is_nullable() && !outer {
            return Err(Error::validation(format!(
                "column `{}` is NOT NULL and cannot be compared with NULL",
                column.qualified_name()
            )));
        }
        Ok(ColumnRef::new(column.table(), column.name()))
    }

    fn condition(&self, predicate: &Predicate) -> Result<Condition> {
        Ok(match predicate {
            Predicate::Compare { column, op, value } => Condition::Compare {
                column: self.column_ref(*column)?,
                op: *op,
                value: value.clone(),
            },
            Predicate::IsNull(column) => Condition::IsNull(self.nullable_ref(*column)?),
            Predicate::IsNotNull(column) => Condition::IsNotNull(self.nullable_ref(*column)?),
            Predicate::And(left, right) => self.condition(left)?.and(self.condition(right)?),
            Predicate::Or(left, right) => self.condition(left)?.or(self.condition(right)?),
        })
    }

    /// Returns the recorded error, or the clauses resolved to table and
    /// column names.
    pub(crate) fn resolve(self) -> Result<Resolved> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let filter = self
            .filter
            .as_ref()
            .map(|p| self.condition(p))
            .transpose()?;
        let joins = self
            .joins
            .iter()
            .map(|join| {
                let on = join
                    .on
                    .iter()
                    .map(|(l, r)| Ok((self.column_ref(*l)?, self.column_ref(*r)?)))
                    .collect::<Result<_>>()?;
                Ok(Join {
                    kind: join.kind,
                    table: String::from(join.table.name()),
                    on,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let scope: Vec<_> = self.scope().cloned().collect();
        let root = self
            .root
            .ok_or_else(|| Error::validation("statement has no table"))?;
        Ok(Resolved {
            root,
            scope,
            joins,
            filter,
        })
    }
}
