//! Table declarations and the metadata kept for each mapped table.

use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::value::{ColumnValue, SqlValue};

use super::column::{Accessor, Column, ColumnBuilder, ColumnDecl};
use super::key::{ForeignKey, PrimaryKey};
use super::property::{ColumnKey, PropertyRef};

// =============================================================================
// Typestate Markers
// =============================================================================

/// Marker: table has no columns.
#[derive(Debug, Clone, Copy)]
pub struct NoColumns;

/// Marker: table has at least one column.
#[derive(Debug, Clone, Copy)]
pub struct HasColumns;

// =============================================================================
// TableBuilder
// =============================================================================

/// Composite foreign key declared at table level.
pub(crate) struct TableForeignKey {
    pub(crate) name: Option<String>,
    pub(crate) columns: Vec<ColumnKey>,
    pub(crate) target: TypeId,
    pub(crate) target_name: &'static str,
    pub(crate) references: Vec<ColumnKey>,
}

/// Declares the columns and keys of the table mapped to `E`.
///
/// Uses the typestate pattern so that a table cannot be registered before its
/// first column is declared. Key constraints are checked when the table is
/// registered.
///
/// # Example
///
/// ```rust
/// use oxide_tables_core::dialect::Dialect;
/// use oxide_tables_core::schema::{varchar, Property, Tables};
///
/// struct Role {
///     id: String,
///     label: String,
/// }
///
/// impl Role {
///     const ID: Property<Self, String> = Property::new("id", |r: &Self| r.id.clone());
///     const LABEL: Property<Self, String> = Property::new("label", |r: &Self| r.label.clone());
/// }
///
/// let tables = Tables::builder(Dialect::Postgresql)
///     .table::<Role>("roles", |t| {
///         t.column(varchar(Role::ID).primary_key())
///             .column(varchar(Role::LABEL))
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(tables.table::<Role>().unwrap().name(), "roles");
/// ```
#[must_use]
pub struct TableBuilder<E, Cols> {
    pub(crate) name: String,
    pub(crate) columns: Vec<ColumnDecl<E>>,
    pub(crate) primary_key: Option<(Option<String>, Vec<ColumnKey>)>,
    pub(crate) foreign_keys: Vec<TableForeignKey>,
    _state: PhantomData<Cols>,
}

impl<E: 'static> TableBuilder<E, NoColumns> {
    /// Starts the declaration of table `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            _state: PhantomData,
        }
    }
}

impl<E: 'static, Cols> TableBuilder<E, Cols> {
    /// Adds a column. Columns keep their declaration order.
    pub fn column<V: ColumnValue, K>(
        self,
        column: ColumnBuilder<E, V, K>,
    ) -> TableBuilder<E, HasColumns> {
        let mut columns = self.columns;
        columns.push(column.into_decl());
        TableBuilder {
            name: self.name,
            columns,
            primary_key: self.primary_key,
            foreign_keys: self.foreign_keys,
            _state: PhantomData,
        }
    }
}

impl<E: 'static> TableBuilder<E, HasColumns> {
    /// Declares a primary key over several columns.
    pub fn primary_key(mut self, columns: &[&dyn PropertyRef<E>]) -> Self {
        self.primary_key = Some((None, keys(columns)));
        self
    }

    /// Declares a named primary key over several columns.
    pub fn primary_key_named(
        mut self,
        name: impl Into<String>,
        columns: &[&dyn PropertyRef<E>],
    ) -> Self {
        self.primary_key = Some((Some(name.into()), keys(columns)));
        self
    }

    /// Declares a foreign key from `columns` to `references` of the table
    /// mapped to `R`.
    pub fn foreign_key<R: 'static>(
        mut self,
        columns: &[&dyn PropertyRef<E>],
        references: &[&dyn PropertyRef<R>],
    ) -> Self {
        self.foreign_keys
            .push(table_foreign_key(None, columns, references));
        self
    }

    /// Declares a named foreign key from `columns` to `references` of the
    /// table mapped to `R`.
    pub fn foreign_key_named<R: 'static>(
        mut self,
        name: impl Into<String>,
        columns: &[&dyn PropertyRef<E>],
        references: &[&dyn PropertyRef<R>],
    ) -> Self {
        self.foreign_keys
            .push(table_foreign_key(Some(name.into()), columns, references));
        self
    }
}

fn keys<T>(properties: &[&dyn PropertyRef<T>]) -> Vec<ColumnKey> {
    properties.iter().map(|p| p.column_key()).collect()
}

fn table_foreign_key<E, R: 'static>(
    name: Option<String>,
    columns: &[&dyn PropertyRef<E>],
    references: &[&dyn PropertyRef<R>],
) -> TableForeignKey {
    TableForeignKey {
        name,
        columns: keys(columns),
        target: TypeId::of::<R>(),
        target_name: type_name::<R>(),
        references: keys(references),
    }
}

// =============================================================================
// Registered tables
// =============================================================================

/// Metadata of a registered table, independent of the record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub(crate) entity: TypeId,
    pub(crate) entity_name: &'static str,
    pub(crate) name: String,
    pub(crate) columns: Vec<Column>,
    pub(crate) primary_key: Option<PrimaryKey>,
    pub(crate) foreign_keys: Vec<ForeignKey>,
}

impl TableMeta {
    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type id of the mapped record type.
    #[must_use]
    pub const fn entity(&self) -> TypeId {
        self.entity
    }

    /// Type name of the mapped record type.
    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Primary key, if declared.
    #[must_use]
    pub const fn primary_key(&self) -> Option<&PrimaryKey> {
        self.primary_key.as_ref()
    }

    /// Foreign keys in declaration order.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Looks up the column mapping `key`.
    #[must_use]
    pub fn column(&self, key: ColumnKey) -> Option<&Column> {
        self.columns.iter().find(|c| c.key() == key)
    }
}

/// A registered table of record type `E`.
pub struct Table<E> {
    meta: Arc<TableMeta>,
    accessors: Vec<Accessor<E>>,
}

impl<E> Table<E> {
    pub(crate) fn new(meta: Arc<TableMeta>, accessors: Vec<Accessor<E>>) -> Self {
        Self { meta, accessors }
    }

    /// Table metadata.
    #[must_use]
    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        self.meta.columns()
    }

    /// Reads every column value of `entity`, in column order.
    pub fn values(&self, entity: &E) -> Vec<SqlValue> {
        self.accessors.iter().map(|read| read(entity)).collect()
    }
}

impl<E> fmt::Debug for Table<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table").field("meta", &self.meta).finish()
    }
}
