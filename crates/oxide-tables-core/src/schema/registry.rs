//! The table registry.
//!
//! Tables are declared once through [`TablesBuilder`]; [`TablesBuilder::build`]
//! seals them into an immutable [`Tables`] value that can be shared freely
//! between threads. Every configuration error aborts the whole registry.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::ast::SqlType;
use crate::dialect::{AutoIncrement, Dialect};
use crate::error::{Error, Result};

use super::column::Column;
use super::key::{ForeignKey, PrimaryKey};
use super::property::{ColumnKey, Property};
use super::table::{HasColumns, NoColumns, Table, TableBuilder, TableMeta};

/// Collects table declarations for one dialect.
#[must_use]
pub struct TablesBuilder {
    dialect: Dialect,
    order: Vec<TypeId>,
    metas: HashMap<TypeId, Arc<TableMeta>>,
    typed: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    error: Option<Error>,
}

impl TablesBuilder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            order: Vec::new(),
            metas: HashMap::new(),
            typed: HashMap::new(),
            error: None,
        }
    }

    /// Dialect the tables are declared for.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Declares the table mapped to `E`.
    ///
    /// Errors are kept until [`build`](Self::build); declarations following a
    /// failed one are ignored.
    pub fn table<E: 'static>(
        mut self,
        name: impl Into<String>,
        declare: impl FnOnce(TableBuilder<E, NoColumns>) -> TableBuilder<E, HasColumns>,
    ) -> Self {
        if self.error.is_none() {
            let table = declare(TableBuilder::new(name));
            // The error is recorded and reported again by `build`.
            let _ = self.declare_table(table);
        }
        self
    }

    /// Validates and registers a table declaration.
    ///
    /// A failed declaration is recorded: [`build`](Self::build) then fails
    /// with the same error and later declarations are refused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mapping`] when `E` or the table name is already
    /// registered, a column name is used twice, a column type is not supported
    /// by the dialect, a key is malformed, or a foreign key references a table
    /// that is not registered yet. Once a declaration has failed, every later
    /// call returns an [`Error::Mapping`] naming that failure.
    pub fn declare_table<E: 'static, Cols>(
        &mut self,
        table: TableBuilder<E, Cols>,
    ) -> Result<&Table<E>> {
        if let Some(first) = &self.error {
            return Err(Error::mapping(format!(
                "an earlier table declaration failed: {first}"
            )));
        }
        let entity = TypeId::of::<E>();
        if let Err(err) = self.register(table) {
            return Err(self.record(err));
        }
        self.typed
            .get(&entity)
            .and_then(|t| t.downcast_ref::<Table<E>>())
            .ok_or_else(|| {
                Error::mapping(format!("table for `{}` was not stored", type_name::<E>()))
            })
    }

    /// Keeps a copy of `err` for `build` and hands the original back.
    fn record(&mut self, err: Error) -> Error {
        let kept = match &err {
            Error::Mapping(message) => Error::Mapping(message.clone()),
            other => Error::mapping(other.to_string()),
        };
        self.error = Some(kept);
        err
    }

    fn register<E: 'static, Cols>(&mut self, table: TableBuilder<E, Cols>) -> Result<()> {
        let entity = TypeId::of::<E>();
        let entity_name = type_name::<E>();
        let TableBuilder {
            name,
            columns: decls,
            primary_key: declared_pk,
            foreign_keys: declared_fks,
            ..
        } = table;

        if let Some(existing) = self.metas.get(&entity) {
            return Err(Error::mapping(format!(
                "type `{entity_name}` is already mapped to table `{}`",
                existing.name()
            )));
        }
        if self.metas.values().any(|m| m.name() == name) {
            return Err(Error::mapping(format!(
                "table name `{name}` is already used"
            )));
        }
        if decls.is_empty() {
            return Err(Error::mapping(format!("table `{name}` declares no column")));
        }

        let mut columns: Vec<Column> = Vec::with_capacity(decls.len());
        for decl in &decls {
            if !self.dialect.supports(decl.sql_type) {
                return Err(Error::mapping(format!(
                    "column `{name}.{}`: {} is not supported by {}",
                    decl.name, decl.sql_type, self.dialect
                )));
            }
            if columns.iter().any(|c| c.name() == decl.name) {
                return Err(Error::mapping(format!(
                    "column name `{}` is declared twice in table `{name}`",
                    decl.name
                )));
            }
            if columns.iter().any(|c| c.key() == decl.key) {
                return Err(Error::mapping(format!(
                    "property `{}` is mapped twice in table `{name}`",
                    decl.key.property()
                )));
            }
            columns.push(Column::new(
                decl.key,
                decl.name.clone(),
                name.clone(),
                decl.sql_type,
                decl.nullable,
            ));
        }

        let column_pks: Vec<_> = decls.iter().filter(|d| d.primary_key.is_some()).collect();
        let primary_key = match (column_pks.as_slice(), declared_pk) {
            ([], None) => None,
            ([decl], None) => Some(PrimaryKey::Single {
                name: decl.primary_key.clone().flatten(),
                column: decl.key,
            }),
            ([], Some((pk_name, keys))) => {
                Some(composite_primary_key(&name, &columns, pk_name, keys)?)
            }
            _ => {
                return Err(Error::mapping(format!(
                    "table `{name}` declares more than one primary key"
                )));
            }
        };

        if self.dialect.auto_increment() == AutoIncrement::RowIdAlias {
            for column in columns.iter().filter(|c| c.sql_type() == SqlType::Serial) {
                let sole_key = primary_key
                    .as_ref()
                    .is_some_and(|pk| pk.columns() == [column.key()]);
                if !sole_key {
                    return Err(Error::mapping(format!(
                        "serial column `{}` must be the single-column primary key on {}",
                        column.qualified_name(),
                        self.dialect
                    )));
                }
            }
        }

        let mut foreign_keys = Vec::new();
        for decl in &decls {
            let Some(fk) = &decl.foreign_key else {
                continue;
            };
            let target = self.registered(fk.target, fk.target_name, &name)?;
            let Some(pk) = target.primary_key() else {
                return Err(Error::mapping(format!(
                    "table `{}` referenced by `{name}.{}` has no primary key",
                    target.name(),
                    decl.name
                )));
            };
            let [referenced] = pk.columns() else {
                return Err(Error::mapping(format!(
                    "table `{}` referenced by `{name}.{}` has a composite primary key; \
                     declare the foreign key on the table instead",
                    target.name(),
                    decl.name
                )));
            };
            let local = columns
                .iter()
                .find(|c| c.key() == decl.key)
                .ok_or_else(|| Error::mapping(format!("unknown column `{name}.{}`", decl.name)))?;
            check_key_types(local, target, *referenced)?;
            foreign_keys.push(ForeignKey::Single {
                name: fk.name.clone(),
                column: decl.key,
                references: *referenced,
            });
        }
        for fk in declared_fks {
            let target = self.registered(fk.target, fk.target_name, &name)?;
            if fk.columns.is_empty() || fk.columns.len() != fk.references.len() {
                return Err(Error::mapping(format!(
                    "foreign key of `{name}` to `{}` must pair the same, non-zero, \
                     number of local and referenced columns",
                    target.name()
                )));
            }
            for (local, referenced) in fk.columns.iter().zip(&fk.references) {
                let local = columns.iter().find(|c| c.key() == *local).ok_or_else(|| {
                    Error::mapping(format!(
                        "foreign key of `{name}` uses `{}`, which is not a column of the table",
                        local.property()
                    ))
                })?;
                check_key_types(local, target, *referenced)?;
            }
            foreign_keys.push(if fk.columns.len() == 1 {
                ForeignKey::Single {
                    name: fk.name,
                    column: fk.columns[0],
                    references: fk.references[0],
                }
            } else {
                ForeignKey::Composite {
                    name: fk.name,
                    columns: fk.columns,
                    references: fk.references,
                }
            });
        }

        let meta = Arc::new(TableMeta {
            entity,
            entity_name,
            name,
            columns,
            primary_key,
            foreign_keys,
        });
        debug!(
            table = %meta.name(),
            entity = entity_name,
            columns = meta.columns().len(),
            foreign_keys = meta.foreign_keys().len(),
            "Registered table"
        );
        let accessors = decls.into_iter().map(|d| d.accessor).collect();
        self.order.push(entity);
        self.metas.insert(entity, Arc::clone(&meta));
        self.typed
            .insert(entity, Box::new(Table::<E>::new(meta, accessors)));
        Ok(())
    }

    fn registered(
        &self,
        target: TypeId,
        target_name: &'static str,
        table: &str,
    ) -> Result<&Arc<TableMeta>> {
        self.metas.get(&target).ok_or_else(|| {
            Error::mapping(format!(
                "foreign key of `{table}` references `{target_name}`, which is not a mapped table"
            ))
        })
    }

    /// Seals the registry.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a [`table`](Self::table) or
    /// [`declare_table`](Self::declare_table) declaration.
    pub fn build(self) -> Result<Tables> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let columns = self
            .metas
            .values()
            .flat_map(|meta| meta.columns().iter().map(|c| (c.key(), c.clone())))
            .collect();
        info!(
            dialect = %self.dialect,
            tables = self.order.len(),
            "Table registry sealed"
        );
        Ok(Tables {
            dialect: self.dialect,
            order: self.order,
            metas: self.metas,
            typed: self.typed,
            columns,
        })
    }
}

fn composite_primary_key(
    table: &str,
    columns: &[Column],
    name: Option<String>,
    keys: Vec<ColumnKey>,
) -> Result<PrimaryKey> {
    if keys.is_empty() {
        return Err(Error::mapping(format!(
            "primary key of table `{table}` has no column"
        )));
    }
    for (i, key) in keys.iter().enumerate() {
        let column = columns.iter().find(|c| c.key() == *key).ok_or_else(|| {
            Error::mapping(format!(
                "primary key of table `{table}` uses `{}`, which is not a column of the table",
                key.property()
            ))
        })?;
        if column.is_nullable() {
            return Err(Error::mapping(format!(
                "nullable column `{}` cannot be part of a primary key",
                column.qualified_name()
            )));
        }
        if keys[..i].contains(key) {
            return Err(Error::mapping(format!(
                "column `{}` appears twice in the primary key",
                column.qualified_name()
            )));
        }
    }
    Ok(if keys.len() == 1 {
        PrimaryKey::Single {
            name,
            column: keys[0],
        }
    } else {
        PrimaryKey::Composite {
            name,
            columns: keys,
        }
    })
}

fn check_key_types(local: &Column, target: &TableMeta, referenced: ColumnKey) -> Result<()> {
    let remote = target.column(referenced).ok_or_else(|| {
        Error::mapping(format!(
            "foreign key references `{}`, which is not a column of `{}`",
            referenced.property(),
            target.name()
        ))
    })?;
    if local.sql_type().is_key_compatible(remote.sql_type()) {
        Ok(())
    } else {
        Err(Error::mapping(format!(
            "foreign key column `{}` ({}) cannot reference `{}` ({})",
            local.qualified_name(),
            local.sql_type(),
            remote.qualified_name(),
            remote.sql_type()
        )))
    }
}

/// Immutable registry of the mapped tables of one dialect.
pub struct Tables {
    dialect: Dialect,
    order: Vec<TypeId>,
    metas: HashMap<TypeId, Arc<TableMeta>>,
    typed: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    columns: HashMap<ColumnKey, Column>,
}

impl Tables {
    /// Starts declaring tables for `dialect`.
    pub fn builder(dialect: Dialect) -> TablesBuilder {
        TablesBuilder::new(dialect)
    }

    /// Dialect of every statement built from this registry.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the table mapped to `E`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mapping`] when `E` is not mapped.
    pub fn table<E: 'static>(&self) -> Result<&Table<E>> {
        self.typed
            .get(&TypeId::of::<E>())
            .and_then(|t| t.downcast_ref::<Table<E>>())
            .ok_or_else(|| Error::mapping(unmapped::<E>()))
    }

    /// Returns the column mapping `property`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mapping`] when the property was not declared as a
    /// column.
    pub fn column<E: 'static, V>(&self, property: Property<E, V>) -> Result<&Column> {
        self.columns.get(&property.key()).ok_or_else(|| {
            Error::mapping(format!(
                "property `{}` of `{}` is not mapped to a column",
                property.name(),
                type_name::<E>()
            ))
        })
    }

    /// Tables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TableMeta> {
        self.order
            .iter()
            .filter_map(|id| self.metas.get(id).map(AsRef::as_ref))
    }

    /// Number of registered tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when no table is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn meta_of(&self, entity: TypeId) -> Option<&Arc<TableMeta>> {
        self.metas.get(&entity)
    }
}

impl fmt::Debug for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tables")
            .field("dialect", &self.dialect)
            .field("tables", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

pub(crate) fn unmapped<E>() -> String {
    format!("type `{}` is not mapped to a table", type_name::<E>())
}
