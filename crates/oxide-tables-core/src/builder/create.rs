//! CREATE TABLE builders.

use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::ast::{ColumnDefinition, CreateTableStatement, Statement, TableConstraint};
use crate::error::{Error, Result};
use crate::executor::{execute, Executor};
use crate::generator::{generate, CompiledStatement};
use crate::schema::{unmapped, ColumnKey, TableMeta, Tables};

impl Tables {
    /// Starts a CREATE TABLE IF NOT EXISTS for the table mapped to `E`.
    pub fn create_table<E: 'static>(&self) -> CreateTable<'_, E> {
        CreateTable {
            tables: self,
            _entity: PhantomData,
        }
    }

    /// Starts a CREATE TABLE IF NOT EXISTS for every table, in registration
    /// order.
    pub fn create_all_tables(&self) -> CreateAllTables<'_> {
        CreateAllTables { tables: self }
    }
}

/// CREATE TABLE IF NOT EXISTS for one table.
#[must_use]
pub struct CreateTable<'a, E> {
    tables: &'a Tables,
    _entity: PhantomData<fn() -> E>,
}

impl<E: 'static> CreateTable<'_, E> {
    /// Compiles the statement. The output is identical for every call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `E` is not mapped.
    pub fn compile(&self) -> Result<CompiledStatement> {
        let meta = self
            .tables
            .meta_of(TypeId::of::<E>())
            .ok_or_else(|| Error::validation(unmapped::<E>()))?;
        compile(self.tables, meta)
    }

    /// Creates the table unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns build errors before anything is sent, then execution errors.
    pub async fn execute<X: Executor>(self, executor: &X) -> Result<()> {
        let statement = self.compile()?;
        execute(executor, &statement).await.map(|_| ())
    }
}

/// CREATE TABLE IF NOT EXISTS for every table of a registry.
#[must_use]
pub struct CreateAllTables<'a> {
    tables: &'a Tables,
}

impl CreateAllTables<'_> {
    /// Compiles one statement per table, referenced tables first.
    ///
    /// # Errors
    ///
    /// Returns the first generation error.
    pub fn compile(&self) -> Result<Vec<CompiledStatement>> {
        self.tables
            .iter()
            .map(|meta| compile(self.tables, meta))
            .collect()
    }

    /// Creates every missing table.
    ///
    /// # Errors
    ///
    /// Returns build errors before anything is sent, then the first execution
    /// error.
    pub async fn execute<X: Executor>(self, executor: &X) -> Result<()> {
        for statement in self.compile()? {
            execute(executor, &statement).await?;
        }
        Ok(())
    }
}

fn compile(tables: &Tables, meta: &TableMeta) -> Result<CompiledStatement> {
    let statement = Statement::CreateTable(definition(tables, meta)?);
    generate(&statement, tables.dialect())
}

fn column_name(meta: &TableMeta, key: ColumnKey) -> Result<String> {
    meta.column(key)
        .map(|c| String::from(c.name()))
        .ok_or_else(|| {
            Error::validation(format!(
                "property `{key}` is not a column of `{}`",
                meta.name()
            ))
        })
}

fn column_names(meta: &TableMeta, keys: &[ColumnKey]) -> Result<Vec<String>> {
    keys.iter().map(|key| column_name(meta, *key)).collect()
}

fn definition(tables: &Tables, meta: &TableMeta) -> Result<CreateTableStatement> {
    let columns = meta
        .columns()
        .iter()
        .map(|c| ColumnDefinition {
            name: String::from(c.name()),
            sql_type: c.sql_type(),
            nullable: c.is_nullable(),
        })
        .collect();

    let mut constraints = Vec::new();
    if let Some(pk) = meta.primary_key() {
        constraints.push(TableConstraint::PrimaryKey {
            name: pk
                .name()
                .map_or_else(|| format!("PK_{}", meta.name()), String::from),
            columns: column_names(meta, pk.columns())?,
        });
    }

    let mut per_target: HashMap<TypeId, usize> = HashMap::new();
    for fk in meta.foreign_keys() {
        let target = fk
            .referenced_entity()
            .and_then(|entity| tables.meta_of(entity))
            .ok_or_else(|| {
                Error::validation(format!(
                    "foreign key of `{}` references an unmapped table",
                    meta.name()
                ))
            })?;
        let ordinal = per_target.entry(target.entity()).or_insert(0);
        *ordinal += 1;
        let name = fk.name().map_or_else(
            || match *ordinal {
                1 => format!("FK_{}_{}", meta.name(), target.name()),
                n => format!("FK_{}_{}_{n}", meta.name(), target.name()),
            },
            String::from,
        );
        constraints.push(TableConstraint::ForeignKey {
            name,
            columns: column_names(meta, fk.columns())?,
            references_table: String::from(target.name()),
            references_columns: column_names(target, fk.references())?,
        });
    }

    Ok(CreateTableStatement {
        table: String::from(meta.name()),
        columns,
        constraints,
    })
}
