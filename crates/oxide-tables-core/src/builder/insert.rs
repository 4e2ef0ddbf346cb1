//! INSERT builder.

use crate::ast::{InsertStatement, SqlType, Statement};
use crate::error::{Error, Result};
use crate::executor::{execute, Executor};
use crate::generator::{generate, CompiledStatement};
use crate::schema::{unmapped, Tables};
use crate::value::SqlValue;

impl Tables {
    /// Starts an INSERT of `entities`.
    pub fn insert<'a, E: 'static>(&'a self, entities: &'a [E]) -> Insert<'a, E> {
        Insert {
            tables: self,
            entities,
        }
    }

    /// Starts an INSERT of one entity.
    pub fn insert_one<'a, E: 'static>(&'a self, entity: &'a E) -> Insert<'a, E> {
        self.insert(std::slice::from_ref(entity))
    }
}

/// An INSERT of one or more records of the same type.
///
/// Consecutive rows of the same shape, the set of columns they provide a value
/// for, share one multi-row INSERT. Rows are inserted in slice order. A SERIAL
/// column whose value is absent is left out so the database assigns it.
#[must_use]
pub struct Insert<'a, E> {
    tables: &'a Tables,
    entities: &'a [E],
}

impl<E: 'static> Insert<'_, E> {
    /// Compiles one statement per run of same-shaped rows, in slice order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `E` is not mapped, when there is
    /// nothing to insert, or when a non-nullable column has no value.
    pub fn compile(&self) -> Result<Vec<CompiledStatement>> {
        let table = self
            .tables
            .table::<E>()
            .map_err(|_| Error::validation(unmapped::<E>()))?;
        if self.entities.is_empty() {
            return Err(Error::validation(format!(
                "nothing to insert into `{}`",
                table.name()
            )));
        }

        let columns = table.columns();
        let mut groups: Vec<(Vec<usize>, Vec<Vec<SqlValue>>)> = Vec::new();
        for (row, entity) in self.entities.iter().enumerate() {
            let mut shape = Vec::with_capacity(columns.len());
            let mut values = Vec::with_capacity(columns.len());
            for (i, (column, value)) in columns.iter().zip(table.values(entity)).enumerate() {
                if value.is_null() {
                    if column.sql_type() == SqlType::Serial {
                        continue;
                    }
                    if !column.is_nullable() {
                        return Err(Error::validation(format!(
                            "row {row}: column `{}` requires a value",
                            column.qualified_name()
                        )));
                    }
                }
                shape.push(i);
                values.push(value);
            }
            // DEFAULT VALUES inserts a single row.
            let group = if shape.is_empty() {
                None
            } else {
                groups.last_mut().filter(|(s, _)| *s == shape)
            };
            match group {
                Some((_, rows)) => rows.push(values),
                None => groups.push((shape, vec![values])),
            }
        }

        let dialect = self.tables.dialect();
        groups
            .into_iter()
            .map(|(shape, rows)| {
                let statement = Statement::Insert(InsertStatement {
                    table: String::from(table.name()),
                    columns: shape
                        .iter()
                        .map(|&i| String::from(columns[i].name()))
                        .collect(),
                    rows,
                });
                generate(&statement, dialect)
            })
            .collect()
    }

    /// Runs every compiled statement and returns the total number of inserted
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns build errors before anything is sent, then the first execution
    /// error.
    pub async fn execute<X: Executor>(self, executor: &X) -> Result<u64> {
        let mut inserted = 0;
        for statement in self.compile()? {
            inserted += execute(executor, &statement).await?;
        }
        Ok(inserted)
    }
}
