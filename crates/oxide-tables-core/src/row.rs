//! Read side of SELECT statements.
//!
//! A compiled SELECT fixes the order of its result columns in a [`RowLayout`].
//! Each raw row returned by the executor is decoded against that layout and
//! handed to the projection as a [`ValueProvider`], which looks columns up by
//! property rather than by position.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::vec;

use crate::ast::SqlType;
use crate::error::{Error, Result};
use crate::executor::RawRow;
use crate::schema::{ColumnKey, Property, TableMeta};
use crate::value::{ColumnValue, Keyable, SqlValue};

/// A record type that can be read back from a row selecting all its columns.
///
/// Usually implemented with `#[derive(Entity)]`.
pub trait Entity: Sized + 'static {
    /// Builds a record from the current row.
    ///
    /// # Errors
    ///
    /// Returns the error of the first column that cannot be read.
    fn from_row(row: &ValueProvider<'_>) -> Result<Self>;
}

/// Projection evaluated once per result row.
pub(crate) type Projector<'a, T> = Box<dyn Fn(&ValueProvider<'_>) -> Result<T> + Send + Sync + 'a>;

#[derive(Debug, Clone)]
struct LayoutColumn {
    sql_type: SqlType,
    name: String,
}

/// Result columns of a compiled SELECT, in projection order.
#[derive(Debug, Clone, Default)]
pub struct RowLayout {
    columns: Vec<LayoutColumn>,
    index: HashMap<ColumnKey, usize>,
}

impl RowLayout {
    /// Lays out every column of `tables`, table after table.
    pub(crate) fn of_tables(tables: &[Arc<TableMeta>]) -> Self {
        let mut layout = Self::default();
        for table in tables {
            layout.extend(table);
        }
        layout
    }

    /// Lays out the columns of one table, in declaration order.
    #[must_use]
    pub fn of_table(table: &TableMeta) -> Self {
        let mut layout = Self::default();
        layout.extend(table);
        layout
    }

    fn extend(&mut self, table: &TableMeta) {
        for column in table.columns() {
            self.index.insert(column.key(), self.columns.len());
            self.columns.push(LayoutColumn {
                sql_type: column.sql_type(),
                name: column.qualified_name(),
            });
        }
    }

    /// Number of result columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the layout has no column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Declared SQL type of the column at `index`.
    #[must_use]
    pub fn sql_type(&self, index: usize) -> Option<SqlType> {
        self.columns.get(index).map(|c| c.sql_type)
    }

    /// Reads every column of `row`.
    fn decode<R: RawRow>(&self, row: &R) -> Result<Vec<SqlValue>> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                row.get(i, column.sql_type)
                    .map_err(|e| Error::decode(column.name.clone(), e))
            })
            .collect()
    }

    pub(crate) fn project<R: RawRow, T>(&self, row: &R, projection: &Projector<'_, T>) -> Result<T> {
        let values = self.decode(row)?;
        projection(&ValueProvider {
            layout: self,
            values: &values,
        })
    }
}

/// Typed access to the columns of one result row.
pub struct ValueProvider<'r> {
    layout: &'r RowLayout,
    values: &'r [SqlValue],
}

impl<'r> ValueProvider<'r> {
    /// Wraps already decoded values laid out by `layout`.
    #[must_use]
    pub const fn new(layout: &'r RowLayout, values: &'r [SqlValue]) -> Self {
        Self { layout, values }
    }

    /// Reads the column mapping `property`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowAccess`] when the column is not part of the
    /// selected columns, and [`Error::Decode`] when the value does not fit
    /// `V`, e.g. a NULL coming from an unmatched left join.
    pub fn get<E: 'static, V: ColumnValue>(&self, property: Property<E, V>) -> Result<V> {
        let (column, value) = self.raw(property.key())?;
        V::from_sql_value(value.clone()).map_err(|e| Error::decode(column.name.clone(), e))
    }

    /// Reads a non-null column that may be absent because its table was
    /// left-joined without a match.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_optional<E: 'static, V: ColumnValue<Key = Keyable>>(
        &self,
        property: Property<E, V>,
    ) -> Result<Option<V>> {
        let (column, value) = self.raw(property.key())?;
        Option::<V>::from_sql_value(value.clone())
            .map_err(|e| Error::decode(column.name.clone(), e))
    }

    fn raw(&self, key: ColumnKey) -> Result<(&'r LayoutColumn, &'r SqlValue)> {
        let not_selected = || {
            Error::RowAccess(format!(
                "column `{key}` is not part of the selected columns"
            ))
        };
        let index = *self.layout.index.get(&key).ok_or_else(not_selected)?;
        let column = self.layout.columns.get(index).ok_or_else(not_selected)?;
        let value = self.values.get(index).ok_or_else(not_selected)?;
        Ok((column, value))
    }
}

impl fmt::Debug for ValueProvider<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (column, value) in self.layout.columns.iter().zip(self.values) {
            map.entry(&column.name, value);
        }
        map.finish()
    }
}

/// Lazy, single-pass sequence of projected rows returned by `fetch_all`.
///
/// Rows are decoded and projected one at a time as the iterator advances.
/// Dropping it releases the rows not yet consumed.
pub struct FetchAll<'a, R, T> {
    rows: vec::IntoIter<R>,
    layout: RowLayout,
    projection: Projector<'a, T>,
}

impl<'a, R, T> FetchAll<'a, R, T> {
    pub(crate) fn new(rows: Vec<R>, layout: RowLayout, projection: Projector<'a, T>) -> Self {
        Self {
            rows: rows.into_iter(),
            layout,
            projection,
        }
    }
}

impl<R: RawRow, T> Iterator for FetchAll<'_, R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(self.layout.project(&row, &self.projection))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<R: RawRow, T> ExactSizeIterator for FetchAll<'_, R, T> {}

impl<R, T> fmt::Debug for FetchAll<'_, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchAll")
            .field("remaining", &self.rows.len())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
