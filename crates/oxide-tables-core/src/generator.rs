//! Dialect SQL generator.
//!
//! Renders a [`Statement`] into SQL text and the ordered list of parameters
//! to bind. Values are never inlined: each one becomes a placeholder, numbered
//! in textual order where the dialect numbers them, and is converted into the
//! form the dialect's driver binds.

use tracing::debug;

use crate::ast::{
    ColumnRef, Condition, CreateTableStatement, DeleteStatement, InsertStatement, Join,
    SelectStatement, Statement, TableConstraint, UpdateStatement,
};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::value::SqlValue;

/// SQL text with its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// SQL text.
    pub sql: String,
    /// Parameters, in placeholder order.
    pub params: Vec<SqlValue>,
}

/// Renders `statement` for `dialect`.
///
/// # Errors
///
/// Returns [`Error::Validation`] for statements that have no valid SQL form:
/// an INSERT without rows, an UPDATE without assignments, a comparison with
/// NULL or a column type the dialect cannot store.
pub fn generate(statement: &Statement, dialect: Dialect) -> Result<CompiledStatement> {
    let mut w = SqlWriter::new(dialect);
    match statement {
        Statement::CreateTable(create) => w.create_table(create)?,
        Statement::Insert(insert) => w.insert(insert)?,
        Statement::Select(select) => w.select(select)?,
        Statement::Update(update) => w.update(update)?,
        Statement::Delete(delete) => w.delete(delete)?,
    }
    let compiled = CompiledStatement {
        sql: w.sql,
        params: w.params,
    };
    debug!(
        dialect = %dialect,
        sql = %compiled.sql,
        params = compiled.params.len(),
        "Compiled statement"
    );
    Ok(compiled)
}

struct SqlWriter {
    dialect: Dialect,
    sql: String,
    params: Vec<SqlValue>,
}

impl SqlWriter {
    const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn ident(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    fn idents(&mut self, names: &[String]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(name);
        }
    }

    fn column(&mut self, column: &ColumnRef) {
        self.ident(&column.table);
        self.push(".");
        self.ident(&column.column);
    }

    fn param(&mut self, value: &SqlValue) {
        self.params.push(self.dialect.bind_value(value.clone()));
        let placeholder = self.dialect.placeholder(self.params.len());
        self.push(&placeholder);
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    fn condition(&mut self, condition: &Condition) -> Result<()> {
        match condition {
            Condition::Compare { column, op, value } => {
                if value.is_null() {
                    return Err(Error::validation(format!(
                        "cannot compare `{}.{}` with NULL",
                        column.table, column.column
                    )));
                }
                self.column(column);
                self.push(" ");
                self.push(op.as_sql());
                self.push(" ");
                self.param(value);
            }
            Condition::ColumnsEqual(left, right) => {
                self.column(left);
                self.push(" = ");
                self.column(right);
            }
            Condition::IsNull(column) => {
                self.column(column);
                self.push(" IS NULL");
            }
            Condition::IsNotNull(column) => {
                self.column(column);
                self.push(" IS NOT NULL");
            }
            Condition::And(left, right) => {
                self.operand(left, condition)?;
                self.push(" AND ");
                self.operand(right, condition)?;
            }
            Condition::Or(left, right) => {
                self.operand(left, condition)?;
                self.push(" OR ");
                self.operand(right, condition)?;
            }
        }
        Ok(())
    }

    /// Writes an operand of AND/OR, parenthesized when it is the other one.
    fn operand(&mut self, operand: &Condition, parent: &Condition) -> Result<()> {
        let nested = matches!(
            (parent, operand),
            (Condition::And(..), Condition::Or(..)) | (Condition::Or(..), Condition::And(..))
        );
        if nested {
            self.push("(");
            self.condition(operand)?;
            self.push(")");
            Ok(())
        } else {
            self.condition(operand)
        }
    }

    fn join_conditions(on: &[(ColumnRef, ColumnRef)]) -> Option<Condition> {
        on.iter()
            .map(|(l, r)| Condition::ColumnsEqual(l.clone(), r.clone()))
            .reduce(Condition::and)
    }

    fn join(&mut self, join: &Join) -> Result<()> {
        self.push(" ");
        self.push(join.kind.as_sql());
        self.push(" ");
        self.ident(&join.table);
        if let Some(on) = Self::join_conditions(&join.on) {
            self.push(" ON ");
            self.condition(&on)?;
        }
        Ok(())
    }

    fn filter(&mut self, filter: Option<&Condition>) -> Result<()> {
        if let Some(filter) = filter {
            self.push(" WHERE ");
            self.condition(filter)?;
        }
        Ok(())
    }

    /// WHERE clause of UPDATE and DELETE. Joins become a correlated
    /// `EXISTS` subquery driven by the first joined table.
    fn correlated_filter(&mut self, joins: &[Join], filter: Option<&Condition>) -> Result<()> {
        let Some((first, rest)) = joins.split_first() else {
            return self.filter(filter);
        };
        self.push(" WHERE EXISTS (SELECT 1 FROM ");
        self.ident(&first.table);
        for join in rest {
            self.join(join)?;
        }
        let condition = match (Self::join_conditions(&first.on), filter) {
            (Some(on), Some(filter)) => Some(on.and(filter.clone())),
            (on, filter) => on.or_else(|| filter.cloned()),
        };
        self.filter(condition.as_ref())?;
        self.push(")");
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn select(&mut self, select: &SelectStatement) -> Result<()> {
        if select.columns.is_empty() {
            return Err(Error::validation("SELECT requires at least one column"));
        }
        self.push("SELECT ");
        for (i, column) in select.columns.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.column(column);
        }
        self.push(" FROM ");
        self.ident(&select.from);
        for join in &select.joins {
            self.join(join)?;
        }
        self.filter(select.filter.as_ref())
    }

    fn insert(&mut self, insert: &InsertStatement) -> Result<()> {
        if insert.rows.is_empty() {
            return Err(Error::validation(format!(
                "INSERT into `{}` requires at least one row",
                insert.table
            )));
        }
        self.push("INSERT INTO ");
        self.ident(&insert.table);
        if insert.columns.is_empty() {
            if insert.rows.len() > 1 || insert.rows.iter().any(|r| !r.is_empty()) {
                return Err(Error::validation(
                    "DEFAULT VALUES inserts exactly one row without values",
                ));
            }
            self.push(" DEFAULT VALUES");
            return Ok(());
        }
        self.push(" (");
        self.idents(&insert.columns);
        self.push(") VALUES ");
        for (i, row) in insert.rows.iter().enumerate() {
            if row.len() != insert.columns.len() {
                return Err(Error::validation(format!(
                    "INSERT row {i} has {} values for {} columns",
                    row.len(),
                    insert.columns.len()
                )));
            }
            if i > 0 {
                self.push(", ");
            }
            self.push("(");
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    self.push(", ");
                }
                self.param(value);
            }
            self.push(")");
        }
        Ok(())
    }

    fn update(&mut self, update: &UpdateStatement) -> Result<()> {
        if update.assignments.is_empty() {
            return Err(Error::validation(format!(
                "UPDATE of `{}` requires at least one assignment",
                update.table
            )));
        }
        self.push("UPDATE ");
        self.ident(&update.table);
        self.push(" SET ");
        for (i, assignment) in update.assignments.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(&assignment.column);
            self.push(" = ");
            self.param(&assignment.value);
        }
        self.correlated_filter(&update.joins, update.filter.as_ref())
    }

    fn delete(&mut self, delete: &DeleteStatement) -> Result<()> {
        self.push("DELETE FROM ");
        self.ident(&delete.table);
        self.correlated_filter(&delete.joins, delete.filter.as_ref())
    }

    fn create_table(&mut self, create: &CreateTableStatement) -> Result<()> {
        self.push("CREATE TABLE IF NOT EXISTS ");
        self.ident(&create.table);
        self.push(" (");
        for (i, column) in create.columns.iter().enumerate() {
            let keyword = self.dialect.column_type(column.sql_type).ok_or_else(|| {
                Error::validation(format!(
                    "column `{}.{}`: {} is not supported by {}",
                    create.table, column.name, column.sql_type, self.dialect
                ))
            })?;
            if i > 0 {
                self.push(", ");
            }
            self.ident(&column.name);
            self.push(" ");
            self.push(keyword);
            if !column.nullable {
                self.push(" NOT NULL");
            }
        }
        for constraint in &create.constraints {
            self.push(", CONSTRAINT ");
            match constraint {
                TableConstraint::PrimaryKey { name, columns } => {
                    self.ident(name);
                    self.push(" PRIMARY KEY (");
                    self.idents(columns);
                    self.push(")");
                }
                TableConstraint::ForeignKey {
                    name,
                    columns,
                    references_table,
                    references_columns,
                } => {
                    self.ident(name);
                    self.push(" FOREIGN KEY (");
                    self.idents(columns);
                    self.push(") REFERENCES ");
                    self.ident(references_table);
                    self.push(" (");
                    self.idents(references_columns);
                    self.push(")");
                }
            }
        }
        self.push(")");
        Ok(())
    }
}
