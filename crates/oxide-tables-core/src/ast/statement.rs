//! Dialect-neutral statement representation.
//!
//! Statement builders resolve every column reference against the registry and
//! produce one of these values. Names are final at this point; the generator
//! only decides quoting, placeholders and type keywords.

use crate::value::SqlValue;

use super::types::SqlType;

/// A table-qualified column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates a column reference.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Comparison operators between a column and a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `LIKE`
    Like,
}

impl CompareOp {
    /// Returns the SQL operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
        }
    }
}

/// A boolean condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> ?`
    Compare {
        /// Compared column.
        column: ColumnRef,
        /// Operator.
        op: CompareOp,
        /// Bound value.
        value: SqlValue,
    },
    /// `left = right` between two columns.
    ColumnsEqual(ColumnRef, ColumnRef),
    /// `column IS NULL`
    IsNull(ColumnRef),
    /// `column IS NOT NULL`
    IsNotNull(ColumnRef),
    /// Conjunction.
    And(Box<Condition>, Box<Condition>),
    /// Disjunction.
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Combines two conditions with AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combines two conditions with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    LeftOuter,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
        }
    }
}

/// A join clause; `on` pairs a column already in scope with a column of the
/// joined table.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join type.
    pub kind: JoinKind,
    /// Joined table name.
    pub table: String,
    /// Column pairs compared for equality.
    pub on: Vec<(ColumnRef, ColumnRef)>,
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Projected columns, in row order.
    pub columns: Vec<ColumnRef>,
    /// Driving table.
    pub from: String,
    /// Joins, in declaration order.
    pub joins: Vec<Join>,
    /// WHERE condition.
    pub filter: Option<Condition>,
}

/// An INSERT statement with one or more rows of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table.
    pub table: String,
    /// Inserted columns. Empty means `DEFAULT VALUES`.
    pub columns: Vec<String>,
    /// One value list per row, aligned with `columns`.
    pub rows: Vec<Vec<SqlValue>>,
}

/// A `column = value` assignment of an UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name.
    pub column: String,
    /// New value.
    pub value: SqlValue,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table.
    pub table: String,
    /// SET clause.
    pub assignments: Vec<Assignment>,
    /// Joins, rendered as an EXISTS subquery.
    pub joins: Vec<Join>,
    /// WHERE condition.
    pub filter: Option<Condition>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table.
    pub table: String,
    /// Joins, rendered as an EXISTS subquery.
    pub joins: Vec<Join>,
    /// WHERE condition.
    pub filter: Option<Condition>,
}

/// A column of a CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Column type.
    pub sql_type: SqlType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
}

/// A table-level constraint of a CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    /// PRIMARY KEY constraint.
    PrimaryKey {
        /// Constraint name.
        name: String,
        /// Key columns.
        columns: Vec<String>,
    },
    /// FOREIGN KEY constraint.
    ForeignKey {
        /// Constraint name.
        name: String,
        /// Local columns.
        columns: Vec<String>,
        /// Referenced table.
        references_table: String,
        /// Referenced columns, aligned with `columns`.
        references_columns: Vec<String>,
    },
}

/// A CREATE TABLE IF NOT EXISTS statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStatement {
    /// Table name.
    pub table: String,
    /// Columns, in declaration order.
    pub columns: Vec<ColumnDefinition>,
    /// Primary key first, then foreign keys.
    pub constraints: Vec<TableConstraint>,
}

/// Any statement the generator can render.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE.
    CreateTable(CreateTableStatement),
    /// INSERT.
    Insert(InsertStatement),
    /// SELECT.
    Select(SelectStatement),
    /// UPDATE.
    Update(UpdateStatement),
    /// DELETE.
    Delete(DeleteStatement),
}
