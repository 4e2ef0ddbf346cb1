//! Statement representation shared by the builders and the SQL generator.

mod statement;
mod types;

pub use statement::{
    Assignment, ColumnDefinition, ColumnRef, CompareOp, Condition, CreateTableStatement,
    DeleteStatement, InsertStatement, Join, JoinKind, SelectStatement, Statement, TableConstraint,
    UpdateStatement,
};
pub use types::SqlType;
