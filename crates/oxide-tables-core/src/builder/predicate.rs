//! WHERE predicates over mapped properties.
//!
//! Predicates are built from [`Property`] constants and combined with
//! [`Predicate::and`] / [`Predicate::or`] into a left-associative tree. Column
//! references are resolved against the statement's tables when the statement
//! is compiled.
//!
//! ```rust
//! use oxide_tables_core::schema::Property;
//!
//! struct User {
//!     firstname: String,
//!     alias: Option<String>,
//! }
//!
//! impl User {
//!     const FIRSTNAME: Property<Self, String> =
//!         Property::new("firstname", |u: &Self| u.firstname.clone());
//!     const ALIAS: Property<Self, Option<String>> =
//!         Property::new("alias", |u: &Self| u.alias.clone());
//! }
//!
//! // `None` compiles to `alias IS NULL`.
//! let p = User::ALIAS.eq(None).or(User::FIRSTNAME.starts_with("J"));
//! # let _ = p;
//! ```
//!
//! Comparing a non-null property with `None` does not compile:
//!
//! ```compile_fail
//! use oxide_tables_core::schema::Property;
//!
//! struct User {
//!     firstname: String,
//! }
//!
//! impl User {
//!     const FIRSTNAME: Property<Self, String> =
//!         Property::new("firstname", |u: &Self| u.firstname.clone());
//! }
//!
//! let p = User::FIRSTNAME.eq(None);
//! ```

use crate::ast::CompareOp;
use crate::schema::{ColumnKey, Property};
use crate::value::{ColumnValue, NotKeyable, SqlValue, StringValue};

/// A boolean condition over mapped properties.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> value`
    Compare {
        /// Compared property.
        column: ColumnKey,
        /// Operator.
        op: CompareOp,
        /// Bound value; never NULL.
        value: SqlValue,
    },
    /// `column IS NULL`
    IsNull(ColumnKey),
    /// `column IS NOT NULL`
    IsNotNull(ColumnKey),
    /// Both predicates hold.
    And(Box<Predicate>, Box<Predicate>),
    /// Either predicate holds.
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// `self AND other`
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// `self OR other`
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }
}

impl<E: 'static, V: ColumnValue> Property<E, V> {
    /// Equality. An absent value compiles to `IS NULL`.
    #[must_use]
    pub fn eq(self, value: V) -> Predicate {
        match value.to_sql_value() {
            SqlValue::Null => Predicate::IsNull(self.key()),
            value => self.compare(CompareOp::Eq, value),
        }
    }

    /// Inequality. An absent value compiles to `IS NOT NULL`.
    #[must_use]
    pub fn not_eq(self, value: V) -> Predicate {
        match value.to_sql_value() {
            SqlValue::Null => Predicate::IsNotNull(self.key()),
            value => self.compare(CompareOp::NotEq, value),
        }
    }

    /// `column < value`
    #[must_use]
    pub fn lt(self, value: V::Inner) -> Predicate {
        self.compare(CompareOp::Lt, value.to_sql_value())
    }

    /// `column <= value`
    #[must_use]
    pub fn le(self, value: V::Inner) -> Predicate {
        self.compare(CompareOp::Le, value.to_sql_value())
    }

    /// `column > value`
    #[must_use]
    pub fn gt(self, value: V::Inner) -> Predicate {
        self.compare(CompareOp::Gt, value.to_sql_value())
    }

    /// `column >= value`
    #[must_use]
    pub fn ge(self, value: V::Inner) -> Predicate {
        self.compare(CompareOp::Ge, value.to_sql_value())
    }

    /// `column IS NULL`
    #[must_use]
    pub fn is_null(self) -> Predicate
    where
        V: ColumnValue<Key = NotKeyable>,
    {
        Predicate::IsNull(self.key())
    }

    /// `column IS NOT NULL`
    #[must_use]
    pub fn is_not_null(self) -> Predicate
    where
        V: ColumnValue<Key = NotKeyable>,
    {
        Predicate::IsNotNull(self.key())
    }

    /// `column LIKE '%fragment%'`
    #[must_use]
    pub fn contains(self, fragment: &str) -> Predicate
    where
        V: StringValue,
    {
        self.like(format!("%{fragment}%"))
    }

    /// `column LIKE 'prefix%'`
    #[must_use]
    pub fn starts_with(self, prefix: &str) -> Predicate
    where
        V: StringValue,
    {
        self.like(format!("{prefix}%"))
    }

    /// `column LIKE '%suffix'`
    #[must_use]
    pub fn ends_with(self, suffix: &str) -> Predicate
    where
        V: StringValue,
    {
        self.like(format!("%{suffix}"))
    }

    fn like(self, pattern: String) -> Predicate {
        self.compare(CompareOp::Like, SqlValue::Text(pattern))
    }

    fn compare(self, op: CompareOp, value: SqlValue) -> Predicate {
        Predicate::Compare {
            column: self.key(),
            op,
            value,
        }
    }
}
