//! SQL dialect support.
//!
//! Each dialect fixes the placeholder syntax for bound parameters, the column
//! type keywords used by CREATE TABLE, identifier quoting, the auto-increment
//! strategy and the set of legal [`SqlType`]s. Type support is a capability
//! table consulted when tables are registered, so unsupported mappings fail at
//! configuration time.

use core::fmt;

use crate::ast::SqlType;
use crate::value::SqlValue;

/// The databases a table registry can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// H2.
    H2,
    /// PostgreSQL.
    Postgresql,
    /// SQLite.
    Sqlite,
}

/// How a dialect lets the database assign [`SqlType::Serial`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrement {
    /// A dedicated column type (`SERIAL`).
    SerialType,
    /// A keyword following the column type (`AUTO_INCREMENT`).
    Keyword,
    /// The rowid alias of an `INTEGER` single-column primary key.
    RowIdAlias,
}

const COMMON_RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint",
    "create", "cross", "default", "delete", "desc", "distinct", "drop", "else", "exists",
    "false", "foreign", "from", "full", "group", "having", "in", "inner", "insert", "into",
    "is", "join", "left", "like", "limit", "not", "null", "offset", "on", "or", "order",
    "outer", "primary", "references", "right", "select", "set", "table", "then", "true",
    "union", "unique", "update", "using", "values", "when", "where",
];

const H2_RESERVED: &[&str] = &["minus", "row", "rownum", "intersect", "qualify", "user"];

const POSTGRESQL_RESERVED: &[&str] = &[
    "analyse", "analyze", "array", "current_user", "fetch", "grant", "only", "returning",
    "session_user", "user", "window",
];

const SQLITE_RESERVED: &[&str] = &[
    "abort", "autoincrement", "glob", "index", "indexed", "regexp", "transaction", "vacuum",
];

impl Dialect {
    /// Returns the name of the dialect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::H2 => "h2",
            Self::Postgresql => "postgresql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns the identifier quote character.
    #[must_use]
    pub const fn identifier_quote(self) -> char {
        '"'
    }

    /// Returns the placeholder of the `index`-th bound parameter (1-based).
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgresql => format!("${index}"),
            Self::H2 | Self::Sqlite => String::from("?"),
        }
    }

    /// Returns the CREATE TABLE keyword for `sql_type`, or `None` when the
    /// dialect cannot store it.
    #[must_use]
    pub const fn column_type(self, sql_type: SqlType) -> Option<&'static str> {
        match (self, sql_type) {
            (_, SqlType::Varchar) => Some("VARCHAR"),
            (Self::H2, SqlType::Text) | (Self::Postgresql, SqlType::DateTime) => None,
            (_, SqlType::Text) => Some("TEXT"),
            (Self::Sqlite, SqlType::Boolean | SqlType::Integer | SqlType::Serial) => {
                Some("INTEGER")
            }
            (Self::Sqlite, _) => Some("TEXT"),
            (_, SqlType::Boolean) => Some("BOOLEAN"),
            (_, SqlType::Integer) => Some("INTEGER"),
            (Self::H2, SqlType::Serial) => Some("INTEGER AUTO_INCREMENT"),
            (Self::Postgresql, SqlType::Serial) => Some("SERIAL"),
            (_, SqlType::Uuid) => Some("UUID"),
            (_, SqlType::Date) => Some("DATE"),
            (_, SqlType::Time) => Some("TIME"),
            (Self::H2, SqlType::TimeWithFraction) => Some("TIME(9)"),
            (Self::Postgresql, SqlType::TimeWithFraction) => Some("TIME(6)"),
            (Self::H2, SqlType::DateTime) => Some("DATETIME"),
            (_, SqlType::Timestamp) => Some("TIMESTAMP"),
            (_, SqlType::TimestampWithTimeZone) => Some("TIMESTAMP WITH TIME ZONE"),
        }
    }

    /// Returns whether columns of `sql_type` can be declared.
    #[must_use]
    pub const fn supports(self, sql_type: SqlType) -> bool {
        self.column_type(sql_type).is_some()
    }

    /// Returns how [`SqlType::Serial`] columns get their values.
    #[must_use]
    pub const fn auto_increment(self) -> AutoIncrement {
        match self {
            Self::H2 => AutoIncrement::Keyword,
            Self::Postgresql => AutoIncrement::SerialType,
            Self::Sqlite => AutoIncrement::RowIdAlias,
        }
    }

    /// Returns whether temporal and UUID values are stored as text.
    #[must_use]
    pub const fn stores_temporal_as_text(self) -> bool {
        matches!(self, Self::Sqlite)
    }

    /// Returns whether `word` is reserved and must be quoted as an identifier.
    #[must_use]
    pub fn is_reserved(self, word: &str) -> bool {
        let lower = word.to_ascii_lowercase();
        let extra = match self {
            Self::H2 => H2_RESERVED,
            Self::Postgresql => POSTGRESQL_RESERVED,
            Self::Sqlite => SQLITE_RESERVED,
        };
        COMMON_RESERVED.contains(&lower.as_str()) || extra.contains(&lower.as_str())
    }

    /// Quotes an identifier if necessary.
    ///
    /// Plain identifiers (`[A-Za-z_][A-Za-z0-9_]*`) that are not reserved are
    /// returned unchanged.
    #[must_use]
    pub fn quote_identifier(self, name: &str) -> String {
        let mut chars = name.chars();
        let plain = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain && !self.is_reserved(name) {
            return String::from(name);
        }
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Converts a parameter into the form this dialect's driver binds.
    #[must_use]
    pub fn bind_value(self, value: SqlValue) -> SqlValue {
        if !self.stores_temporal_as_text() {
            return value;
        }
        match value {
            SqlValue::Bool(b) => SqlValue::Int(i64::from(b)),
            other => other.into_text_form(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
