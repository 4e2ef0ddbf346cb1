//! Error types for table mapping, statement building and row access.

use std::fmt::Display;

use thiserror::Error;

/// Error reported by an execution backend, boxed so the core never depends on
/// a particular driver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the registry, the statement builders and the row readers.
#[derive(Debug, Error)]
pub enum Error {
    /// The table configuration is invalid. No registry is produced.
    #[error("mapping error: {0}")]
    Mapping(String),

    /// A statement could not be built from the requested operations.
    #[error("validation error: {0}")]
    Validation(String),

    /// `fetch_one` did not receive exactly one row.
    #[error("expected exactly one row, query returned {rows}")]
    Cardinality {
        /// Number of rows the query actually returned.
        rows: usize,
    },

    /// A projection read a column that the statement did not select.
    #[error("row access error: {0}")]
    RowAccess(String),

    /// A row value could not be converted into the requested Rust type.
    #[error("cannot decode column `{column}`: {message}")]
    Decode {
        /// Qualified name of the offending column.
        column: String,
        /// Reason reported by the conversion.
        message: String,
    },

    /// The execution backend failed while running `sql`.
    #[error("failed to execute `{sql}`: {source}")]
    Execution {
        /// SQL text that was being executed.
        sql: String,
        /// Error reported by the backend, unchanged.
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn decode(column: impl Into<String>, message: impl Display) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn execution(sql: &str, source: impl Into<BoxError>) -> Self {
        Self::Execution {
            sql: String::from(sql),
            source: source.into(),
        }
    }

    /// Returns true for errors raised by `fetch_one` on zero or several rows.
    #[must_use]
    pub const fn is_cardinality(&self) -> bool {
        matches!(self, Self::Cardinality { .. })
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_message() {
        let err = Error::Cardinality { rows: 2 };
        assert!(err.is_cardinality());
        assert_eq!(err.to_string(), "expected exactly one row, query returned 2");
    }

    #[test]
    fn test_execution_keeps_sql_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = Error::execution("SELECT 1", io);
        assert_eq!(err.to_string(), "failed to execute `SELECT 1`: connection reset");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_decode_message() {
        let err = Error::decode("users.id", "unexpected NULL");
        assert_eq!(
            err.to_string(),
            "cannot decode column `users.id`: unexpected NULL"
        );
    }
}
