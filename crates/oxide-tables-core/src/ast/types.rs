//! SQL column type definitions.

use core::fmt;

/// The closed set of SQL column types a property can be mapped to.
///
/// Whether a type can be used, and how its keyword is rendered, depends on the
/// dialect; see [`Dialect::column_type`](crate::dialect::Dialect::column_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// Variable-length character string.
    Varchar,
    /// Text (variable length, no limit).
    Text,
    /// Boolean.
    Boolean,
    /// 32-bit integer.
    Integer,
    /// Auto-incremented integer assigned by the database.
    Serial,
    /// UUID.
    Uuid,
    /// Calendar date.
    Date,
    /// Time of day with whole seconds.
    Time,
    /// Time of day with fractional seconds.
    TimeWithFraction,
    /// Date and time without offset (H2 and SQLite style).
    DateTime,
    /// Timestamp without time zone.
    Timestamp,
    /// Timestamp with time zone.
    TimestampWithTimeZone,
}

impl SqlType {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Varchar,
        Self::Text,
        Self::Boolean,
        Self::Integer,
        Self::Serial,
        Self::Uuid,
        Self::Date,
        Self::Time,
        Self::TimeWithFraction,
        Self::DateTime,
        Self::Timestamp,
        Self::TimestampWithTimeZone,
    ];

    /// Returns the dialect-neutral name of the type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Serial => "SERIAL",
            Self::Uuid => "UUID",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::TimeWithFraction => "TIME_WITH_FRACTION",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::TimestampWithTimeZone => "TIMESTAMP_WITH_TIMEZONE",
        }
    }

    /// Returns true when a foreign key may link a column of this type to a
    /// column of `other`.
    #[must_use]
    pub const fn is_key_compatible(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Varchar | Self::Text, Self::Varchar | Self::Text)
                | (Self::Integer | Self::Serial, Self::Integer | Self::Serial)
                | (Self::Boolean, Self::Boolean)
                | (Self::Uuid, Self::Uuid)
                | (Self::Date, Self::Date)
                | (Self::Time | Self::TimeWithFraction, Self::Time | Self::TimeWithFraction)
                | (Self::DateTime | Self::Timestamp, Self::DateTime | Self::Timestamp)
                | (Self::TimestampWithTimeZone, Self::TimestampWithTimeZone)
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
