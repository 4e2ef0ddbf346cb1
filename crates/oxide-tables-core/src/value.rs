//! SQL values and the conversions between Rust column types and them.
//!
//! Every mapped property has a value type implementing [`ColumnValue`]. The
//! trait converts values into the [`SqlValue`] bound as a statement parameter
//! and back from the value read out of a result row.
//!
//! Nullability is carried by the Rust type itself: `Option<T>` is the only
//! nullable form, and only the non-null base types may form a primary key
//! (see [`Keyable`]).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

/// Text form of DATE values on dialects storing temporal values as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Text form of TIME values.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
/// Text form of DATETIME and TIMESTAMP values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A SQL value that can be used as a statement parameter or read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Text value.
    Text(String),
    /// UUID value.
    Uuid(Uuid),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without offset.
    DateTime(NaiveDateTime),
    /// Date and time with a fixed UTC offset.
    TimestampTz(DateTime<FixedOffset>),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in conversion errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Text(_) => "text",
            Self::Uuid(_) => "uuid",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::TimestampTz(_) => "timestamp with time zone",
        }
    }

    /// Converts temporal and UUID values into their canonical text form.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn into_text_form(self) -> Self {
        match self {
            Self::Uuid(u) => Self::Text(u.hyphenated().to_string()),
            Self::Date(d) => Self::Text(d.format(DATE_FORMAT).to_string()),
            Self::Time(t) => Self::Text(t.format(TIME_FORMAT).to_string()),
            Self::DateTime(dt) => Self::Text(dt.format(DATETIME_FORMAT).to_string()),
            Self::TimestampTz(dt) => Self::Text(dt.to_rfc3339()),
            other => other,
        }
    }
}

/// Error converting a [`SqlValue`] into a Rust column type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A NULL was read for a type that cannot represent it.
    #[error("unexpected NULL for non-nullable {expected}")]
    UnexpectedNull {
        /// Name of the requested Rust type.
        expected: &'static str,
    },

    /// The value has a different kind than the requested type.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        /// Name of the requested Rust type.
        expected: &'static str,
        /// Kind of the value actually read.
        found: &'static str,
    },

    /// The value has the right kind but could not be interpreted.
    #[error("invalid {expected} value `{input}`: {reason}")]
    Invalid {
        /// Name of the requested Rust type.
        expected: &'static str,
        /// Offending input.
        input: String,
        /// Parser message.
        reason: String,
    },
}

impl ValueError {
    fn unexpected(expected: &'static str, value: &SqlValue) -> Self {
        if value.is_null() {
            Self::UnexpectedNull { expected }
        } else {
            Self::Mismatch {
                expected,
                found: value.kind(),
            }
        }
    }

    fn invalid(expected: &'static str, input: String, reason: impl ToString) -> Self {
        Self::Invalid {
            expected,
            input,
            reason: reason.to_string(),
        }
    }
}

/// Marker: values of this type can be part of a primary key.
#[derive(Debug, Clone, Copy)]
pub struct Keyable;

/// Marker: values of this type are nullable and cannot be part of a primary
/// key.
#[derive(Debug, Clone, Copy)]
pub struct NotKeyable;

/// A Rust type that can be stored in a mapped column.
pub trait ColumnValue: Sized + 'static {
    /// [`Keyable`] for non-null base types, [`NotKeyable`] for `Option<T>`.
    type Key;

    /// The non-null form of this type, used by ordering comparisons.
    type Inner: ColumnValue<Key = Keyable>;

    /// Whether this type can represent an absent value.
    const NULLABLE: bool;

    /// Converts the value into a bindable SQL value.
    fn to_sql_value(&self) -> SqlValue;

    /// Converts a value read from a row back into this type.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] when the value is NULL for a non-null type or
    /// has an incompatible kind.
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError>;
}

impl<T: ColumnValue<Key = Keyable>> ColumnValue for Option<T> {
    type Key = NotKeyable;
    type Inner = T;
    const NULLABLE: bool = true;

    fn to_sql_value(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, ColumnValue::to_sql_value)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

macro_rules! non_null_value {
    ($ty:ty, $to:expr, $from:expr) => {
        impl ColumnValue for $ty {
            type Key = Keyable;
            type Inner = Self;
            const NULLABLE: bool = false;

            fn to_sql_value(&self) -> SqlValue {
                let to: fn(&Self) -> SqlValue = $to;
                to(self)
            }

            fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
                let from: fn(SqlValue) -> Result<Self, ValueError> = $from;
                from(value)
            }
        }
    };
}

non_null_value!(String, |v| SqlValue::Text(v.clone()), |value| match value {
    SqlValue::Text(s) => Ok(s),
    other => Err(ValueError::unexpected("String", &other)),
});

non_null_value!(bool, |v| SqlValue::Bool(*v), |value| match value {
    SqlValue::Bool(b) => Ok(b),
    SqlValue::Int(i) => Ok(i != 0),
    other => Err(ValueError::unexpected("bool", &other)),
});

non_null_value!(i32, |v| SqlValue::Int(i64::from(*v)), |value| match value {
    SqlValue::Int(i) => {
        i32::try_from(i).map_err(|e| ValueError::invalid("i32", i.to_string(), e))
    }
    other => Err(ValueError::unexpected("i32", &other)),
});

non_null_value!(Uuid, |v| SqlValue::Uuid(*v), |value| match value {
    SqlValue::Uuid(u) => Ok(u),
    SqlValue::Text(s) => Uuid::parse_str(&s).map_err(|e| ValueError::invalid("Uuid", s, e)),
    other => Err(ValueError::unexpected("Uuid", &other)),
});

non_null_value!(NaiveDate, |v| SqlValue::Date(*v), |value| match value {
    SqlValue::Date(d) => Ok(d),
    SqlValue::Text(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .map_err(|e| ValueError::invalid("NaiveDate", s, e)),
    other => Err(ValueError::unexpected("NaiveDate", &other)),
});

non_null_value!(NaiveTime, |v| SqlValue::Time(*v), |value| match value {
    SqlValue::Time(t) => Ok(t),
    SqlValue::Text(s) => NaiveTime::parse_from_str(&s, TIME_FORMAT)
        .map_err(|e| ValueError::invalid("NaiveTime", s, e)),
    other => Err(ValueError::unexpected("NaiveTime", &other)),
});

non_null_value!(NaiveDateTime, |v| SqlValue::DateTime(*v), |value| match value {
    SqlValue::DateTime(dt) => Ok(dt),
    SqlValue::Text(s) => NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| ValueError::invalid("NaiveDateTime", s, e)),
    other => Err(ValueError::unexpected("NaiveDateTime", &other)),
});

non_null_value!(
    DateTime<FixedOffset>,
    |v| SqlValue::TimestampTz(*v),
    |value| match value {
        SqlValue::TimestampTz(dt) => Ok(dt),
        SqlValue::Text(s) => DateTime::parse_from_rfc3339(&s)
            .map_err(|e| ValueError::invalid("DateTime<FixedOffset>", s, e)),
        other => Err(ValueError::unexpected("DateTime<FixedOffset>", &other)),
    }
);

/// Types that map to VARCHAR or TEXT columns.
pub trait StringValue: ColumnValue {}
/// Types that map to BOOLEAN columns.
pub trait BoolValue: ColumnValue {}
/// Types that map to INTEGER columns.
pub trait IntValue: ColumnValue {}
/// Types that map to UUID columns.
pub trait UuidValue: ColumnValue {}
/// Types that map to DATE columns.
pub trait DateValue: ColumnValue {}
/// Types that map to TIME columns.
pub trait TimeValue: ColumnValue {}
/// Types that map to DATETIME and TIMESTAMP columns.
pub trait DateTimeValue: ColumnValue {}
/// Types that map to TIMESTAMP WITH TIME ZONE columns.
pub trait OffsetDateTimeValue: ColumnValue {}

macro_rules! column_family {
    ($family:ident: $($ty:ty),+) => {
        $(
            impl $family for $ty {}
            impl $family for Option<$ty> {}
        )+
    };
}

column_family!(StringValue: String);
column_family!(BoolValue: bool);
column_family!(IntValue: i32);
column_family!(UuidValue: Uuid);
column_family!(DateValue: NaiveDate);
column_family!(TimeValue: NaiveTime);
column_family!(DateTimeValue: NaiveDateTime);
column_family!(OffsetDateTimeValue: DateTime<FixedOffset>);
