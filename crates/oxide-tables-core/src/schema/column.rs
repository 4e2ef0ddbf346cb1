//! Type-safe column declarations.
//!
//! Each constructor accepts only properties whose value type fits the SQL
//! type, so `varchar` takes `String` or `Option<String>` properties while
//! `boolean` takes `bool` or `Option<bool>`. Nullability follows the value
//! type. Primary keys are only offered for non-null value types.

use std::any::{type_name, TypeId};
use std::marker::PhantomData;

use crate::ast::SqlType;
use crate::value::{
    BoolValue, ColumnValue, DateTimeValue, DateValue, IntValue, Keyable, OffsetDateTimeValue,
    SqlValue, StringValue, TimeValue, UuidValue,
};

use super::property::{ColumnKey, Property};

/// A mapped column, as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    key: ColumnKey,
    name: String,
    table: String,
    sql_type: SqlType,
    nullable: bool,
}

impl Column {
    pub(crate) const fn new(
        key: ColumnKey,
        name: String,
        table: String,
        sql_type: SqlType,
        nullable: bool,
    ) -> Self {
        Self {
            key,
            name,
            table,
            sql_type,
            nullable,
        }
    }

    /// Column name in SQL.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the table owning the column.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared SQL type.
    #[must_use]
    pub const fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    /// Whether the column accepts NULL.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The property this column maps.
    #[must_use]
    pub const fn key(&self) -> ColumnKey {
        self.key
    }

    /// `table.column`, for diagnostics.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// Foreign key declared on a single column; it references the primary key of
/// the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnForeignKey {
    pub(crate) target: TypeId,
    pub(crate) target_name: &'static str,
    pub(crate) name: Option<String>,
}

/// Reads a column value out of a record.
pub(crate) type Accessor<E> = Box<dyn Fn(&E) -> SqlValue + Send + Sync>;

/// A column after its builder has been handed to a table.
pub(crate) struct ColumnDecl<E> {
    pub(crate) key: ColumnKey,
    pub(crate) name: String,
    pub(crate) sql_type: SqlType,
    pub(crate) nullable: bool,
    pub(crate) primary_key: Option<Option<String>>,
    pub(crate) foreign_key: Option<ColumnForeignKey>,
    pub(crate) accessor: Accessor<E>,
}

/// Declares one column of a table.
///
/// `K` is [`Keyable`] when the column may be (part of) a primary key.
#[must_use]
pub struct ColumnBuilder<E, V, K> {
    property: Property<E, V>,
    name: Option<String>,
    sql_type: SqlType,
    nullable: bool,
    primary_key: Option<Option<String>>,
    foreign_key: Option<ColumnForeignKey>,
    _key: PhantomData<fn() -> K>,
}

impl<E: 'static, V: ColumnValue, K> ColumnBuilder<E, V, K> {
    const fn new(property: Property<E, V>, sql_type: SqlType, nullable: bool) -> Self {
        Self {
            property,
            name: None,
            sql_type,
            nullable,
            primary_key: None,
            foreign_key: None,
            _key: PhantomData,
        }
    }

    /// Overrides the column name, which defaults to the property name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// References the primary key of the table mapped to `R`.
    pub fn foreign_key<R: 'static>(mut self) -> Self {
        self.foreign_key = Some(ColumnForeignKey {
            target: TypeId::of::<R>(),
            target_name: type_name::<R>(),
            name: None,
        });
        self
    }

    /// References the primary key of the table mapped to `R` through a named
    /// constraint.
    pub fn foreign_key_named<R: 'static>(mut self, name: impl Into<String>) -> Self {
        self.foreign_key = Some(ColumnForeignKey {
            target: TypeId::of::<R>(),
            target_name: type_name::<R>(),
            name: Some(name.into()),
        });
        self
    }

    pub(crate) fn into_decl(self) -> ColumnDecl<E> {
        let getter = self.property.getter();
        ColumnDecl {
            key: self.property.key(),
            name: self
                .name
                .unwrap_or_else(|| String::from(self.property.name())),
            sql_type: self.sql_type,
            nullable: self.nullable,
            primary_key: self.primary_key,
            foreign_key: self.foreign_key,
            accessor: Box::new(move |entity: &E| getter(entity).to_sql_value()),
        }
    }
}

impl<E: 'static, V: ColumnValue> ColumnBuilder<E, V, Keyable> {
    /// Marks the column as the table's primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = Some(None);
        self
    }

    /// Marks the column as the table's primary key, with a constraint name.
    pub fn primary_key_named(mut self, name: impl Into<String>) -> Self {
        self.primary_key = Some(Some(name.into()));
        self
    }
}

fn typed<E: 'static, V: ColumnValue>(
    property: Property<E, V>,
    sql_type: SqlType,
) -> ColumnBuilder<E, V, V::Key> {
    ColumnBuilder::new(property, sql_type, V::NULLABLE)
}

/// VARCHAR column.
pub fn varchar<E: 'static, V: StringValue>(property: Property<E, V>) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Varchar)
}

/// TEXT column.
pub fn text<E: 'static, V: StringValue>(property: Property<E, V>) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Text)
}

/// BOOLEAN column.
pub fn boolean<E: 'static, V: BoolValue>(property: Property<E, V>) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Boolean)
}

/// INTEGER column.
pub fn integer<E: 'static, V: IntValue>(property: Property<E, V>) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Integer)
}

/// Auto-incremented integer column.
///
/// The property is optional so records can be inserted before the database
/// assigned their value; the column itself is NOT NULL and may be a primary
/// key.
pub fn serial<E: 'static>(
    property: Property<E, Option<i32>>,
) -> ColumnBuilder<E, Option<i32>, Keyable> {
    ColumnBuilder::new(property, SqlType::Serial, false)
}

/// UUID column.
pub fn uuid<E: 'static, V: UuidValue>(property: Property<E, V>) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Uuid)
}

/// DATE column.
pub fn date<E: 'static, V: DateValue>(property: Property<E, V>) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Date)
}

/// TIME column.
pub fn time<E: 'static, V: TimeValue>(property: Property<E, V>) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Time)
}

/// TIME column keeping fractional seconds.
pub fn time_with_fraction<E: 'static, V: TimeValue>(
    property: Property<E, V>,
) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::TimeWithFraction)
}

/// DATETIME column.
pub fn datetime<E: 'static, V: DateTimeValue>(
    property: Property<E, V>,
) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::DateTime)
}

/// TIMESTAMP column.
pub fn timestamp<E: 'static, V: DateTimeValue>(
    property: Property<E, V>,
) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::Timestamp)
}

/// TIMESTAMP WITH TIME ZONE column.
pub fn timestamp_with_time_zone<E: 'static, V: OffsetDateTimeValue>(
    property: Property<E, V>,
) -> ColumnBuilder<E, V, V::Key> {
    typed(property, SqlType::TimestampWithTimeZone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NotKeyable;

    struct Event {
        id: i32,
        label: Option<String>,
        seq: Option<i32>,
    }

    impl Event {
        const ID: Property<Self, i32> = Property::new("id", |e: &Self| e.id);
        const LABEL: Property<Self, Option<String>> =
            Property::new("label", |e: &Self| e.label.clone());
        const SEQ: Property<Self, Option<i32>> = Property::new("seq", |e: &Self| e.seq);
    }

    fn event() -> Event {
        Event {
            id: 7,
            label: None,
            seq: None,
        }
    }

    #[test]
    fn test_name_defaults_to_property() {
        let decl = integer(Event::ID).into_decl();
        assert_eq!(decl.name, "id");
        assert_eq!(decl.sql_type, SqlType::Integer);
        assert!(!decl.nullable);
        assert_eq!((decl.accessor)(&event()), SqlValue::Int(7));
    }

    #[test]
    fn test_alias_and_nullability() {
        let decl = varchar(Event::LABEL).name("event_label").into_decl();
        assert_eq!(decl.name, "event_label");
        assert!(decl.nullable);
        assert_eq!((decl.accessor)(&event()), SqlValue::Null);
    }

    #[test]
    fn test_primary_key_on_keyable_column() {
        let decl = integer(Event::ID).primary_key_named("PK_events").into_decl();
        assert_eq!(decl.primary_key, Some(Some(String::from("PK_events"))));
    }

    #[test]
    fn test_serial_is_not_null_and_keyable() {
        let builder: ColumnBuilder<Event, Option<i32>, Keyable> = serial(Event::SEQ);
        let decl = builder.primary_key().into_decl();
        assert!(!decl.nullable);
        assert_eq!(decl.sql_type, SqlType::Serial);
    }

    #[test]
    fn test_nullable_columns_are_not_keyable() {
        let _: ColumnBuilder<Event, Option<String>, NotKeyable> = text(Event::LABEL);
    }

    #[test]
    fn test_foreign_key_records_target() {
        let decl = integer(Event::ID).foreign_key::<String>().into_decl();
        let fk = decl.foreign_key.unwrap();
        assert_eq!(fk.target, TypeId::of::<String>());
        assert_eq!(fk.name, None);
    }
}
