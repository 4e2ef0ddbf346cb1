//! Explicit accessor descriptors for mapped record fields.

use std::any::{type_name, TypeId};
use std::fmt;

/// Identity of one property of one record type.
///
/// Used as the key of every column lookup: two properties are the same column
/// exactly when they belong to the same type and carry the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    entity: TypeId,
    entity_name: &'static str,
    property: &'static str,
}

impl ColumnKey {
    /// Builds the key of property `property` of type `E`.
    #[must_use]
    pub fn of<E: 'static>(property: &'static str) -> Self {
        Self {
            entity: TypeId::of::<E>(),
            entity_name: type_name::<E>(),
            property,
        }
    }

    /// Type id of the record type owning the property.
    #[must_use]
    pub const fn entity(&self) -> TypeId {
        self.entity
    }

    /// Type name of the record type owning the property.
    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    /// Name of the property.
    #[must_use]
    pub const fn property(&self) -> &'static str {
        self.property
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.entity_name, self.property)
    }
}

/// A typed accessor for one field of a record type.
///
/// Properties are usually declared as associated constants of the record type,
/// either by hand or with `#[derive(Entity)]`:
///
/// ```rust
/// use oxide_tables_core::schema::Property;
///
/// struct User {
///     id: String,
///     alias: Option<String>,
/// }
///
/// impl User {
///     const ID: Property<Self, String> = Property::new("id", |u: &Self| u.id.clone());
///     const ALIAS: Property<Self, Option<String>> =
///         Property::new("alias", |u: &Self| u.alias.clone());
/// }
///
/// let user = User { id: String::from("jdoe"), alias: None };
/// assert_eq!(User::ID.get(&user), "jdoe");
/// assert_eq!(User::ALIAS.name(), "alias");
/// ```
pub struct Property<E, V> {
    name: &'static str,
    getter: fn(&E) -> V,
}

impl<E, V> Property<E, V> {
    /// Creates a property from its name and accessor.
    #[must_use]
    pub const fn new(name: &'static str, getter: fn(&E) -> V) -> Self {
        Self { name, getter }
    }

    /// Property name; the default column name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the property from `entity`.
    pub fn get(&self, entity: &E) -> V {
        (self.getter)(entity)
    }

    pub(crate) const fn getter(&self) -> fn(&E) -> V {
        self.getter
    }
}

impl<E: 'static, V> Property<E, V> {
    /// Key identifying this property in the registry.
    #[must_use]
    pub fn key(&self) -> ColumnKey {
        ColumnKey::of::<E>(self.name)
    }
}

impl<E, V> Clone for Property<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for Property<E, V> {}

impl<E, V> fmt::Debug for Property<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("entity", &type_name::<E>())
            .field("name", &self.name)
            .finish()
    }
}

/// Untyped view of a property of `E`, used where properties of different
/// value types are listed together (composite keys).
pub trait PropertyRef<E> {
    /// Key identifying the property in the registry.
    fn column_key(&self) -> ColumnKey;
}

impl<E: 'static, V> PropertyRef<E> for Property<E, V> {
    fn column_key(&self) -> ColumnKey {
        self.key()
    }
}
