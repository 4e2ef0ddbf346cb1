//! Table mapping: properties, column and key declarations, and the registry.
//!
//! Record types are plain structs. Each mapped field is described by a
//! [`Property`] constant; tables list their columns through the typed column
//! constructors ([`varchar`], [`integer`], ...) and are sealed into a
//! [`Tables`] registry before any statement is built.

mod column;
mod key;
mod property;
mod registry;
mod table;

pub use column::{
    boolean, date, datetime, integer, serial, text, time, time_with_fraction, timestamp,
    timestamp_with_time_zone, uuid, varchar, Column, ColumnBuilder,
};
pub use key::{ForeignKey, PrimaryKey};
pub use property::{ColumnKey, Property, PropertyRef};
pub use registry::{Tables, TablesBuilder};
pub use table::{HasColumns, NoColumns, Table, TableBuilder, TableMeta};

pub(crate) use registry::unmapped;
