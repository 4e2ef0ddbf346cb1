//! Primary and foreign key metadata.

use std::any::TypeId;
use std::slice;

use super::property::ColumnKey;

/// Primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKey {
    /// Key made of one column.
    Single {
        /// Constraint name, if one was given.
        name: Option<String>,
        /// Key column.
        column: ColumnKey,
    },
    /// Key made of several columns, in declaration order.
    Composite {
        /// Constraint name, if one was given.
        name: Option<String>,
        /// Key columns.
        columns: Vec<ColumnKey>,
    },
}

impl PrimaryKey {
    /// Constraint name given at declaration.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Single { name, .. } | Self::Composite { name, .. } => name.as_deref(),
        }
    }

    /// Key columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnKey] {
        match self {
            Self::Single { column, .. } => slice::from_ref(column),
            Self::Composite { columns, .. } => columns,
        }
    }
}

/// Foreign key from a table to another, already registered, table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignKey {
    /// One local column referencing one column.
    Single {
        /// Constraint name, if one was given.
        name: Option<String>,
        /// Local column.
        column: ColumnKey,
        /// Referenced column.
        references: ColumnKey,
    },
    /// Equal-length lists of local and referenced columns.
    Composite {
        /// Constraint name, if one was given.
        name: Option<String>,
        /// Local columns.
        columns: Vec<ColumnKey>,
        /// Referenced columns, aligned with `columns`.
        references: Vec<ColumnKey>,
    },
}

impl ForeignKey {
    /// Constraint name given at declaration.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Single { name, .. } | Self::Composite { name, .. } => name.as_deref(),
        }
    }

    /// Local columns.
    #[must_use]
    pub fn columns(&self) -> &[ColumnKey] {
        match self {
            Self::Single { column, .. } => slice::from_ref(column),
            Self::Composite { columns, .. } => columns,
        }
    }

    /// Referenced columns, aligned with [`columns`](Self::columns).
    #[must_use]
    pub fn references(&self) -> &[ColumnKey] {
        match self {
            Self::Single { references, .. } => slice::from_ref(references),
            Self::Composite { references, .. } => references,
        }
    }

    /// Record type of the referenced table.
    #[must_use]
    pub fn referenced_entity(&self) -> Option<TypeId> {
        self.references().first().map(ColumnKey::entity)
    }

    /// Local and referenced column pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (ColumnKey, ColumnKey)> + '_ {
        self.columns()
            .iter()
            .copied()
            .zip(self.references().iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order;
    struct Customer;

    #[test]
    fn test_single_keys_expose_one_column() {
        let pk = PrimaryKey::Single {
            name: None,
            column: ColumnKey::of::<Order>("id"),
        };
        assert_eq!(pk.columns(), &[ColumnKey::of::<Order>("id")]);
        assert_eq!(pk.name(), None);
    }

    #[test]
    fn test_composite_foreign_key_pairs() {
        let fk = ForeignKey::Composite {
            name: Some(String::from("FK_orders_customers")),
            columns: vec![
                ColumnKey::of::<Order>("customer_region"),
                ColumnKey::of::<Order>("customer_number"),
            ],
            references: vec![
                ColumnKey::of::<Customer>("region"),
                ColumnKey::of::<Customer>("number"),
            ],
        };
        assert_eq!(fk.name(), Some("FK_orders_customers"));
        assert_eq!(fk.referenced_entity(), Some(TypeId::of::<Customer>()));
        let pairs: Vec<_> = fk.pairs().map(|(l, r)| (l.property(), r.property())).collect();
        assert_eq!(
            pairs,
            vec![("customer_region", "region"), ("customer_number", "number")]
        );
    }
}
