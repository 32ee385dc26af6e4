//! Row-shape and keyspace metadata the resolvers are built from.

use std::fmt;

/// Whether a schema object stores rows or only projects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableType {
    #[default]
    BaseTable,
    View,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::BaseTable => f.write_str("BASE TABLE"),
            TableType::View => f.write_str("VIEW"),
        }
    }
}

/// Column layout of one table as copied row by row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDefinition {
    pub name: String,
    /// Columns in row order.
    pub columns: Vec<String>,
    pub primary_key_columns: Vec<String>,
    pub table_type: TableType,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            ..Self::default()
        }
    }

    pub fn with_primary_key(mut self, columns: Vec<String>) -> Self {
        self.primary_key_columns = columns;
        self
    }

    pub fn with_table_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    /// Row index of the column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Declared type of a keyspace-wide sharding column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyspaceIdType {
    #[default]
    Unset,
    Uint64,
    Bytes,
}

impl fmt::Display for KeyspaceIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyspaceIdType::Unset => f.write_str("UNSET"),
            KeyspaceIdType::Uint64 => f.write_str("UINT64"),
            KeyspaceIdType::Bytes => f.write_str("BYTES"),
        }
    }
}

/// Keyspace record for the fixed sharding-column scheme, where every table
/// carries its keyspace id in a column of the same name and type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyspaceInfo {
    pub name: String,
    pub sharding_column_name: String,
    pub sharding_column_type: KeyspaceIdType,
}

impl KeyspaceInfo {
    pub fn new(
        name: impl Into<String>,
        sharding_column_name: impl Into<String>,
        sharding_column_type: KeyspaceIdType,
    ) -> Self {
        Self {
            name: name.into(),
            sharding_column_name: sharding_column_name.into(),
            sharding_column_type,
        }
    }
}
