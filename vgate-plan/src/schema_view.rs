use std::sync::Arc;

use sqlparser::ast::{Ident, ObjectName, ObjectNamePart};
use vgate_result::{Error, Result};
use vgate_types::Destination;
use vgate_vschema::{Table, VSchema};

/// A table reference resolved to its routing metadata.
#[derive(Debug, Clone)]
pub struct RoutedTable {
    pub table: Arc<Table>,
    /// Explicit shard target the session pinned, if any.
    pub target_destination: Option<Destination>,
}

impl RoutedTable {
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            target_destination: None,
        }
    }
}

/// Name resolution the planner needs from the schema layer.
pub trait SchemaView {
    /// Resolve a `table` or `keyspace.table` reference.
    fn find_table(&self, name: &ObjectName) -> Result<RoutedTable>;
}

impl SchemaView for VSchema {
    fn find_table(&self, name: &ObjectName) -> Result<RoutedTable> {
        let (keyspace, table) = split_table_name(name)?;
        let table = VSchema::find_table(self, keyspace.as_deref(), &table)?;
        Ok(RoutedTable::new(table))
    }
}

/// A view whose session targets a keyspace and, optionally, an explicit
/// destination inside it (`use ks:-80`, `use ks[shard]`).
///
/// Unqualified names resolve inside the target keyspace, and every table of
/// that keyspace carries the target destination.
#[derive(Debug)]
pub struct TargetedSchema<'a, S: SchemaView + ?Sized> {
    inner: &'a S,
    keyspace: String,
    destination: Option<Destination>,
}

impl<'a, S: SchemaView + ?Sized> TargetedSchema<'a, S> {
    pub fn new(inner: &'a S, keyspace: impl Into<String>) -> Self {
        Self {
            inner,
            keyspace: keyspace.into(),
            destination: None,
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }
}

impl<S: SchemaView + ?Sized> SchemaView for TargetedSchema<'_, S> {
    fn find_table(&self, name: &ObjectName) -> Result<RoutedTable> {
        let qualified = if name.0.len() == 1 {
            let mut parts = vec![ObjectNamePart::Identifier(Ident::new(&self.keyspace))];
            parts.extend(name.0.iter().cloned());
            ObjectName(parts)
        } else {
            name.clone()
        };
        let mut routed = self.inner.find_table(&qualified)?;
        if routed.table.keyspace.name == self.keyspace && routed.target_destination.is_none() {
            routed.target_destination = self.destination.clone();
        }
        Ok(routed)
    }
}

/// Split an object name into its optional keyspace qualifier and table name.
pub fn split_table_name(name: &ObjectName) -> Result<(Option<String>, String)> {
    let parts: Vec<&str> = name
        .0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => ident.value.as_str(),
        })
        .collect();
    match parts.as_slice() {
        [table] => Ok((None, (*table).to_string())),
        [keyspace, table] => Ok((Some((*keyspace).to_string()), (*table).to_string())),
        _ => Err(Error::CatalogError(format!("invalid table name: {name}"))),
    }
}
