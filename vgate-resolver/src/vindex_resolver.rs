use std::sync::Arc;

use tracing::{debug, trace};
use vgate_result::{Error, Result};
use vgate_types::{KeyspaceId, Value, destinations_string};
use vgate_vschema::{ColumnVindex, KeyspaceSchema, Vindex, find_vindex_for_sharding};

use crate::debug::DebugTableFilter;
use crate::definition::{TableDefinition, TableType};
use crate::resolver::KeyspaceIdResolver;

/// Maps rows through the cheapest unique vindex of their table.
#[derive(Debug, Clone)]
pub struct VindexResolver {
    table_name: String,
    column_index: usize,
    vindex: Arc<dyn Vindex>,
    /// Absent when built from a bare column list.
    definition: Option<Arc<TableDefinition>>,
    debug_filter: DebugTableFilter,
}

impl VindexResolver {
    /// Build from a full table definition. Only base tables can be resolved.
    pub fn from_table_definition(
        keyspace: &KeyspaceSchema,
        definition: Arc<TableDefinition>,
    ) -> Result<Self> {
        if definition.table_type != TableType::BaseTable {
            return Err(Error::CatalogError(format!(
                "a keyspaceID resolver can only be created for a base table, got {}",
                definition.table_type
            )));
        }
        let column_vindex = sharding_vindex(keyspace, &definition.name)?;
        let column = sharding_column(&definition.name, &column_vindex)?;
        let column_index = definition
            .column_index(column)
            .ok_or_else(|| unknown_column(&definition.name, column))?;

        let resolver = Self {
            table_name: definition.name.clone(),
            column_index,
            vindex: Arc::clone(&column_vindex.vindex),
            definition: Some(definition),
            debug_filter: DebugTableFilter::from_env(),
        };
        resolver.log_built();
        Ok(resolver)
    }

    /// Build from a table name and its column list. Column names match
    /// case-insensitively.
    pub fn from_column_list(
        keyspace: &KeyspaceSchema,
        name: &str,
        columns: &[String],
    ) -> Result<Self> {
        let column_vindex = sharding_vindex(keyspace, name)?;
        let column = sharding_column(name, &column_vindex)?;
        let column_index = columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .ok_or_else(|| unknown_column(name, column))?;

        let resolver = Self {
            table_name: name.to_string(),
            column_index,
            vindex: Arc::clone(&column_vindex.vindex),
            definition: None,
            debug_filter: DebugTableFilter::from_env(),
        };
        resolver.log_built();
        Ok(resolver)
    }

    /// Replace the filter read from the environment.
    pub fn with_debug_filter(mut self, filter: DebugTableFilter) -> Self {
        self.debug_filter = filter;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_index(&self) -> usize {
        self.column_index
    }

    pub fn vindex(&self) -> &Arc<dyn Vindex> {
        &self.vindex
    }

    fn definition(&self, operation: &str) -> Result<&TableDefinition> {
        self.definition.as_deref().ok_or_else(|| {
            Error::CatalogError(format!(
                "{operation} needs a table definition, but the resolver for {} was built from a column list",
                self.table_name
            ))
        })
    }

    fn log_built(&self) {
        debug!(
            table = %self.table_name,
            vindex = %self.vindex.name(),
            column_index = self.column_index,
            from_definition = self.definition.is_some(),
            "built vindex resolver"
        );
    }
}

fn sharding_vindex(keyspace: &KeyspaceSchema, table: &str) -> Result<Arc<ColumnVindex>> {
    let schema = keyspace
        .table(table)
        .ok_or_else(|| Error::CatalogError(format!("no vschema definition for table {table}")))?;
    find_vindex_for_sharding(table, &schema.column_vindexes)
}

fn sharding_column<'a>(table: &str, column_vindex: &'a ColumnVindex) -> Result<&'a str> {
    column_vindex
        .columns
        .first()
        .map(String::as_str)
        .ok_or_else(|| {
            Error::CatalogError(format!(
                "vindex {} on table {table} has no columns",
                column_vindex.name
            ))
        })
}

fn unknown_column(table: &str, column: &str) -> Error {
    Error::CatalogError(format!(
        "table {table} has a Vindex on unknown column {column}"
    ))
}

impl KeyspaceIdResolver for VindexResolver {
    fn keyspace_id(&self, row: &[Value]) -> Result<KeyspaceId> {
        let value = row.get(self.column_index).ok_or_else(|| {
            Error::CatalogError(format!(
                "row of table {} has {} values but the vindex column is at index {}",
                self.table_name,
                row.len(),
                self.column_index
            ))
        })?;
        let destinations = self.vindex.map(None, std::slice::from_ref(value))?;
        let [destination] = destinations.as_slice() else {
            return Err(Error::keyspace_id_mapping(format!(
                "mapping row to keyspace id returned an invalid array of keyspace ids: {}",
                destinations_string(&destinations)
            )));
        };
        let ksid = destination.as_keyspace_id().ok_or_else(|| {
            Error::keyspace_id_mapping(format!(
                "could not map {value} to a keyspace id, got destination {destination}"
            ))
        })?;
        trace!(table = %self.table_name, %value, keyspace_id = %ksid, "resolved row");
        Ok(ksid.clone())
    }

    fn should_debug(&self) -> Result<bool> {
        let table = self
            .definition
            .as_deref()
            .map_or(self.table_name.as_str(), |d| d.name.as_str());
        Ok(self.debug_filter.matches(table))
    }

    fn primary_columns(&self) -> Result<&[String]> {
        Ok(&self.definition("primary_columns")?.primary_key_columns)
    }

    /// For each primary-key column, its first position in the primary-key
    /// list itself (not in the row).
    fn primary_indexes(&self) -> Result<Vec<usize>> {
        let names = &self.definition("primary_indexes")?.primary_key_columns;
        Ok(names
            .iter()
            .filter_map(|name| names.iter().position(|n| n == name))
            .collect())
    }
}
