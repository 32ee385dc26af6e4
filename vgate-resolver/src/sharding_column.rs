use tracing::debug;
use vgate_result::{Error, Result};
use vgate_types::{KeyspaceId, Value, uint64_key};

use crate::definition::{KeyspaceIdType, KeyspaceInfo, TableDefinition, TableType};
use crate::resolver::KeyspaceIdResolver;

const RESOLVER_NAME: &str = "sharding column";

/// Legacy scheme: every table stores its keyspace id in one keyspace-wide
/// column whose name and type come from the keyspace record.
#[derive(Debug, Clone)]
pub struct ShardingColumnResolver {
    column_type: KeyspaceIdType,
    column_index: usize,
}

impl ShardingColumnResolver {
    pub fn new(keyspace: &KeyspaceInfo, table: &TableDefinition) -> Result<Self> {
        if keyspace.sharding_column_name.is_empty() {
            return Err(Error::CatalogError(
                "ShardingColumnName needs to be set for a v2 sharding key".into(),
            ));
        }
        if keyspace.sharding_column_type == KeyspaceIdType::Unset {
            return Err(Error::CatalogError(
                "ShardingColumnType needs to be set for a v2 sharding key".into(),
            ));
        }
        if table.table_type != TableType::BaseTable {
            return Err(Error::CatalogError(format!(
                "a keyspaceID resolver can only be created for a base table, got {}",
                table.table_type
            )));
        }
        let column_index = table
            .column_index(&keyspace.sharding_column_name)
            .ok_or_else(|| {
                Error::CatalogError(format!(
                    "table {} doesn't have a column named '{}'",
                    table.name, keyspace.sharding_column_name
                ))
            })?;

        debug!(
            keyspace = %keyspace.name,
            table = %table.name,
            column = %keyspace.sharding_column_name,
            column_type = %keyspace.sharding_column_type,
            column_index,
            "built sharding column resolver"
        );
        Ok(Self {
            column_type: keyspace.sharding_column_type,
            column_index,
        })
    }

    pub fn column_index(&self) -> usize {
        self.column_index
    }
}

impl KeyspaceIdResolver for ShardingColumnResolver {
    fn keyspace_id(&self, row: &[Value]) -> Result<KeyspaceId> {
        let value = row.get(self.column_index).ok_or_else(|| {
            Error::CatalogError(format!(
                "row has {} values but the sharding column is at index {}",
                row.len(),
                self.column_index
            ))
        })?;
        match self.column_type {
            KeyspaceIdType::Bytes => Ok(KeyspaceId::new(value.to_bytes())),
            KeyspaceIdType::Uint64 => {
                let id = value
                    .to_u64()
                    .map_err(|err| Error::keyspace_id_mapping(format!("Non numerical value: {err}")))?;
                Ok(uint64_key(id))
            }
            KeyspaceIdType::Unset => Err(Error::keyspace_id_mapping(format!(
                "unsupported ShardingColumnType: {}",
                self.column_type
            ))),
        }
    }

    fn should_debug(&self) -> Result<bool> {
        Err(Error::unsupported_for_resolver("should_debug", RESOLVER_NAME))
    }

    fn primary_columns(&self) -> Result<&[String]> {
        Err(Error::unsupported_for_resolver("primary_columns", RESOLVER_NAME))
    }

    fn primary_indexes(&self) -> Result<Vec<usize>> {
        Err(Error::unsupported_for_resolver("primary_indexes", RESOLVER_NAME))
    }
}
