//! Routing metadata: keyspaces, tables, column vindexes and the vindex
//! implementations that map column values to shards.

pub mod config;
pub mod schema;
pub mod vindex;
pub mod vindexes;

pub use config::{ColumnVindexConfig, KeyspaceConfig, TableConfig, VSchemaConfig, VindexConfig};
pub use schema::{ColumnVindex, Keyspace, KeyspaceSchema, Table, VSchema, find_vindex_for_sharding};
pub use vindex::{VCursor, Vindex};
pub use vindexes::create_vindex;
