//! Row to keyspace-id resolution for copy and resharding workers.
//!
//! Two schemes exist: [`ShardingColumnResolver`] reads a keyspace-wide
//! sharding column, [`VindexResolver`] maps a column through the table's
//! cheapest unique vindex. Both implement [`KeyspaceIdResolver`].

pub mod debug;
pub mod definition;
pub mod resolver;
pub mod sharding_column;
pub mod vindex_resolver;

pub use debug::{DEBUG_TABLES_ENV, DebugTableFilter};
pub use definition::{KeyspaceIdType, KeyspaceInfo, TableDefinition, TableType};
pub use resolver::KeyspaceIdResolver;
pub use sharding_column::ShardingColumnResolver;
pub use vindex_resolver::VindexResolver;
