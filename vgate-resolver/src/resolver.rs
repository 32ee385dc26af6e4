use vgate_result::Result;
use vgate_types::{KeyspaceId, Value};

/// Maps a table row to the keyspace id that decides its shard.
///
/// A resolver is built once per copied table and then called for every row,
/// possibly from many threads at once.
pub trait KeyspaceIdResolver: Send + Sync {
    /// Keyspace id of `row`, whose values are in table column order.
    fn keyspace_id(&self, row: &[Value]) -> Result<KeyspaceId>;

    /// Whether rows of this table should be traced while resolving.
    fn should_debug(&self) -> Result<bool>;

    /// Primary-key column names, used to label traced rows.
    fn primary_columns(&self) -> Result<&[String]>;

    /// Positions reported for the primary-key columns.
    fn primary_indexes(&self) -> Result<Vec<usize>>;
}
