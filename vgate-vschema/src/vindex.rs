//! The vindex capability.
//!
//! A vindex maps column values to the destinations that hold the rows with
//! those values. The planner and the resolvers only ever call [`Vindex::map`]
//! and inspect the cost, uniqueness and lookup flags; the hashing scheme or
//! backing lookup table stays behind this trait.

use std::fmt;

use vgate_result::Result;
use vgate_types::{BindVariables, Destination, Value};

/// Session context a vindex may use to query its backing storage.
///
/// Batch callers (copy workers) pass no cursor at all; only lookup vindexes
/// need one.
pub trait VCursor {
    /// Execute `query` with `binds` and return the result rows.
    fn execute(&self, query: &str, binds: &BindVariables) -> Result<Vec<Vec<Value>>>;
}

/// Maps column values to shard destinations.
pub trait Vindex: fmt::Debug + Send + Sync {
    /// Name the vindex was declared under.
    fn name(&self) -> &str;

    /// Relative cost of a `map` call; lower is cheaper. Functional vindexes
    /// cost 1, lookups cost 10 or more.
    fn cost(&self) -> u32;

    /// True when every value maps to at most one keyspace id.
    fn is_unique(&self) -> bool;

    /// Map each value in `ids` to one destination, in order.
    fn map(&self, cursor: Option<&dyn VCursor>, ids: &[Value]) -> Result<Vec<Destination>>;

    /// True for vindexes backed by a lookup table that must be kept in sync
    /// with the owning table's rows. Only these can change on UPDATE.
    fn is_lookup(&self) -> bool {
        false
    }
}
