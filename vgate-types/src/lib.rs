//! Value types shared across vgate crates.
//!
//! These types live in `vgate-types` so the vschema, planner and resolver
//! crates can exchange values, deferred plan values and shard destinations
//! without depending on one another.

pub mod key;
pub mod plan_value;
pub mod value;

pub use key::{Destination, KeyspaceId, destinations_string, uint64_key};
pub use plan_value::{BindVariable, BindVariables, PlanValue};
pub use value::{Type, Value};
