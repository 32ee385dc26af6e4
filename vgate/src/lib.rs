//! vgate: UPDATE routing and keyspace-id resolution for sharded MySQL.
//!
//! This crate is the entrypoint of the workspace. It re-exports the pieces a
//! gateway or copy worker needs from the underlying `vgate-*` crates:
//!
//! - **Schema** (`vgate-vschema`): keyspaces, tables, vindexes, JSON vschema loading.
//! - **Planning** (`vgate-plan`): the UPDATE statement model and planner.
//! - **Resolution** (`vgate-resolver`): row to keyspace-id resolvers.
//! - **Values** (`vgate-types`): SQL values, plan values, keyspace ids, destinations.
//!
//! ```rust
//! use vgate::{UpdateStatement, VSchemaConfig, build_update_plan};
//!
//! let vschema = VSchemaConfig::from_json(r#"{"keyspaces": {"main": {"tables": {"t": {}}}}}"#)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let update = UpdateStatement::parse("update t set a = 1").unwrap();
//! let plan = build_update_plan(&update, &vschema).unwrap();
//! assert_eq!(plan.query, "update t set a = 1");
//! ```

pub use vgate_plan::{
    SchemaView, TargetedSchema, UpdateOpcode, UpdatePlan, UpdateStatement, build_update_plan,
};
pub use vgate_resolver::{
    DebugTableFilter, KeyspaceIdResolver, KeyspaceIdType, KeyspaceInfo, ShardingColumnResolver,
    TableDefinition, TableType, VindexResolver,
};
pub use vgate_result::{Error, Result};
pub use vgate_types::{BindVariable, BindVariables, Destination, KeyspaceId, PlanValue, Value};
pub use vgate_vschema::{VSchema, VSchemaConfig};

pub mod vschema {
    pub use vgate_vschema::*;
}
