//! UPDATE planning for sharded keyspaces.
//!
//! [`build_update_plan`] turns an [`UpdateStatement`] plus the routing
//! metadata exposed by a [`SchemaView`] into an [`UpdatePlan`]: either a
//! verbatim pass-through for an unsharded keyspace, or a single-shard route
//! with the owned lookup vindexes the statement rewrites.

pub mod plans;
pub mod schema_view;
pub mod statement;
pub mod update;

pub use plans::{ChangedVindexValues, PlanResult, UpdateOpcode, UpdatePlan};
pub use schema_view::{RoutedTable, SchemaView, TargetedSchema, split_table_name};
pub use statement::UpdateStatement;
pub use update::{
    build_changed_vindex_values, build_update_plan, extract_value, generate_update_subquery,
};
