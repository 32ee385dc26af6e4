//! Plan structures produced by the update planner.
//!
//! A plan is built once per statement shape and cached; everything that
//! depends on bind variables stays deferred as [`PlanValue`]s and is resolved
//! per execution through the helpers on [`UpdatePlan`].

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use vgate_result::Result;
use vgate_types::{BindVariables, PlanValue, Value};
use vgate_vschema::{ColumnVindex, Keyspace, Table};

/// Result type for plan operations.
pub type PlanResult<T> = vgate_result::Result<T>;

/// Owned vindex name to the new values of its columns, in vindex column order.
pub type ChangedVindexValues = FxHashMap<String, Vec<PlanValue>>;

// ============================================================================
// Opcode
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOpcode {
    /// Sent verbatim to the single shard of an unsharded keyspace.
    Unsharded,
    /// Routed to the one shard that the vindex value maps to.
    Equal,
}

impl fmt::Display for UpdateOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOpcode::Unsharded => f.write_str("Unsharded"),
            UpdateOpcode::Equal => f.write_str("Equal"),
        }
    }
}

// ============================================================================
// UPDATE Plan
// ============================================================================

#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub opcode: UpdateOpcode,
    pub keyspace: Arc<Keyspace>,
    pub table: Arc<Table>,
    /// Routing vindex; `None` for unsharded plans.
    pub vindex: Option<Arc<ColumnVindex>>,
    /// Routing values, one per routing vindex column used.
    pub values: Vec<PlanValue>,
    /// Statement text sent to the shard.
    pub query: String,
    pub changed_vindex_values: ChangedVindexValues,
    /// `select ... for update` that snapshots the owned vindex columns before
    /// the update runs. Present only when some owned vindex changes.
    pub owned_vindex_query: Option<String>,
}

impl UpdatePlan {
    pub(crate) fn unsharded(table: Arc<Table>, query: String) -> Self {
        Self {
            opcode: UpdateOpcode::Unsharded,
            keyspace: Arc::clone(&table.keyspace),
            table,
            vindex: None,
            values: Vec::new(),
            query,
            changed_vindex_values: ChangedVindexValues::default(),
            owned_vindex_query: None,
        }
    }

    /// Resolve the routing values against one execution's bind variables.
    pub fn resolve_routing_values(&self, binds: &BindVariables) -> Result<Vec<Value>> {
        self.values
            .iter()
            .map(|value| value.resolve_value(binds))
            .collect()
    }

    /// Resolve every changed vindex's new column values.
    pub fn resolve_changed_vindex_values(
        &self,
        binds: &BindVariables,
    ) -> Result<FxHashMap<String, Vec<Value>>> {
        let mut out = FxHashMap::default();
        for (name, values) in &self.changed_vindex_values {
            let resolved = values
                .iter()
                .map(|value| value.resolve_value(binds))
                .collect::<Result<Vec<_>>>()?;
            out.insert(name.clone(), resolved);
        }
        Ok(out)
    }

    /// Changed vindexes in the table's declaration order.
    pub fn changed_vindexes(&self) -> impl Iterator<Item = (&Arc<ColumnVindex>, &[PlanValue])> {
        self.table.column_vindexes.iter().filter_map(|cv| {
            self.changed_vindex_values
                .get(&cv.name)
                .map(|values| (cv, values.as_slice()))
        })
    }
}

impl fmt::Display for UpdatePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Opcode: {}", self.opcode)?;
        writeln!(f, "Keyspace: {}", self.keyspace.name)?;
        writeln!(f, "Table: {}", self.table.name)?;
        if let Some(vindex) = &self.vindex {
            writeln!(f, "Vindex: {}", vindex.name)?;
            let values: Vec<String> = self.values.iter().map(ToString::to_string).collect();
            writeln!(f, "Values: [{}]", values.join(", "))?;
        }
        write!(f, "Query: {}", self.query)?;
        for (cv, values) in self.changed_vindexes() {
            let values: Vec<String> = values.iter().map(ToString::to_string).collect();
            write!(f, "\nChangedVindexValues[{}]: [{}]", cv.name, values.join(", "))?;
        }
        if let Some(query) = &self.owned_vindex_query {
            write!(f, "\nOwnedVindexQuery: {query}")?;
        }
        Ok(())
    }
}
