//! Planning for UPDATE statements against sharded and unsharded keyspaces.
//!
//! A sharded UPDATE must route to exactly one shard through a unique vindex
//! equality in its WHERE clause. When it rewrites the columns of an owned
//! lookup vindex, the plan also carries the new values and a
//! `select ... for update` that snapshots the old ones, so the executor can
//! delete the stale lookup rows and insert the new ones.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use sqlparser::ast::{
    AssignmentTarget, BinaryOperator, Expr, ObjectName, ObjectNamePart, TableFactor, TableWithJoins,
    UnaryOperator, Value as SqlValue, visit_expressions, visit_relations,
};
use tracing::debug;
use vgate_result::{Error, Result};
use vgate_types::{PlanValue, Value};
use vgate_vschema::{ColumnVindex, Table};

use crate::plans::{ChangedVindexValues, PlanResult, UpdateOpcode, UpdatePlan};
use crate::schema_view::{RoutedTable, SchemaView};
use crate::statement::{UpdateStatement, write_comma_separated, write_tail};

/// Build the execution plan for `update`.
///
/// Positional `?` parameters are numbered `:v1`, `:v2`, ... first, so the
/// plan's query text and its deferred values name distinct bind variables.
pub fn build_update_plan(update: &UpdateStatement, schema: &dyn SchemaView) -> PlanResult<UpdatePlan> {
    let numbered = update.with_numbered_placeholders();
    let update = &numbered;
    let table = resolve_route(update, schema)?;

    if !table.keyspace.sharded {
        check_unsharded_subqueries(update, &table, schema)?;
        let plan = UpdatePlan::unsharded(table, update.to_string());
        debug!(
            table = %plan.table.name,
            keyspace = %plan.keyspace.name,
            opcode = %plan.opcode,
            "planned update"
        );
        return Ok(plan);
    }

    if has_subquery(update) {
        return Err(Error::unsupported("subqueries in sharded DML"));
    }

    let (vindex, value) = find_routing_vindex(update.selection.as_ref(), &table)?;
    let changed_vindex_values = build_changed_vindex_values(update, &table)?;
    let owned_vindex_query = if changed_vindex_values.is_empty() {
        None
    } else {
        Some(generate_update_subquery(update, &table))
    };

    let plan = UpdatePlan {
        opcode: UpdateOpcode::Equal,
        keyspace: Arc::clone(&table.keyspace),
        table,
        vindex: Some(vindex),
        values: vec![value],
        query: update.to_string(),
        changed_vindex_values,
        owned_vindex_query,
    };
    debug!(
        table = %plan.table.name,
        keyspace = %plan.keyspace.name,
        opcode = %plan.opcode,
        vindex = plan.vindex.as_ref().map(|cv| cv.name.as_str()).unwrap_or_default(),
        changed = ?plan.changed_vindex_values.keys().collect::<Vec<_>>(),
        "planned update"
    );
    Ok(plan)
}

// ============================================================================
// Routing
// ============================================================================

/// Collapse every table the statement touches into a single routed table.
fn resolve_route(update: &UpdateStatement, schema: &dyn SchemaView) -> Result<Arc<Table>> {
    let mut names = Vec::new();
    for table in update.table_refs() {
        collect_table_names(table, &mut names)?;
    }

    let mut routed: Vec<RoutedTable> = Vec::with_capacity(names.len());
    for name in names {
        routed.push(schema.find_table(name)?);
    }
    if routed.iter().any(|r| r.target_destination.is_some()) {
        return Err(Error::unsupported("UPDATE with a target destination"));
    }

    let mut iter = routed.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| Error::Internal("UPDATE without a target table".into()))?;
    for other in iter {
        let same_unsharded_keyspace = !first.table.keyspace.sharded
            && !other.table.keyspace.sharded
            && first.table.keyspace.name == other.table.keyspace.name;
        if !same_unsharded_keyspace {
            return Err(multi_table_error());
        }
    }
    Ok(first.table)
}

fn collect_table_names<'a>(table: &'a TableWithJoins, out: &mut Vec<&'a ObjectName>) -> Result<()> {
    collect_factor_names(&table.relation, out)?;
    for join in &table.joins {
        collect_factor_names(&join.relation, out)?;
    }
    Ok(())
}

fn collect_factor_names<'a>(factor: &'a TableFactor, out: &mut Vec<&'a ObjectName>) -> Result<()> {
    match factor {
        TableFactor::Table { name, .. } => {
            out.push(name);
            Ok(())
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => collect_table_names(table_with_joins, out),
        _ => Err(multi_table_error()),
    }
}

fn multi_table_error() -> Error {
    Error::unsupported("multi-table update statement in sharded keyspace")
}

/// Walk the unique vindexes cheapest first and take the first one whose
/// leading column is pinned by a top-level `column = value` conjunct.
fn find_routing_vindex(
    selection: Option<&Expr>,
    table: &Table,
) -> Result<(Arc<ColumnVindex>, PlanValue)> {
    let multi_shard = || Error::unsupported("multi-shard where clause in DML");
    let selection = selection.ok_or_else(multi_shard)?;
    let mut conjuncts = Vec::new();
    split_and_expression(selection, &mut conjuncts);

    for cv in table.ordered.iter().filter(|cv| cv.vindex.is_unique()) {
        let Some(column) = cv.columns.first() else {
            continue;
        };
        for expr in &conjuncts {
            if let Some(value) = equality_value(expr, column)? {
                return Ok((Arc::clone(cv), value));
            }
        }
    }
    Err(multi_shard())
}

fn split_and_expression<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            split_and_expression(left, out);
            split_and_expression(right, out);
        }
        Expr::Nested(inner) => split_and_expression(inner, out),
        other => out.push(other),
    }
}

fn equality_value(expr: &Expr, column: &str) -> Result<Option<PlanValue>> {
    let Expr::BinaryOp {
        left,
        op: BinaryOperator::Eq,
        right,
    } = expr
    else {
        return Ok(None);
    };
    if !expr_names_column(left, column) {
        return Ok(None);
    }
    plan_value_from_expr(right)
}

fn expr_names_column(expr: &Expr, column: &str) -> bool {
    match expr {
        Expr::Identifier(ident) => ident.value.eq_ignore_ascii_case(column),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .is_some_and(|ident| ident.value.eq_ignore_ascii_case(column)),
        _ => false,
    }
}

// ============================================================================
// Subqueries
// ============================================================================

fn is_subquery(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. }
    )
}

/// True when the SET list, WHERE, ORDER BY or LIMIT nests a subquery.
fn has_subquery(update: &UpdateStatement) -> bool {
    let found = |flow: ControlFlow<()>| flow.is_break();
    let check = |expr: &Expr| {
        if is_subquery(expr) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };
    update
        .assignments
        .iter()
        .any(|a| found(visit_expressions(&a.value, check)))
        || found(visit_expressions(&update.selection, check))
        || found(visit_expressions(&update.order_by, check))
        || found(visit_expressions(&update.limit, check))
}

/// In an unsharded keyspace a subquery may only read tables of that same
/// keyspace.
fn check_unsharded_subqueries(
    update: &UpdateStatement,
    table: &Table,
    schema: &dyn SchemaView,
) -> Result<()> {
    let check = |name: &ObjectName| match schema.find_table(name) {
        Ok(routed)
            if !routed.table.keyspace.sharded
                && routed.table.keyspace.name == table.keyspace.name =>
        {
            ControlFlow::Continue(())
        }
        Ok(_) => ControlFlow::Break(Error::unsupported("sharded subqueries in DML")),
        Err(err) => ControlFlow::Break(err),
    };
    // Outside the FROM clause, relations only appear inside subqueries.
    for assignment in &update.assignments {
        if let ControlFlow::Break(err) = visit_relations(&assignment.value, check) {
            return Err(err);
        }
    }
    for flow in [
        visit_relations(&update.selection, check),
        visit_relations(&update.order_by, check),
        visit_relations(&update.limit, check),
    ] {
        if let ControlFlow::Break(err) = flow {
            return Err(err);
        }
    }
    Ok(())
}

// ============================================================================
// Changed vindexes
// ============================================================================

/// Name of the column an assignment writes, ignoring any qualifier.
fn assignment_column(target: &AssignmentTarget) -> Option<String> {
    let AssignmentTarget::ColumnName(name) = target else {
        return None;
    };
    name.0.last().map(|part| match part {
        ObjectNamePart::Identifier(ident) => ident.value.clone(),
    })
}

/// Collect new values for every owned lookup vindex whose columns the SET
/// list rewrites, rejecting updates to vindexes that cannot change.
pub fn build_changed_vindex_values(
    update: &UpdateStatement,
    table: &Table,
) -> Result<ChangedVindexValues> {
    let mut changed = ChangedVindexValues::default();
    for (index, cv) in table.column_vindexes.iter().enumerate() {
        let mut values = Vec::with_capacity(cv.columns.len());
        for column in &cv.columns {
            let mut found: Option<&Expr> = None;
            for assignment in &update.assignments {
                let Some(target) = assignment_column(&assignment.target) else {
                    continue;
                };
                if !target.eq_ignore_ascii_case(column) {
                    continue;
                }
                if found.is_some() {
                    return Err(Error::InvalidArgumentError(format!(
                        "column has duplicate set values: '{target}'"
                    )));
                }
                found = Some(&assignment.value);
            }
            if let Some(expr) = found {
                values.push((column, expr));
            }
        }

        if values.is_empty() {
            continue;
        }
        if values.len() != cv.columns.len() {
            return Err(Error::unsupported(format!(
                "update does not have values for all the columns in vindex ({})",
                cv.name
            )));
        }
        if update.limit.is_some() && update.order_by.is_empty() {
            return Err(Error::unsupported(format!(
                "Need to provide order by clause when using limit. Invalid update on vindex: {}",
                cv.name
            )));
        }
        if index == 0 {
            return Err(Error::unsupported(format!(
                "You can't update primary vindex columns. Invalid update on vindex: {}",
                cv.name
            )));
        }
        if !cv.is_lookup() {
            return Err(Error::unsupported(format!(
                "You can only update lookup vindexes. Invalid update on vindex: {}",
                cv.name
            )));
        }
        if !cv.owned {
            return Err(Error::unsupported(format!(
                "You can only update owned vindexes. Invalid update on vindex: {}",
                cv.name
            )));
        }

        let plan_values = values
            .into_iter()
            .map(|(column, expr)| extract_value(expr, column))
            .collect::<Result<Vec<_>>>()?;
        changed.insert(cv.name.clone(), plan_values);
    }
    Ok(changed)
}

/// The `select ... for update` that reads the current owned vindex columns of
/// the rows `update` will touch.
pub fn generate_update_subquery(update: &UpdateStatement, table: &Table) -> String {
    OwnedVindexQuery { update, table }.to_string()
}

struct OwnedVindexQuery<'a> {
    update: &'a UpdateStatement,
    table: &'a Table,
}

impl fmt::Display for OwnedVindexQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<&String> = self
            .table
            .owned
            .iter()
            .flat_map(|cv| cv.columns.iter())
            .collect();
        f.write_str("select ")?;
        write_comma_separated(f, &columns)?;
        write!(f, " from {}", self.update.table)?;
        write_tail(
            f,
            self.update.selection.as_ref(),
            &self.update.order_by,
            self.update.limit.as_ref(),
        )?;
        f.write_str(" for update")
    }
}

// ============================================================================
// Values
// ============================================================================

/// Turn a SET value into a plan value. Only literals and bind variables are
/// accepted.
pub fn extract_value(expr: &Expr, column: &str) -> Result<PlanValue> {
    plan_value_from_expr(expr)?.ok_or_else(|| {
        Error::unsupported(format!(
            "Only values are supported. Invalid update on column: {column}"
        ))
    })
}

/// `Ok(None)` when `expr` is not a plain value at all; `Err` when it is one
/// but cannot be represented (a malformed hex literal).
fn plan_value_from_expr(expr: &Expr) -> Result<Option<PlanValue>> {
    match expr {
        Expr::Value(value) => plan_value_from_literal(&value.value),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match expr.as_ref() {
            Expr::Value(value) => match &value.value {
                SqlValue::Number(digits, _) => Ok(integral(&format!("-{digits}"))),
                _ => Ok(None),
            },
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn plan_value_from_literal(value: &SqlValue) -> Result<Option<PlanValue>> {
    let out = match value {
        SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => {
            Some(PlanValue::Value(Value::varbinary(s.as_bytes())))
        }
        SqlValue::HexStringLiteral(digits) => {
            let bytes = hex::decode(digits).map_err(|err| {
                Error::InvalidArgumentError(format!("invalid hex literal X'{digits}': {err}"))
            })?;
            Some(PlanValue::Value(Value::varbinary(bytes)))
        }
        SqlValue::Number(digits, _) => integral(digits),
        SqlValue::Placeholder(name) => Some(PlanValue::Placeholder(
            name.trim_start_matches(':').to_string(),
        )),
        _ => None,
    };
    Ok(out)
}

/// Integer literal as `Int64`, or `Uint64` past the signed range. Fractional
/// and exponent forms are not values for routing purposes.
fn integral(digits: &str) -> Option<PlanValue> {
    Value::integral(digits).ok().map(PlanValue::Value)
}
