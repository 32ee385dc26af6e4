//! Deferred values carried by cached plans.
//!
//! A plan is built once per statement shape and executed many times with
//! different bind variables. [`PlanValue`] records, at plan time, either the
//! literal the statement contained or the name of the bind variable that will
//! supply it. Resolution against a [`BindVariables`] map is a pure function and
//! never happens inside the planner.

use std::fmt;

use rustc_hash::FxHashMap;
use vgate_result::{Error, Result};

use crate::value::Value;

/// A bind variable supplied at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum BindVariable {
    Value(Value),
    List(Vec<Value>),
}

impl From<Value> for BindVariable {
    fn from(value: Value) -> Self {
        BindVariable::Value(value)
    }
}

impl From<Vec<Value>> for BindVariable {
    fn from(values: Vec<Value>) -> Self {
        BindVariable::List(values)
    }
}

/// Bind variables keyed by name, without the leading `:`.
pub type BindVariables = FxHashMap<String, BindVariable>;

/// A value known at plan time or deferred to a bind variable.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanValue {
    /// Literal taken from the statement text.
    Value(Value),
    /// Scalar bind variable (`:name`).
    Placeholder(String),
}

impl PlanValue {
    /// Resolve to a single value.
    pub fn resolve_value(&self, binds: &BindVariables) -> Result<Value> {
        match self {
            PlanValue::Value(value) => Ok(value.clone()),
            PlanValue::Placeholder(name) => match lookup(binds, name)? {
                BindVariable::Value(value) => Ok(value.clone()),
                BindVariable::List(_) => Err(Error::InvalidArgumentError(format!(
                    "a list was supplied where a single value was expected for :{name}"
                ))),
            },
        }
    }
}

fn lookup<'a>(binds: &'a BindVariables, name: &str) -> Result<&'a BindVariable> {
    binds
        .get(name)
        .ok_or_else(|| Error::InvalidArgumentError(format!("missing bind var {name}")))
}

impl From<Value> for PlanValue {
    fn from(value: Value) -> Self {
        PlanValue::Value(value)
    }
}

impl fmt::Display for PlanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanValue::Value(value) => write!(f, "{value}"),
            PlanValue::Placeholder(name) => write!(f, ":{name}"),
        }
    }
}
