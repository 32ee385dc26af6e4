//! JSON vschema documents.
//!
//! ```json
//! {
//!   "keyspaces": {
//!     "user": {
//!       "sharded": true,
//!       "vindexes": {
//!         "hash": { "type": "numeric" },
//!         "name_user_map": {
//!           "type": "lookup",
//!           "params": { "table": "name_user_map", "from": "name", "to": "user_id" },
//!           "owner": "user"
//!         }
//!       },
//!       "tables": {
//!         "user": {
//!           "column_vindexes": [
//!             { "column": "id", "name": "hash" },
//!             { "column": "name", "name": "name_user_map" }
//!           ]
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vgate_result::{Error, Result};

use crate::schema::{ColumnVindex, Keyspace, KeyspaceSchema, Table, VSchema};
use crate::vindexes::create_vindex;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VSchemaConfig {
    #[serde(default)]
    pub keyspaces: BTreeMap<String, KeyspaceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyspaceConfig {
    #[serde(default)]
    pub sharded: bool,
    #[serde(default)]
    pub vindexes: BTreeMap<String, VindexConfig>,
    #[serde(default)]
    pub tables: BTreeMap<String, TableConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VindexConfig {
    #[serde(rename = "type")]
    pub vindex_type: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Table that owns (maintains) the vindex's lookup rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub column_vindexes: Vec<ColumnVindexConfig>,
}

/// Either `column` or `columns` names the covered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnVindexConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    pub name: String,
}

impl ColumnVindexConfig {
    fn column_list(&self, table: &str) -> Result<Vec<String>> {
        match (&self.column, self.columns.is_empty()) {
            (Some(column), true) => Ok(vec![column.clone()]),
            (None, false) => Ok(self.columns.clone()),
            (Some(_), false) => Err(Error::ConfigError(format!(
                "can't use column and columns at the same time in vindex ({}) and table ({table})",
                self.name
            ))),
            (None, true) => Err(Error::ConfigError(format!(
                "must specify at least one column for vindex ({}) and table ({table})",
                self.name
            ))),
        }
    }
}

impl VSchemaConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Error::config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Internal(e.to_string()))
    }

    /// Instantiate every vindex and table into an immutable [`VSchema`].
    pub fn build(&self) -> Result<VSchema> {
        let mut vschema = VSchema::new();
        for (ks_name, ks_config) in &self.keyspaces {
            vschema.add_keyspace(build_keyspace(ks_name, ks_config)?);
        }
        Ok(vschema)
    }
}

fn build_keyspace(name: &str, config: &KeyspaceConfig) -> Result<KeyspaceSchema> {
    let keyspace = Arc::new(Keyspace::new(name, config.sharded));
    let mut schema = KeyspaceSchema::new(Arc::clone(&keyspace));

    for (vindex_name, vindex_config) in &config.vindexes {
        let params: FxHashMap<String, String> = vindex_config
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        schema.add_vindex(create_vindex(
            &vindex_config.vindex_type,
            vindex_name,
            &params,
        )?);
    }

    for (table_name, table_config) in &config.tables {
        let mut column_vindexes = Vec::with_capacity(table_config.column_vindexes.len());
        for cv_config in &table_config.column_vindexes {
            let vindex = schema.vindexes.get(&cv_config.name).ok_or_else(|| {
                Error::ConfigError(format!(
                    "vindex {} not found for table {table_name}",
                    cv_config.name
                ))
            })?;
            let owned = config
                .vindexes
                .get(&cv_config.name)
                .and_then(|v| v.owner.as_deref())
                == Some(table_name.as_str());
            column_vindexes.push(Arc::new(ColumnVindex::new(
                cv_config.column_list(table_name)?,
                Arc::clone(vindex),
                owned,
            )));
        }
        let table = Table::new(table_name, Arc::clone(&keyspace), column_vindexes)?;
        schema.add_table(table);
    }

    debug!(
        keyspace = name,
        sharded = config.sharded,
        tables = schema.tables.len(),
        vindexes = schema.vindexes.len(),
        "built keyspace schema"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_and_columns_are_exclusive() {
        let cv = ColumnVindexConfig {
            column: Some("a".into()),
            columns: vec!["b".into()],
            name: "v".into(),
        };
        let err = cv.column_list("t").unwrap_err();
        assert!(err.to_string().contains("at the same time"));

        let cv = ColumnVindexConfig {
            column: None,
            columns: Vec::new(),
            name: "v".into(),
        };
        assert!(cv.column_list("t").is_err());
    }

    #[test]
    fn unknown_vindex_type_is_rejected() {
        let config = VSchemaConfig::from_json(
            r#"{"keyspaces":{"ks":{"sharded":true,"vindexes":{"v":{"type":"md5"}}}}}"#,
        )
        .unwrap();
        let err = config.build().unwrap_err();
        assert!(err.to_string().contains("vindex type md5 not found"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = VSchemaConfig::from_json("{\"keyspaces\": 3}").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
