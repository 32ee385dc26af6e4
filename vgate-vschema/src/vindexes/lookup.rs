use rustc_hash::FxHashMap;
use vgate_result::{Error, Result};
use vgate_types::{BindVariable, BindVariables, Destination, KeyspaceId, Value};

use crate::vindex::{VCursor, Vindex};

/// Vindex backed by a `from -> keyspace id` lookup table.
///
/// The unique flavour (`lookup_unique`) expects at most one row per value;
/// the non-unique flavour (`lookup`) may return several keyspace ids.
#[derive(Debug, Clone)]
pub struct LookupVindex {
    name: String,
    table: String,
    from: Vec<String>,
    to: String,
    unique: bool,
}

impl LookupVindex {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        from: Vec<String>,
        to: impl Into<String>,
        unique: bool,
    ) -> Result<Self> {
        let name = name.into();
        if from.is_empty() {
            return Err(Error::ConfigError(format!(
                "lookup vindex {name} needs at least one from column"
            )));
        }
        Ok(Self {
            name,
            table: table.into(),
            from,
            to: to.into(),
            unique,
        })
    }

    /// Build from vschema params: `table`, `from` (comma-separated) and `to`.
    pub fn from_params(
        name: &str,
        params: &FxHashMap<String, String>,
        unique: bool,
    ) -> Result<Self> {
        let param = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Error::ConfigError(format!("lookup vindex {name} is missing param '{key}'"))
                })
        };
        let table = param("table")?;
        let from = param("from")?
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        let to = param("to")?;
        Self::new(name, table, from, to, unique)
    }

    fn select_sql(&self) -> String {
        let from = &self.from[0];
        format!(
            "select {} from {} where {from} = :{from}",
            self.to, self.table
        )
    }
}

impl Vindex for LookupVindex {
    fn name(&self) -> &str {
        &self.name
    }

    fn cost(&self) -> u32 {
        if self.unique { 10 } else { 20 }
    }

    fn is_unique(&self) -> bool {
        self.unique
    }

    fn map(&self, cursor: Option<&dyn VCursor>, ids: &[Value]) -> Result<Vec<Destination>> {
        let cursor = cursor.ok_or_else(|| {
            Error::InvalidArgumentError(format!(
                "lookup vindex {} cannot map values without a cursor",
                self.name
            ))
        })?;
        let query = self.select_sql();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let mut binds = BindVariables::default();
            binds.insert(self.from[0].clone(), BindVariable::Value(id.clone()));
            let rows = cursor.execute(&query, &binds)?;
            let mut ksids: Vec<KeyspaceId> = rows
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .map(|v| KeyspaceId::new(v.to_bytes()))
                .collect();
            let destination = match (ksids.len(), self.unique) {
                (0, _) => Destination::None,
                (1, true) => Destination::KeyspaceId(ksids.remove(0)),
                (_, true) => {
                    return Err(Error::KeyspaceIdMapping(format!(
                        "lookup vindex {}: unexpected multiple results for {id}",
                        self.name
                    )));
                }
                (_, false) => Destination::KeyspaceIds(ksids),
            };
            out.push(destination);
        }
        Ok(out)
    }

    fn is_lookup(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RowsCursor(Vec<Vec<Value>>);

    impl VCursor for RowsCursor {
        fn execute(&self, query: &str, binds: &BindVariables) -> Result<Vec<Vec<Value>>> {
            assert_eq!(query, "select user_id from name_user_map where name = :name");
            assert!(binds.contains_key("name"));
            Ok(self.0.clone())
        }
    }

    fn vindex(unique: bool) -> LookupVindex {
        LookupVindex::new(
            "name_user_map",
            "name_user_map",
            vec!["name".into()],
            "user_id",
            unique,
        )
        .unwrap()
    }

    #[test]
    fn map_requires_a_cursor() {
        let err = vindex(true).map(None, &[Value::varchar("bob")]).unwrap_err();
        assert!(err.to_string().contains("without a cursor"));
    }

    #[test]
    fn unique_lookup_returns_single_keyspace_id() {
        let cursor = RowsCursor(vec![vec![Value::varbinary(vec![1, 2])]]);
        let out = vindex(true)
            .map(Some(&cursor), &[Value::varchar("bob")])
            .unwrap();
        assert_eq!(out, vec![Destination::KeyspaceId(KeyspaceId::new(vec![1, 2]))]);

        let many = RowsCursor(vec![vec![Value::varbinary(vec![1])], vec![Value::varbinary(vec![2])]]);
        assert!(vindex(true).map(Some(&many), &[Value::varchar("bob")]).is_err());
        let out = vindex(false)
            .map(Some(&many), &[Value::varchar("bob")])
            .unwrap();
        assert!(matches!(&out[0], Destination::KeyspaceIds(ids) if ids.len() == 2));
    }

    #[test]
    fn params_are_validated() {
        let mut params = FxHashMap::default();
        params.insert("table".to_string(), "t".to_string());
        params.insert("from".to_string(), "a, b".to_string());
        let err = LookupVindex::from_params("v", &params, true).unwrap_err();
        assert!(err.to_string().contains("'to'"));
        params.insert("to".to_string(), "ksid".to_string());
        let lookup = LookupVindex::from_params("v", &params, true).unwrap();
        assert_eq!(lookup.from, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(lookup.select_sql(), "select ksid from t where a = :a");
        assert_eq!(lookup.cost(), 10);
        assert!(lookup.is_lookup());
    }
}
