//! Keyspace, table and column-vindex metadata.
//!
//! Everything here is built once (from a vschema document or a test fixture)
//! and then shared read-only through `Arc`s by every plan and resolver.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use vgate_result::{Error, Result};

use crate::vindex::Vindex;

/// A logical database, possibly split across shards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    pub name: String,
    pub sharded: bool,
}

impl Keyspace {
    pub fn new(name: impl Into<String>, sharded: bool) -> Self {
        Self {
            name: name.into(),
            sharded,
        }
    }
}

/// A vindex bound to the table columns it covers.
pub struct ColumnVindex {
    pub name: String,
    pub columns: Vec<String>,
    pub vindex: Arc<dyn Vindex>,
    /// True when this table owns the vindex's lookup rows.
    pub owned: bool,
}

impl ColumnVindex {
    pub fn new(columns: Vec<String>, vindex: Arc<dyn Vindex>, owned: bool) -> Self {
        Self {
            name: vindex.name().to_string(),
            columns,
            vindex,
            owned,
        }
    }

    pub fn is_lookup(&self) -> bool {
        self.vindex.is_lookup()
    }
}

impl fmt::Debug for ColumnVindex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnVindex")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("cost", &self.vindex.cost())
            .field("unique", &self.vindex.is_unique())
            .field("owned", &self.owned)
            .finish()
    }
}

/// Routing metadata for one table.
#[derive(Debug)]
pub struct Table {
    pub name: String,
    pub keyspace: Arc<Keyspace>,
    /// Declaration order; index 0 is the primary vindex.
    pub column_vindexes: Vec<Arc<ColumnVindex>>,
    /// Same entries sorted by ascending cost, ties kept in declaration order.
    pub ordered: Vec<Arc<ColumnVindex>>,
    /// Owned entries in declaration order.
    pub owned: Vec<Arc<ColumnVindex>>,
}

impl Table {
    /// Build a table, checking that a sharded table has a unique primary vindex.
    pub fn new(
        name: impl Into<String>,
        keyspace: Arc<Keyspace>,
        column_vindexes: Vec<Arc<ColumnVindex>>,
    ) -> Result<Self> {
        let name = name.into();
        if keyspace.sharded {
            let primary = column_vindexes.first().ok_or_else(|| {
                Error::ConfigError(format!("missing primary col vindex for table: {name}"))
            })?;
            if !primary.vindex.is_unique() {
                return Err(Error::ConfigError(format!(
                    "primary vindex {} is not Unique for table {name}",
                    primary.name
                )));
            }
        }
        for cv in &column_vindexes {
            if cv.columns.is_empty() {
                return Err(Error::ConfigError(format!(
                    "vindex {} on table {name} has no columns",
                    cv.name
                )));
            }
        }
        let mut ordered = column_vindexes.clone();
        ordered.sort_by_key(|cv| cv.vindex.cost());
        let owned = column_vindexes
            .iter()
            .filter(|cv| cv.owned)
            .cloned()
            .collect();
        Ok(Self {
            name,
            keyspace,
            column_vindexes,
            ordered,
            owned,
        })
    }
}

/// Tables and vindexes of one keyspace.
#[derive(Debug)]
pub struct KeyspaceSchema {
    pub keyspace: Arc<Keyspace>,
    pub tables: FxHashMap<String, Arc<Table>>,
    pub vindexes: FxHashMap<String, Arc<dyn Vindex>>,
}

impl KeyspaceSchema {
    pub fn new(keyspace: Arc<Keyspace>) -> Self {
        Self {
            keyspace,
            tables: FxHashMap::default(),
            vindexes: FxHashMap::default(),
        }
    }

    pub fn add_vindex(&mut self, vindex: Arc<dyn Vindex>) {
        self.vindexes.insert(vindex.name().to_string(), vindex);
    }

    pub fn add_table(&mut self, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        self.tables.insert(table.name.clone(), Arc::clone(&table));
        table
    }

    pub fn table(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.get(name)
    }
}

/// All keyspaces known to the gateway.
#[derive(Debug, Default)]
pub struct VSchema {
    pub keyspaces: FxHashMap<String, KeyspaceSchema>,
}

impl VSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_keyspace(&mut self, schema: KeyspaceSchema) {
        self.keyspaces
            .insert(schema.keyspace.name.clone(), schema);
    }

    pub fn keyspace(&self, name: &str) -> Option<&KeyspaceSchema> {
        self.keyspaces.get(name)
    }

    /// Find a table by name, optionally qualified by keyspace.
    ///
    /// An unqualified name must be unique across keyspaces. A qualified name
    /// in an unsharded keyspace that the vschema does not list resolves to an
    /// implicit table with no vindexes, since every unsharded table lives on
    /// the keyspace's single shard anyway.
    pub fn find_table(&self, keyspace: Option<&str>, name: &str) -> Result<Arc<Table>> {
        if let Some(ks_name) = keyspace {
            let ks = self.keyspace(ks_name).ok_or_else(|| {
                Error::CatalogError(format!("keyspace {ks_name} not found in vschema"))
            })?;
            if let Some(table) = ks.table(name) {
                return Ok(Arc::clone(table));
            }
            if !ks.keyspace.sharded {
                return Ok(Arc::new(Table::new(
                    name,
                    Arc::clone(&ks.keyspace),
                    Vec::new(),
                )?));
            }
            return Err(Error::CatalogError(format!(
                "table {name} not found in keyspace {ks_name}"
            )));
        }

        let mut found: Option<&Arc<Table>> = None;
        for ks in self.keyspaces.values() {
            if let Some(table) = ks.table(name) {
                if found.is_some() {
                    return Err(Error::CatalogError(format!(
                        "ambiguous table reference: {name}"
                    )));
                }
                found = Some(table);
            }
        }
        if let Some(table) = found {
            return Ok(Arc::clone(table));
        }
        // A lone unsharded keyspace accepts tables it does not list.
        if self.keyspaces.len() == 1
            && let Some(ks) = self.keyspaces.values().next()
            && !ks.keyspace.sharded
        {
            return Ok(Arc::new(Table::new(
                name,
                Arc::clone(&ks.keyspace),
                Vec::new(),
            )?));
        }
        Err(Error::CatalogError(format!("table {name} not found")))
    }
}

/// Pick the vindex that defines a table's shard key: the cheapest unique
/// vindex, starting from the primary one and only replacing it with a
/// strictly cheaper unique vindex. The winner must be unique and cost at
/// most 1.
pub fn find_vindex_for_sharding(
    table_name: &str,
    column_vindexes: &[Arc<ColumnVindex>],
) -> Result<Arc<ColumnVindex>> {
    let mut result = column_vindexes.first().ok_or_else(|| {
        Error::CatalogError(format!("no vindex definition for table {table_name}"))
    })?;
    for cv in column_vindexes {
        if cv.vindex.cost() < result.vindex.cost() && cv.vindex.is_unique() {
            result = cv;
        }
    }
    if result.vindex.cost() > 1 || !result.vindex.is_unique() {
        return Err(Error::CatalogError(format!(
            "could not find a vindex to use for sharding table {table_name}"
        )));
    }
    Ok(Arc::clone(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vindexes::{LookupVindex, Numeric};

    fn lookup(name: &str, unique: bool) -> Arc<dyn Vindex> {
        Arc::new(LookupVindex::new(name, name, vec!["c".into()], "ksid", unique).unwrap())
    }

    fn cv(column: &str, vindex: Arc<dyn Vindex>, owned: bool) -> Arc<ColumnVindex> {
        Arc::new(ColumnVindex::new(vec![column.to_string()], vindex, owned))
    }

    #[test]
    fn sharded_table_needs_unique_primary() {
        let ks = Arc::new(Keyspace::new("user", true));
        let err = Table::new("t", Arc::clone(&ks), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("missing primary col vindex"));
        let err = Table::new("t", ks, vec![cv("c", lookup("l", false), true)]).unwrap_err();
        assert!(err.to_string().contains("is not Unique"));
    }

    #[test]
    fn table_orders_by_cost_and_collects_owned() {
        let ks = Arc::new(Keyspace::new("user", true));
        let table = Table::new(
            "user",
            ks,
            vec![
                cv("id", Arc::new(Numeric::new("hash")), false),
                cv("name", lookup("name_lkp", false), true),
                cv("email", lookup("email_lkp", true), false),
            ],
        )
        .unwrap();
        let ordered: Vec<&str> = table.ordered.iter().map(|cv| cv.name.as_str()).collect();
        assert_eq!(ordered, vec!["hash", "email_lkp", "name_lkp"]);
        let owned: Vec<&str> = table.owned.iter().map(|cv| cv.name.as_str()).collect();
        assert_eq!(owned, vec!["name_lkp"]);
        assert!(table.column_vindexes[1].is_lookup());
        assert!(!table.column_vindexes[0].is_lookup());
    }

    #[test]
    fn sharding_vindex_selection() {
        let numeric = cv("id", Arc::new(Numeric::new("num")), false);
        let unique_lookup = cv("x", lookup("ul", true), false);
        let picked = find_vindex_for_sharding("t", &[Arc::clone(&numeric), unique_lookup.clone()])
            .unwrap();
        assert_eq!(picked.name, "num");

        let err = find_vindex_for_sharding("t", &[]).unwrap_err();
        assert_eq!(err.to_string(), "no vindex definition for table t");

        let err = find_vindex_for_sharding("t", &[unique_lookup]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not find a vindex to use for sharding table t"
        );
    }

    #[test]
    fn find_table_qualified_and_unqualified() {
        let mut vschema = VSchema::new();
        let user_ks = Arc::new(Keyspace::new("user", true));
        let mut user = KeyspaceSchema::new(Arc::clone(&user_ks));
        user.add_table(
            Table::new("user", user_ks, vec![cv("id", Arc::new(Numeric::new("num")), false)])
                .unwrap(),
        );
        vschema.add_keyspace(user);
        let main_ks = Arc::new(Keyspace::new("main", false));
        let mut main = KeyspaceSchema::new(Arc::clone(&main_ks));
        main.add_table(Table::new("user", main_ks, Vec::new()).unwrap());
        vschema.add_keyspace(main);

        let err = vschema.find_table(None, "user").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        assert!(vschema.find_table(Some("user"), "user").unwrap().keyspace.sharded);
        let implicit = vschema.find_table(Some("main"), "unlisted").unwrap();
        assert!(!implicit.keyspace.sharded);
        assert!(vschema.find_table(Some("user"), "unlisted").is_err());
        assert!(vschema.find_table(None, "nope").is_err());
    }
}
