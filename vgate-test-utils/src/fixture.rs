//! Caller-owned vschema fixtures.
//!
//! Each test builds its own [`VSchema`]; nothing here is shared between tests.

use std::collections::BTreeMap;

use vgate_vschema::{
    ColumnVindexConfig, KeyspaceConfig, TableConfig, VSchema, VSchemaConfig, VindexConfig,
};

#[derive(Debug, Clone, Default)]
pub struct SchemaFixture {
    config: VSchemaConfig,
}

impl SchemaFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyspace(mut self, name: &str, sharded: bool) -> Self {
        self.config
            .keyspaces
            .entry(name.to_string())
            .or_default()
            .sharded = sharded;
        self
    }

    /// Declare a vindex. `params` are `(key, value)` pairs; `owner` names the
    /// table that maintains a lookup vindex.
    pub fn vindex(
        mut self,
        keyspace: &str,
        name: &str,
        vindex_type: &str,
        params: &[(&str, &str)],
        owner: Option<&str>,
    ) -> Self {
        let params: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.keyspace_mut(keyspace).vindexes.insert(
            name.to_string(),
            VindexConfig {
                vindex_type: vindex_type.to_string(),
                params,
                owner: owner.map(str::to_string),
            },
        );
        self
    }

    /// Declare a table; each entry is `(columns, vindex name)`, primary first.
    pub fn table(mut self, keyspace: &str, name: &str, column_vindexes: &[(&[&str], &str)]) -> Self {
        let column_vindexes = column_vindexes
            .iter()
            .map(|(columns, vindex)| ColumnVindexConfig {
                column: None,
                columns: columns.iter().map(|c| c.to_string()).collect(),
                name: vindex.to_string(),
            })
            .collect();
        self.keyspace_mut(keyspace)
            .tables
            .insert(name.to_string(), TableConfig { column_vindexes });
        self
    }

    pub fn config(&self) -> &VSchemaConfig {
        &self.config
    }

    /// Build the vschema. Panics on an inconsistent fixture.
    pub fn build(&self) -> VSchema {
        self.config
            .build()
            .unwrap_or_else(|err| panic!("invalid schema fixture: {err}"))
    }

    fn keyspace_mut(&mut self, name: &str) -> &mut KeyspaceConfig {
        self.config.keyspaces.entry(name.to_string()).or_default()
    }
}

/// A sharded `user` keyspace and an unsharded `main` keyspace.
///
/// * `user`: `id` (numeric, primary), `name` (owned lookup), `costly` (owned
///   lookup), `email` (unowned unique lookup)
/// * `user_extra`: `user_id` (numeric, primary)
/// * `music`: `user_id` (numeric, primary), `id` (owned unique lookup)
/// * `multi`: `id` (numeric, primary), `num` (numeric), `(a, b)` (owned lookup)
/// * `main.unsharded`, `main.unsharded_b`
pub fn user_fixture() -> SchemaFixture {
    fn lookup(table: &str, from: &str) -> [(&'static str, String); 3] {
        [
            ("table", table.to_string()),
            ("from", from.to_string()),
            ("to", "keyspace_id".to_string()),
        ]
    }
    let mut fixture = SchemaFixture::new()
        .keyspace("user", true)
        .keyspace("main", false)
        .vindex("user", "user_index", "numeric", &[], None)
        .vindex("user", "num_index", "numeric", &[], None);

    let lookups = [
        ("name_user_map", "lookup", "name", Some("user")),
        ("costly_map", "lookup", "costly", Some("user")),
        ("email_user_map", "lookup_unique", "email", None),
        ("music_user_map", "lookup_unique", "id", Some("music")),
        ("ab_map", "lookup", "a,b", Some("multi")),
    ];
    for (name, vindex_type, from, owner) in lookups {
        let params = lookup(name, from);
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fixture = fixture.vindex("user", name, vindex_type, &params, owner);
    }

    fixture
        .table(
            "user",
            "user",
            &[
                (&["id"], "user_index"),
                (&["name"], "name_user_map"),
                (&["costly"], "costly_map"),
                (&["email"], "email_user_map"),
            ],
        )
        .table("user", "user_extra", &[(&["user_id"], "user_index")])
        .table(
            "user",
            "music",
            &[(&["user_id"], "user_index"), (&["id"], "music_user_map")],
        )
        .table(
            "user",
            "multi",
            &[
                (&["id"], "user_index"),
                (&["num"], "num_index"),
                (&["a", "b"], "ab_map"),
            ],
        )
        .table("main", "unsharded", &[])
        .table("main", "unsharded_b", &[])
}
