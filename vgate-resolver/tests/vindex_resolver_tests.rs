use std::sync::Arc;
use std::thread;

use vgate_resolver::{
    DebugTableFilter, KeyspaceIdResolver, TableDefinition, TableType, VindexResolver,
};
use vgate_result::{Error, Result};
use vgate_test_utils::user_fixture;
use vgate_types::{Destination, KeyspaceId, Value, uint64_key};
use vgate_vschema::{ColumnVindex, Keyspace, KeyspaceSchema, Table, VCursor, Vindex, VSchema};

/// Functional vindex that answers with a fixed set of destinations.
#[derive(Debug)]
struct FixedVindex {
    destinations: Vec<Destination>,
}

impl Vindex for FixedVindex {
    fn name(&self) -> &str {
        "fixed"
    }

    fn cost(&self) -> u32 {
        1
    }

    fn is_unique(&self) -> bool {
        true
    }

    fn map(&self, _cursor: Option<&dyn VCursor>, ids: &[Value]) -> Result<Vec<Destination>> {
        assert_eq!(ids.len(), 1);
        Ok(self.destinations.clone())
    }
}

fn keyspace_with(destinations: Vec<Destination>) -> KeyspaceSchema {
    let keyspace = Arc::new(Keyspace::new("ks", true));
    let mut schema = KeyspaceSchema::new(Arc::clone(&keyspace));
    let vindex: Arc<dyn Vindex> = Arc::new(FixedVindex { destinations });
    schema.add_vindex(Arc::clone(&vindex));
    let column_vindexes = vec![Arc::new(ColumnVindex::new(vec!["c".into()], vindex, false))];
    schema.add_table(Table::new("t", keyspace, column_vindexes).unwrap());
    schema
}

fn definition(columns: &[&str], primary_key: &[&str]) -> Arc<TableDefinition> {
    Arc::new(
        TableDefinition::new("t", columns.iter().map(|c| c.to_string()).collect())
            .with_primary_key(primary_key.iter().map(|c| c.to_string()).collect()),
    )
}

fn user_keyspace() -> VSchema {
    user_fixture().build()
}

#[test]
fn returns_the_vindex_keyspace_id_unchanged() {
    let ks = keyspace_with(vec![Destination::KeyspaceId(KeyspaceId::new(vec![0x12, 0x34]))]);
    let resolver = VindexResolver::from_table_definition(&ks, definition(&["a", "c"], &["a"])).unwrap();
    assert_eq!(resolver.column_index(), 1);
    let ksid = resolver
        .keyspace_id(&[Value::int64(1), Value::int64(2)])
        .unwrap();
    assert_eq!(ksid.as_bytes(), &[0x12, 0x34]);
}

#[test]
fn rejects_zero_or_many_destinations() {
    let row = [Value::int64(5)];
    let ks = keyspace_with(Vec::new());
    let resolver = VindexResolver::from_table_definition(&ks, definition(&["c"], &[])).unwrap();
    let err = resolver.keyspace_id(&row).unwrap_err();
    assert_eq!(
        err.to_string(),
        "mapping row to keyspace id returned an invalid array of keyspace ids: Destinations:"
    );

    let ks = keyspace_with(vec![
        Destination::KeyspaceId(KeyspaceId::new(vec![1])),
        Destination::KeyspaceId(KeyspaceId::new(vec![2])),
    ]);
    let resolver = VindexResolver::from_table_definition(&ks, definition(&["c"], &[])).unwrap();
    let err = resolver.keyspace_id(&row).unwrap_err();
    assert!(matches!(err, Error::KeyspaceIdMapping(_)));
    assert!(err.to_string().ends_with(
        "Destinations:DestinationKeyspaceID(01),DestinationKeyspaceID(02)"
    ));
}

#[test]
fn rejects_non_keyspace_id_destinations() {
    let row = [Value::int64(5)];
    for destination in [
        Destination::None,
        Destination::AllShards,
        Destination::KeyspaceId(KeyspaceId::new(Vec::new())),
    ] {
        let expected = format!("could not map 5 to a keyspace id, got destination {destination}");
        let ks = keyspace_with(vec![destination]);
        let resolver = VindexResolver::from_table_definition(&ks, definition(&["c"], &[])).unwrap();
        assert_eq!(resolver.keyspace_id(&row).unwrap_err().to_string(), expected);
    }
}

#[test]
fn numeric_vindex_produces_big_endian_ids() {
    let vschema = user_keyspace();
    let ks = vschema.keyspace("user").unwrap();
    let def = Arc::new(TableDefinition::new(
        "user",
        vec!["name".into(), "id".into()],
    ));
    let resolver = VindexResolver::from_table_definition(ks, def).unwrap();
    let ksid = resolver
        .keyspace_id(&[Value::varchar("bob"), Value::uint64(300)])
        .unwrap();
    assert_eq!(ksid, uint64_key(300));
    assert_eq!(ksid.to_hex(), "000000000000012c");
}

#[test]
fn construction_failures() {
    let vschema = user_keyspace();
    let ks = vschema.keyspace("user").unwrap();

    let view = Arc::new(
        TableDefinition::new("user", vec!["id".into()]).with_table_type(TableType::View),
    );
    assert_eq!(
        VindexResolver::from_table_definition(ks, view)
            .unwrap_err()
            .to_string(),
        "a keyspaceID resolver can only be created for a base table, got VIEW"
    );

    let missing = Arc::new(TableDefinition::new("nope", vec!["id".into()]));
    assert_eq!(
        VindexResolver::from_table_definition(ks, missing)
            .unwrap_err()
            .to_string(),
        "no vschema definition for table nope"
    );

    // Exact match against the definition's columns.
    let wrong_case = Arc::new(TableDefinition::new("user", vec!["ID".into()]));
    assert_eq!(
        VindexResolver::from_table_definition(ks, wrong_case)
            .unwrap_err()
            .to_string(),
        "table user has a Vindex on unknown column id"
    );

    assert_eq!(
        VindexResolver::from_column_list(ks, "user", &["name".into()])
            .unwrap_err()
            .to_string(),
        "table user has a Vindex on unknown column id"
    );
}

#[test]
fn vindex_without_columns_is_a_catalog_error() {
    let keyspace = Arc::new(Keyspace::new("ks", true));
    let mut schema = KeyspaceSchema::new(Arc::clone(&keyspace));
    let vindex: Arc<dyn Vindex> = Arc::new(FixedVindex {
        destinations: Vec::new(),
    });
    let mut table = Table::new(
        "t",
        keyspace,
        vec![Arc::new(ColumnVindex::new(vec!["c".into()], Arc::clone(&vindex), false))],
    )
    .unwrap();
    // Public fields let a caller skip the checks done by `Table::new`.
    table.column_vindexes = vec![Arc::new(ColumnVindex::new(Vec::new(), vindex, false))];
    schema.add_table(table);

    let err = VindexResolver::from_column_list(&schema, "t", &["c".into()]).unwrap_err();
    assert!(matches!(err, Error::CatalogError(_)));
    assert_eq!(err.to_string(), "vindex fixed on table t has no columns");

    let err = VindexResolver::from_table_definition(&schema, definition(&["c"], &[])).unwrap_err();
    assert_eq!(err.to_string(), "vindex fixed on table t has no columns");
}

#[test]
fn sharding_needs_a_cheap_unique_vindex() {
    let keyspace = Arc::new(Keyspace::new("ks", false));
    let mut schema = KeyspaceSchema::new(Arc::clone(&keyspace));
    let lookup: Arc<dyn Vindex> = Arc::new(
        vgate_vschema::vindexes::LookupVindex::new("lkp", "lkp", vec!["c".into()], "ksid", true)
            .unwrap(),
    );
    let column_vindexes = vec![Arc::new(ColumnVindex::new(vec!["c".into()], lookup, true))];
    schema.add_table(Table::new("t", keyspace, column_vindexes).unwrap());

    let err = VindexResolver::from_column_list(&schema, "t", &["c".into()]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not find a vindex to use for sharding table t"
    );
}

#[test]
fn column_list_matches_case_insensitively() {
    let vschema = user_keyspace();
    let ks = vschema.keyspace("user").unwrap();
    let resolver =
        VindexResolver::from_column_list(ks, "user", &["Name".into(), "ID".into()]).unwrap();
    assert_eq!(resolver.column_index(), 1);
    assert_eq!(
        resolver
            .keyspace_id(&[Value::varchar("x"), Value::int64(1)])
            .unwrap(),
        uint64_key(1)
    );
}

#[test]
fn short_rows_are_catalog_errors() {
    let vschema = user_keyspace();
    let ks = vschema.keyspace("user").unwrap();
    let resolver =
        VindexResolver::from_column_list(ks, "user", &["name".into(), "id".into()]).unwrap();
    let err = resolver.keyspace_id(&[Value::varchar("x")]).unwrap_err();
    assert!(matches!(err, Error::CatalogError(_)));
}

#[test]
fn primary_key_accessors() {
    let ks = keyspace_with(vec![Destination::KeyspaceId(KeyspaceId::new(vec![1]))]);
    let resolver =
        VindexResolver::from_table_definition(&ks, definition(&["a", "b", "c"], &["b", "a"]))
            .unwrap();
    assert_eq!(resolver.primary_columns().unwrap(), &["b".to_string(), "a".to_string()]);
    // Positions are taken within the primary-key list, not the row.
    assert_eq!(resolver.primary_indexes().unwrap(), vec![0, 1]);

    let resolver =
        VindexResolver::from_table_definition(&ks, definition(&["a", "c"], &["a", "a"])).unwrap();
    assert_eq!(resolver.primary_indexes().unwrap(), vec![0, 0]);

    let from_list = VindexResolver::from_column_list(&ks, "t", &["c".into()]).unwrap();
    assert!(matches!(from_list.primary_columns(), Err(Error::CatalogError(_))));
    assert!(matches!(from_list.primary_indexes(), Err(Error::CatalogError(_))));
}

#[test]
fn should_debug_follows_the_filter() {
    let ks = keyspace_with(vec![Destination::KeyspaceId(KeyspaceId::new(vec![1]))]);
    let resolver = VindexResolver::from_table_definition(&ks, definition(&["c"], &[]))
        .unwrap()
        .with_debug_filter(DebugTableFilter::from_tables(["t"]));
    assert!(resolver.should_debug().unwrap());

    let resolver = VindexResolver::from_column_list(&ks, "t", &["c".into()])
        .unwrap()
        .with_debug_filter(DebugTableFilter::from_tables(["other"]));
    assert!(!resolver.should_debug().unwrap());

    let resolver = resolver.with_debug_filter(DebugTableFilter::all());
    assert!(resolver.should_debug().unwrap());
}

#[test]
fn shared_resolver_is_used_from_many_threads() {
    let vschema = user_keyspace();
    let ks = vschema.keyspace("user").unwrap();
    let resolver: Arc<dyn KeyspaceIdResolver> = Arc::new(
        VindexResolver::from_column_list(ks, "user", &["id".into()]).unwrap(),
    );

    thread::scope(|scope| {
        for worker in 0..4u64 {
            let resolver = Arc::clone(&resolver);
            scope.spawn(move || {
                for i in 0..250u64 {
                    let id = worker * 1_000 + i;
                    let ksid = resolver.keyspace_id(&[Value::uint64(id)]).unwrap();
                    assert_eq!(ksid, uint64_key(id));
                }
            });
        }
    });
}
