use std::io::Write;

use indoc::indoc;
use vgate_types::{Destination, KeyspaceId, Value, uint64_key};
use vgate_vschema::{VSchemaConfig, find_vindex_for_sharding};

const USER_VSCHEMA: &str = indoc! {r#"
    {
      "keyspaces": {
        "user": {
          "sharded": true,
          "vindexes": {
            "user_index": { "type": "numeric" },
            "kid_index": { "type": "binary" },
            "name_user_map": {
              "type": "lookup",
              "params": { "table": "name_user_map", "from": "name", "to": "user_id" },
              "owner": "user"
            },
            "email_user_map": {
              "type": "lookup_unique",
              "params": { "table": "email_user_map", "from": "email", "to": "user_id" }
            }
          },
          "tables": {
            "user": {
              "column_vindexes": [
                { "column": "Id", "name": "user_index" },
                { "column": "name", "name": "name_user_map" },
                { "columns": ["email"], "name": "email_user_map" }
              ]
            },
            "kid": {
              "column_vindexes": [ { "column": "kid", "name": "kid_index" } ]
            }
          }
        },
        "main": {
          "tables": { "unsharded": {} }
        }
      }
    }
"#};

#[test]
fn builds_keyspaces_tables_and_ownership() {
    let vschema = VSchemaConfig::from_json(USER_VSCHEMA)
        .unwrap()
        .build()
        .unwrap();

    let user = vschema.find_table(Some("user"), "user").unwrap();
    assert!(user.keyspace.sharded);
    let names: Vec<&str> = user.column_vindexes.iter().map(|cv| cv.name.as_str()).collect();
    assert_eq!(names, vec!["user_index", "name_user_map", "email_user_map"]);
    let owned: Vec<&str> = user.owned.iter().map(|cv| cv.name.as_str()).collect();
    assert_eq!(owned, vec!["name_user_map"]);
    assert!(user.column_vindexes[1].is_lookup());
    assert!(!user.column_vindexes[0].is_lookup());

    let main = vschema.find_table(None, "unsharded").unwrap();
    assert!(!main.keyspace.sharded);
    assert!(main.column_vindexes.is_empty());
}

#[test]
fn functional_vindexes_map_without_cursor() {
    let vschema = VSchemaConfig::from_json(USER_VSCHEMA)
        .unwrap()
        .build()
        .unwrap();
    let user = vschema.find_table(Some("user"), "user").unwrap();
    let sharding = find_vindex_for_sharding(&user.name, &user.column_vindexes).unwrap();
    assert_eq!(sharding.name, "user_index");

    let out = sharding.vindex.map(None, &[Value::int64(300)]).unwrap();
    assert_eq!(out, vec![Destination::KeyspaceId(uint64_key(300))]);

    let kid = vschema.find_table(None, "kid").unwrap();
    let out = kid.column_vindexes[0]
        .vindex
        .map(None, &[Value::varbinary(vec![0xab])])
        .unwrap();
    assert_eq!(out, vec![Destination::KeyspaceId(KeyspaceId::new(vec![0xab]))]);
}

#[test]
fn load_from_file_and_round_trip_document() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(USER_VSCHEMA.as_bytes()).unwrap();

    let config = VSchemaConfig::load(file.path()).unwrap();
    let text = config.to_json_pretty().unwrap();
    assert_eq!(VSchemaConfig::from_json(&text).unwrap(), config);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = VSchemaConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, vgate_result::Error::Io(_)));
}

#[test]
fn sharded_table_with_unknown_vindex_fails() {
    let text = indoc! {r#"
        {"keyspaces": {"ks": {"sharded": true, "tables": {
            "t": {"column_vindexes": [{"column": "id", "name": "nope"}]}
        }}}}
    "#};
    let err = VSchemaConfig::from_json(text).unwrap().build().unwrap_err();
    assert_eq!(err.to_string(), "invalid vschema: vindex nope not found for table t");
}
