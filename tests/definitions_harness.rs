#![allow(unused)]
//! Record type definitions integration harness.
//!
//! # What this covers
//!
//! - **Import**: composite matchers, named colours, a trailing catch-all
//!   becoming the default type, and a fresh default appended otherwise.
//! - **All-or-nothing**: any invalid identifier, argument, pattern or name
//!   leaves the table and its listeners untouched.
//! - **Export**: the seed table's persisted form (snapshot) and a save/load
//!   round trip through a real file.
//!
//! # Running
//!
//! ```sh
//! cargo test --test definitions_harness
//! ```

mod common;
use common::*;

use pretty_assertions::assert_eq;
use rvsnoop::{
    ClassificationTable, Color, Error, MatcherDef, RecordTypeDef, RecordTypeId, TypeDefinitions,
};

fn field(accessor: &str, predicate: &str, argument: &str) -> MatcherDef {
    MatcherDef::Field {
        accessor: accessor.into(),
        predicate: predicate.into(),
        argument: argument.into(),
        ignoring_case: false,
    }
}

fn def(name: &str, matcher: MatcherDef) -> RecordTypeDef {
    RecordTypeDef {
        name: name.into(),
        color: Color::BLACK,
        selected: true,
        matcher,
    }
}

fn defs(types: Vec<RecordTypeDef>) -> TypeDefinitions {
    TypeDefinitions { types }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[test]
fn imports_composite_definitions() {
    let defs = TypeDefinitions::from_json(DEFINITIONS_JSON).unwrap();
    let table = ClassificationTable::from_definitions(&defs).unwrap();

    assert_eq!(
        type_names(&table),
        ["Orders", "Inbox replies", "Everything else"]
    );
    let default = table.default_type();
    assert_eq!(default.name(), "Everything else");
    assert_eq!(default.id(), RecordTypeId::DEFAULT);
    assert!(!default.is_selected());
    assert_eq!(
        table.find_by_name("Inbox replies").unwrap().color(),
        Color::rgb(0, 255, 255)
    );

    assert_classified_as!(table, msg("ORDERS.NEW"), "Orders");
    assert_classified_as!(
        table,
        MessageBuilder::new("ORDERS.NEW").field("cancelled", true).build(),
        "Everything else"
    );
    assert_classified_as!(
        table,
        MessageBuilder::new("X").reply_subject("_INBOX.42").build(),
        "Inbox replies"
    );
    assert!(!table.is_visible(&msg("OTHER")));
}

#[test]
fn missing_catch_all_appends_default() {
    let table = ClassificationTable::from_definitions(&defs(vec![def(
        "Orders",
        field("sendSubject", "startsWith", "ORDERS"),
    )]))
    .unwrap();
    assert_eq!(type_names(&table), ["Orders", "Normal"]);
    assert!(table.default_type().matcher().is_catch_all());
}

#[test]
fn catch_all_before_the_end_is_an_ordinary_rule() {
    let table = ClassificationTable::from_definitions(&defs(vec![
        def("Everything", MatcherDef::Any),
        def("Orders", field("sendSubject", "startsWith", "ORDERS")),
    ]))
    .unwrap();
    assert_eq!(type_names(&table), ["Everything", "Orders", "Normal"]);
    assert_classified_as!(table, msg("ORDERS.NEW"), "Everything");
}

#[test]
fn empty_definitions_give_lone_default() {
    let table = ClassificationTable::from_definitions(&TypeDefinitions::default()).unwrap();
    assert_eq!(type_names(&table), ["Normal"]);
}

// ---------------------------------------------------------------------------
// All-or-nothing
// ---------------------------------------------------------------------------

#[test]
fn invalid_import_leaves_table_untouched() {
    let table = seeded_table();
    let log = EventLog::attach(&table.filter());
    let before = table.definitions();

    let bad = [
        defs(vec![
            def("A", field("sendSubject", "contains", "A")),
            def("B", field("sendSubject", "regex", "a)(b")),
        ]),
        defs(vec![def("A", field("subject", "contains", "A"))]),
        defs(vec![def("A", field("sendSubject", "like", "A"))]),
        defs(vec![def("A", field("sendSubject", "contains", ""))]),
        defs(vec![def(" ", MatcherDef::Any)]),
        defs(vec![
            def("A", field("sendSubject", "contains", "A")),
            def("A", field("sendSubject", "contains", "B")),
        ]),
        defs(vec![def("Normal", field("sendSubject", "contains", "A"))]),
    ];

    for defs in &bad {
        assert!(table.replace_all(defs).is_err(), "accepted {defs:?}");
    }
    assert_eq!(table.definitions(), before);
    assert_events!(log, []);
}

#[test]
fn import_errors_are_specific() {
    let table = ClassificationTable::new();
    assert_eq!(
        table
            .replace_all(&defs(vec![def("A", field("sendSubject", "like", "A"))]))
            .unwrap_err(),
        Error::InvalidIdentifier {
            registry: "predicate identifier",
            value: "like".into()
        }
    );
    assert_eq!(
        table
            .replace_all(&defs(vec![def("Dup", MatcherDef::Any), def("Dup", MatcherDef::Any)]))
            .unwrap_err(),
        Error::NameConflict { name: "Dup".into() }
    );
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(TypeDefinitions::from_json(r##"{"types":[{"color":"#000000"}]}"##).is_err());
    assert!(TypeDefinitions::from_json(r#"{"types":[{"name":"x","color":"mauve"}]}"#).is_err());
    assert!(TypeDefinitions::from_json(r#"{"types":[{"name":"x","matcher":{"kind":"xor"}}]}"#)
        .is_err());
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn seed_definitions_snapshot() {
    let table = ClassificationTable::new();
    insta::assert_snapshot!(table.definitions().to_json_pretty(), @r###"
    {
      "types": [
        {
          "name": "Error",
          "color": "#ff0000",
          "selected": true,
          "matcher": {
            "kind": "field",
            "accessor": "sendSubject",
            "predicate": "contains",
            "argument": "ERROR",
            "ignoring_case": false
          }
        },
        {
          "name": "Warning",
          "color": "#ffc800",
          "selected": true,
          "matcher": {
            "kind": "field",
            "accessor": "sendSubject",
            "predicate": "contains",
            "argument": "WARN",
            "ignoring_case": false
          }
        },
        {
          "name": "System",
          "color": "#808080",
          "selected": true,
          "matcher": {
            "kind": "field",
            "accessor": "sendSubject",
            "predicate": "startsWith",
            "argument": "_",
            "ignoring_case": false
          }
        },
        {
          "name": "Normal",
          "color": "#000000",
          "selected": true,
          "matcher": {
            "kind": "any"
          }
        }
      ]
    }
    "###);
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("types.json");

    let table = ClassificationTable::from_definitions(
        &TypeDefinitions::from_json(DEFINITIONS_JSON).unwrap(),
    )
    .unwrap();
    let orders = table.find_by_name("Orders").unwrap();
    table.set_selected(orders.id(), false).unwrap();
    table.definitions().save(&path).unwrap();

    let loaded = TypeDefinitions::load(&path).unwrap();
    assert_eq!(loaded, table.definitions());

    let copy = ClassificationTable::from_definitions(&loaded).unwrap();
    assert_eq!(type_names(&copy), type_names(&table));
    assert!(!copy.is_visible(&msg("ORDERS.NEW")));
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = TypeDefinitions::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("absent.json"), "{err:#}");
}
