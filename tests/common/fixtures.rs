//! Static record corpora and definition documents used across harnesses.

/// JSON-line records covering every seed type.
pub const CORPUS_JSONL: &[&str] = &[
    r#"{"send_subject":"APP.ERROR.db","fields":{"code":500}}"#,
    r#"{"send_subject":"APP.WARN.disk","reply_subject":"_INBOX.7"}"#,
    r#"{"send_subject":"_RV.INFO.SYSTEM.HOST.STATUS"}"#,
    r#"{"send_subject":"ORDERS.NEW","tracking_id":"trk-1","fields":{"qty":3}}"#,
];

/// Expected `classify` output for [`CORPUS_JSONL`] with the seed types.
pub const CORPUS_CLASSIFIED: &[&str] = &[
    "Error\t#ff0000\tAPP.ERROR.db",
    "Warning\t#ffc800\tAPP.WARN.disk",
    "System\t#808080\t_RV.INFO.SYSTEM.HOST.STATUS",
    "Normal\t#000000\tORDERS.NEW",
];

/// Definitions with a composite rule and a renamed, deselected default.
pub const DEFINITIONS_JSON: &str = r##"{
  "types": [
    {
      "name": "Orders",
      "color": "#00ff00",
      "matcher": {
        "kind": "and",
        "matchers": [
          { "kind": "field", "accessor": "sendSubject", "predicate": "startsWith", "argument": "ORDERS." },
          { "kind": "not", "matcher": { "kind": "field", "accessor": "fieldNames", "predicate": "contains", "argument": "cancelled" } }
        ]
      }
    },
    {
      "name": "Inbox replies",
      "color": "cyan",
      "matcher": { "kind": "field", "accessor": "replySubject", "predicate": "regex", "argument": "_inbox\\..*", "ignoring_case": true }
    },
    { "name": "Everything else", "color": "#808080", "selected": false, "matcher": { "kind": "any" } }
  ]
}"##;

/// Join records with newlines, as they would arrive on stdin.
pub fn jsonl(records: &[&str]) -> String {
    let mut out = records.join("\n");
    out.push('\n');
    out
}
