mod support;

use serde_json::{json, Value};
use support::{call_err, call_ok, harness};

#[test]
fn insert_then_find_roundtrip() {
    let h = harness();
    let inserted = call_ok(
        &h.state,
        "1",
        "db.insertOne",
        json!({ "collection": "notes", "document": { "student_id": 4, "text": "late twice" } }),
    );
    assert!(inserted.get("insertedId").and_then(Value::as_str).is_some());

    let found = call_ok(
        &h.state,
        "2",
        "db.findOne",
        json!({ "collection": "notes", "filter": { "student_id": 4 } }),
    );
    assert_eq!(
        found
            .get("document")
            .and_then(|d| d.get("text"))
            .and_then(Value::as_str),
        Some("late twice")
    );
}

#[test]
fn find_with_no_match_returns_null_document() {
    let h = harness();
    let found = call_ok(
        &h.state,
        "1",
        "db.findOne",
        json!({ "collection": "notes", "filter": { "student_id": 99 } }),
    );
    assert_eq!(found.get("document"), Some(&Value::Null));
}

#[test]
fn ping_answers_when_enabled() {
    let h = harness();
    let result = call_ok(&h.state, "1", "db.ping", json!({}));
    assert!(result.get("reply").is_some());
}

#[test]
fn disabled_store_reports_not_configured() {
    let mut h = harness();
    h.state.docs = None;
    for (id, method) in [("1", "db.ping"), ("2", "db.findOne"), ("3", "db.insertOne")] {
        let (code, _) = call_err(&h.state, id, method, json!({ "collection": "notes" }));
        assert_eq!(code, "not_configured", "{method}");
    }
}
