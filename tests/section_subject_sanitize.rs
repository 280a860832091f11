mod support;

use serde_json::{json, Value};
use support::{call_err, call_ok, harness};

#[test]
fn empty_staff_id_string_lands_as_null() {
    let h = harness();
    let result = call_ok(
        &h.state,
        "1",
        "admin.createSectionSubject",
        json!({ "payload": { "section_id": 3, "subject": "Science", "staff_id": "" } }),
    );
    let row = result.get("row").cloned().unwrap_or_default();
    assert_eq!(row.get("staff_id"), Some(&Value::Null));
}

#[test]
fn numeric_string_staff_id_is_coerced() {
    let h = harness();
    let result = call_ok(
        &h.state,
        "1",
        "admin.createSectionSubject",
        json!({ "payload": { "section_id": 3, "subject": "Math", "staff_id": "12" } }),
    );
    let row = result.get("row").cloned().unwrap_or_default();
    assert_eq!(row.get("staff_id").and_then(Value::as_i64), Some(12));
}

#[test]
fn invalid_teacher_id_is_dropped_from_the_write() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "admin.createSectionSubject",
        json!({ "payload": { "section_id": 3, "subject": "English", "teacher_id": "2" } }),
    );
    let rows = h.store.rows("section_subjects");
    assert_eq!(rows.len(), 1);
    // Omitted entirely, never written as null.
    assert!(rows[0].get("teacher_id").is_none());
}

#[test]
fn valid_teacher_id_is_kept() {
    let h = harness();
    let teacher = uuid::Uuid::new_v4().to_string();
    call_ok(
        &h.state,
        "1",
        "admin.createSectionSubject",
        json!({ "payload": { "section_id": 3, "subject": "History", "teacher_id": teacher } }),
    );
    let rows = h.store.rows("section_subjects");
    assert_eq!(
        rows[0].get("teacher_id").and_then(Value::as_str),
        Some(teacher.as_str())
    );
}

#[test]
fn create_requires_section_and_subject() {
    let h = harness();
    let (code, message) = call_err(
        &h.state,
        "1",
        "admin.createSectionSubject",
        json!({ "payload": { "subject": "Math" } }),
    );
    assert_eq!(code, "bad_params");
    assert!(message.contains("section_id"));
}

#[test]
fn staff_id_drift_retries_without_the_column() {
    let h = harness();
    h.store.mark_column_missing("section_subjects", "staff_id");
    call_ok(
        &h.state,
        "1",
        "admin.createSectionSubject",
        json!({ "payload": { "section_id": 3, "subject": "Math", "staff_id": 7 } }),
    );
    let attempts = h.store.attempts();
    assert_eq!(attempts.len(), 2);
    assert!(!attempts[1].contains("staff_id"));
}
