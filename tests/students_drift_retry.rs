mod support;

use serde_json::{json, Value};
use support::{call_err, call_ok, harness};

fn sample_student() -> Value {
    json!({
        "first_name": "Ana",
        "last_name": "Reyes",
        "suffix": "Jr.",
        "full_name": "Ana Reyes Jr.",
        "normalized_full_name": "ana reyes jr",
        "email": "ana.reyes@school.edu",
        "grade": "5",
        "section": "A",
        "enrollment_date": "2024-06-03"
    })
}

#[test]
fn create_strips_suffix_group_and_resubmits_once() {
    let h = harness();
    h.store.mark_column_missing("students", "suffix");

    let result = call_ok(
        &h.state,
        "1",
        "students.create",
        json!({ "student": sample_student() }),
    );
    let row = result.get("row").cloned().unwrap_or_default();
    assert_eq!(row.get("first_name").and_then(Value::as_str), Some("Ana"));
    assert!(row.get("suffix").is_none());
    assert!(row.get("full_name").is_none());
    assert!(row.get("normalized_full_name").is_none());

    let attempts = h.store.attempts();
    assert_eq!(attempts.len(), 2, "exactly one resubmit: {attempts:?}");
    assert!(attempts[0].contains("suffix"));
    assert!(!attempts[1].contains("suffix"));
    assert!(!attempts[1].contains("full_name"));
}

#[test]
fn retry_strips_the_group_even_when_another_member_trips_it() {
    let h = harness();
    h.store.mark_column_missing("students", "normalized_full_name");

    call_ok(
        &h.state,
        "1",
        "students.create",
        json!({ "student": sample_student() }),
    );

    let attempts = h.store.attempts();
    assert_eq!(attempts.len(), 2);
    assert!(!attempts[1].contains("suffix"));
    assert!(!attempts[1].contains("normalized_full_name"));
}

#[test]
fn unrelated_missing_column_is_not_retried() {
    let h = harness();
    h.store.mark_column_missing("students", "email");

    let (code, _) = call_err(
        &h.state,
        "1",
        "students.create",
        json!({ "student": sample_student() }),
    );
    assert_eq!(code, "missing_column");
    assert_eq!(h.store.attempts().len(), 1, "no retry for unknown columns");
}

#[test]
fn update_resubmits_without_the_group() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "students.create",
        json!({ "student": sample_student() }),
    );
    h.store.mark_column_missing("students", "suffix");

    let result = call_ok(
        &h.state,
        "2",
        "students.update",
        json!({ "id": 1, "patch": { "suffix": "Sr.", "grade": "6" } }),
    );
    let row = result.get("row").cloned().unwrap_or_default();
    assert_eq!(row.get("grade").and_then(Value::as_str), Some("6"));

    let updates: Vec<_> = h
        .store
        .attempts()
        .into_iter()
        .filter(|a| a.starts_with("update"))
        .collect();
    assert_eq!(updates.len(), 2);
    assert!(updates[0].contains("suffix"));
    assert!(!updates[1].contains("suffix"));
}
