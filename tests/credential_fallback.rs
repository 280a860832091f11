mod support;

use std::sync::Arc;

use schoolhubd::store::MemStore;
use serde_json::{json, Map, Value};
use support::{call_ok, harness_with_stores};

fn seeded_direct() -> Arc<MemStore> {
    let direct = Arc::new(MemStore::with_label("anon"));
    let mut row = Map::new();
    row.insert("first_name".to_string(), Value::from("Direct"));
    row.insert("last_name".to_string(), Value::from("Row"));
    row.insert("created_at".to_string(), Value::from("2024-01-01T00:00:00Z"));
    direct.seed("students", vec![row]);
    direct
}

#[test]
fn privileged_failure_retries_against_the_direct_client() {
    let privileged = Arc::new(MemStore::with_label("service-role"));
    privileged.fail_all("connection refused");
    let direct = seeded_direct();
    let h = harness_with_stores(Some(privileged), Some(direct.clone()), direct);

    let result = call_ok(&h.state, "1", "students.list", json!({}));
    let rows = result
        .get("rows")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("first_name").and_then(Value::as_str),
        Some("Direct")
    );
}

#[test]
fn privileged_client_wins_when_healthy() {
    let privileged = Arc::new(MemStore::with_label("service-role"));
    let mut row = Map::new();
    row.insert("first_name".to_string(), Value::from("Privileged"));
    privileged.seed("students", vec![row]);
    let direct = seeded_direct();
    let h = harness_with_stores(Some(privileged.clone()), Some(direct), privileged);

    let result = call_ok(&h.state, "1", "students.list", json!({}));
    let rows = result
        .get("rows")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("first_name").and_then(Value::as_str),
        Some("Privileged")
    );
}

#[test]
fn direct_only_configuration_serves_reads() {
    let direct = seeded_direct();
    let h = harness_with_stores(None, Some(direct.clone()), direct);

    let result = call_ok(&h.state, "1", "admin.listStaff", json!({}));
    // No staff seeded: an empty direct read is still a successful read, not
    // a fallback trigger.
    assert_eq!(
        result
            .get("rows")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(0)
    );
}

#[test]
fn both_failing_falls_back_to_sample_data_on_tolerant_reads() {
    let privileged = Arc::new(MemStore::with_label("service-role"));
    privileged.fail_all("connection refused");
    let direct = Arc::new(MemStore::with_label("anon"));
    direct.fail_all("connection refused");
    let h = harness_with_stores(Some(privileged), Some(direct.clone()), direct);

    let result = call_ok(&h.state, "1", "students.list", json!({}));
    assert_eq!(
        result
            .get("rows")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(283)
    );
}
