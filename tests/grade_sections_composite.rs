mod support;

use serde_json::{json, Value};
use support::{call_err, call_ok, harness};

#[test]
fn add_then_list_by_year() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "admin.addGradeSection",
        json!({ "grade": 5, "sectionName": "Rosal", "academicYear": "2024-2025" }),
    );
    call_ok(
        &h.state,
        "2",
        "admin.addGradeSection",
        json!({ "grade": 5, "sectionName": "Sampaguita", "academicYear": "2023-2024" }),
    );

    let result = call_ok(
        &h.state,
        "3",
        "admin.listGradeSections",
        json!({ "academicYear": "2024-2025" }),
    );
    let rows = result
        .get("rows")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("section_name").and_then(Value::as_str),
        Some("Rosal")
    );
}

#[test]
fn composite_remove_matches_all_three_fields() {
    let h = harness();
    for (id, grade, name, year) in [
        ("1", 5, "Rosal", "2024-2025"),
        ("2", 5, "Rosal", "2023-2024"),
        ("3", 6, "Rosal", "2024-2025"),
        ("4", 5, "Adelfa", "2024-2025"),
    ] {
        call_ok(
            &h.state,
            id,
            "admin.addGradeSection",
            json!({ "grade": grade, "sectionName": name, "academicYear": year }),
        );
    }

    let result = call_ok(
        &h.state,
        "5",
        "admin.removeGradeSectionByComposite",
        json!({ "grade": 5, "sectionName": "Rosal", "academicYear": "2024-2025" }),
    );
    assert_eq!(result.get("deleted").and_then(Value::as_u64), Some(1));
    assert_eq!(h.store.rows("grade_sections").len(), 3);
}

#[test]
fn removing_an_absent_composite_is_success_with_zero() {
    let h = harness();
    let result = call_ok(
        &h.state,
        "1",
        "admin.removeGradeSectionByComposite",
        json!({ "grade": 9, "sectionName": "Nara", "academicYear": "2024-2025" }),
    );
    assert_eq!(result.get("deleted").and_then(Value::as_u64), Some(0));
}

#[test]
fn missing_table_names_the_migration_script() {
    let h = harness();
    h.store.mark_table_missing("grade_sections");
    let (code, message) = call_err(
        &h.state,
        "1",
        "admin.listGradeSections",
        json!({ "academicYear": "2024-2025" }),
    );
    assert_eq!(code, "missing_table");
    assert!(message.contains("database/create-grade-sections-table.sql"));
}
