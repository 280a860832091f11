mod support;

use serde_json::{json, Value};
use support::{call_ok, harness};

#[test]
fn remarking_a_day_updates_in_place() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "attendance.bulkUpsert",
        json!({ "records": [
            { "student_id": 1, "date": "2024-06-03", "status": "Present" },
            { "student_id": 2, "date": "2024-06-03", "status": "Absent" }
        ] }),
    );
    // Re-mark student 2 for the same day.
    call_ok(
        &h.state,
        "2",
        "attendance.bulkUpsert",
        json!({ "records": [
            { "student_id": 2, "date": "2024-06-03", "status": "Late" }
        ] }),
    );

    let rows = h.store.rows("attendance");
    assert_eq!(rows.len(), 2, "same (student, date) never duplicates");
    let student_two = rows
        .iter()
        .find(|r| r.get("student_id").and_then(Value::as_i64) == Some(2))
        .cloned()
        .unwrap_or_default();
    assert_eq!(
        student_two.get("status").and_then(Value::as_str),
        Some("Late")
    );
}

#[test]
fn by_student_lists_newest_date_first() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "attendance.bulkUpsert",
        json!({ "records": [
            { "student_id": 1, "date": "2024-06-03", "status": "Present" },
            { "student_id": 1, "date": "2024-06-05", "status": "Absent" },
            { "student_id": 1, "date": "2024-06-04", "status": "Present" }
        ] }),
    );
    let result = call_ok(
        &h.state,
        "2",
        "attendance.byStudent",
        json!({ "studentId": 1 }),
    );
    let dates: Vec<&str> = result
        .get("rows")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r.get("date").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(dates, vec!["2024-06-05", "2024-06-04", "2024-06-03"]);
}

#[test]
fn create_then_update_patches_a_single_record() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "attendance.create",
        json!({ "record": { "student_id": 7, "date": "2024-06-03", "status": "Absent" } }),
    );
    let result = call_ok(
        &h.state,
        "2",
        "attendance.update",
        json!({ "id": 1, "patch": { "status": "Excused", "notes": "doctor's note" } }),
    );
    let row = result.get("row").cloned().unwrap_or_default();
    assert_eq!(row.get("status").and_then(Value::as_str), Some("Excused"));
    assert_eq!(
        row.get("notes").and_then(Value::as_str),
        Some("doctor's note")
    );
}
