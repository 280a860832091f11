mod support;

use serde_json::{json, Value};
use support::{call_err, call_ok, harness_unconfigured};

fn rows(result: &Value) -> Vec<Value> {
    result
        .get("rows")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[test]
fn students_list_substitutes_sample_data_when_unconfigured() {
    let h = harness_unconfigured();
    let result = call_ok(&h.state, "1", "students.list", json!({}));
    let students = rows(&result);
    assert_eq!(students.len(), 283);

    let count = |status: &str| {
        students
            .iter()
            .filter(|s| s.get("status").and_then(Value::as_str) == Some(status))
            .count()
    };
    assert_eq!(count("Active"), 240);
    assert_eq!(count("Inactive"), 28);
    assert_eq!(count("Graduated"), 15);
}

#[test]
fn staff_users_and_classes_also_fall_back() {
    let h = harness_unconfigured();
    assert_eq!(rows(&call_ok(&h.state, "1", "staff.list", json!({}))).len(), 15);

    let users = rows(&call_ok(&h.state, "2", "users.list", json!({})));
    assert_eq!(users.len(), 3);
    assert_eq!(
        users[0].get("email").and_then(Value::as_str),
        Some("john.smith@school.edu")
    );

    let classes = rows(&call_ok(
        &h.state,
        "3",
        "classes.todayForTeacher",
        json!({ "teacherId": "t-1", "academicYear": "2024-2025", "dayOfWeek": 2 }),
    ));
    assert_eq!(classes.len(), 2);
    assert_eq!(
        classes[0].get("subject").and_then(Value::as_str),
        Some("Mathematics")
    );
}

#[test]
fn attendance_and_grades_never_substitute() {
    let h = harness_unconfigured();
    let (code, _) = call_err(
        &h.state,
        "1",
        "attendance.byDate",
        json!({ "date": "2024-06-03" }),
    );
    assert_eq!(code, "not_configured");

    let (code, _) = call_err(&h.state, "2", "grades.list", json!({}));
    assert_eq!(code, "not_configured");
}

#[test]
fn writes_fail_loudly_when_unconfigured() {
    let h = harness_unconfigured();
    let (code, message) = call_err(
        &h.state,
        "1",
        "staff.create",
        json!({ "staff": {
            "first_name": "Lea", "last_name": "Cruz", "email": "lea@school.edu",
            "role": "Teacher", "department": "Academics", "hire_date": "2021-01-10"
        } }),
    );
    assert_eq!(code, "not_configured");
    assert!(message.contains("SUPABASE_URL"));
}
