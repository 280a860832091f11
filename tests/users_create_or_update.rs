mod support;

use serde_json::{json, Value};
use support::{call_ok, harness};

#[test]
fn second_call_with_same_email_updates_instead_of_duplicating() {
    let h = harness();

    let first = call_ok(
        &h.state,
        "1",
        "auth.createOrUpdateUserWithPassword",
        json!({
            "email": "teacher@school.edu",
            "password": "first-pass",
            "name": "Original Name",
            "role": "Teacher"
        }),
    );
    let first_id = first
        .get("userId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let second = call_ok(
        &h.state,
        "2",
        "auth.createOrUpdateUserWithPassword",
        json!({
            "email": "teacher@school.edu",
            "password": "second-pass",
            "name": "Renamed",
            "role": "Admin"
        }),
    );
    let second_id = second
        .get("userId")
        .and_then(Value::as_str)
        .unwrap_or_default();

    assert_eq!(first_id, second_id, "one auth identity per email");
    assert_eq!(h.auth.users().len(), 1);
    assert_eq!(
        h.auth.password_of("teacher@school.edu").as_deref(),
        Some("second-pass")
    );

    // The profile row tracks the latest name and role.
    let profiles = h.store.rows("users");
    assert_eq!(profiles.len(), 1);
    assert_eq!(
        profiles[0].get("name").and_then(Value::as_str),
        Some("Renamed")
    );
    assert_eq!(
        profiles[0].get("role").and_then(Value::as_str),
        Some("Admin")
    );
}

#[test]
fn blank_name_defaults_to_the_email_local_part() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "auth.createOrUpdateUserWithPassword",
        json!({ "email": "registrar@school.edu", "password": "pw", "name": "  " }),
    );
    let profiles = h.store.rows("users");
    assert_eq!(
        profiles[0].get("name").and_then(Value::as_str),
        Some("registrar")
    );
}

#[test]
fn unknown_role_label_becomes_staff() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "auth.createOrUpdateUserWithPassword",
        json!({ "email": "x@school.edu", "password": "pw", "role": "Superuser" }),
    );
    let profiles = h.store.rows("users");
    assert_eq!(
        profiles[0].get("role").and_then(Value::as_str),
        Some("Staff")
    );
}

#[test]
fn users_create_provisions_auth_then_profile() {
    let h = harness();
    let result = call_ok(
        &h.state,
        "1",
        "users.create",
        json!({ "user": {
            "email": "clerk@school.edu",
            "name": "Clerk",
            "role": "Staff"
        } }),
    );
    let row = result.get("row").cloned().unwrap_or_default();
    let auth_users = h.auth.users();
    assert_eq!(auth_users.len(), 1);
    assert_eq!(
        row.get("id").and_then(Value::as_str),
        Some(auth_users[0].id.as_str())
    );
    // No password given: the documented bootstrap default applies.
    assert_eq!(
        h.auth.password_of("clerk@school.edu").as_deref(),
        Some("defaultPassword123")
    );
}
