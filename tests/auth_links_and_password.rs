mod support;

use serde_json::{json, Value};
use support::{call_err, call_ok, harness};

#[test]
fn create_staff_user_invites_and_writes_the_profile() {
    let h = harness();
    let result = call_ok(
        &h.state,
        "1",
        "auth.createStaffUser",
        json!({ "name": "Lea Cruz", "email": "lea.cruz@school.edu", "role": "Teacher" }),
    );
    assert_eq!(result.get("invited").and_then(Value::as_bool), Some(true));
    assert!(result.get("userId").and_then(Value::as_str).is_some());
    assert_eq!(result.get("recoveryLink"), Some(&Value::Null));

    let profiles = h.store.rows("users");
    assert_eq!(profiles.len(), 1);
    assert_eq!(
        profiles[0].get("email").and_then(Value::as_str),
        Some("lea.cruz@school.edu")
    );
}

#[test]
fn invite_failure_falls_back_to_a_recovery_link() {
    let h = harness();
    h.auth.fail_invites("email already registered");
    let result = call_ok(
        &h.state,
        "1",
        "auth.createStaffUser",
        json!({ "name": "Lea Cruz", "email": "lea.cruz@school.edu" }),
    );
    assert_eq!(result.get("invited").and_then(Value::as_bool), Some(false));
    let link = result
        .get("recoveryLink")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(link.contains("type=recovery"));
}

#[test]
fn original_invite_error_surfaces_when_links_also_fail() {
    let h = harness();
    h.auth.fail_invites("smtp disabled");
    h.auth.fail_links("links disabled");
    let (code, message) = call_err(
        &h.state,
        "1",
        "auth.createStaffUser",
        json!({ "name": "Lea Cruz", "email": "lea.cruz@school.edu" }),
    );
    assert_eq!(code, "auth_error");
    assert!(message.contains("smtp disabled"));
}

#[test]
fn generate_recovery_link_with_explicit_null_redirect() {
    let h = harness();
    let result = call_ok(
        &h.state,
        "1",
        "auth.generateRecoveryLink",
        json!({ "email": "lea.cruz@school.edu", "redirectTo": null }),
    );
    let link = result
        .get("actionLink")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(link.contains("type=recovery"));
}

#[test]
fn set_user_password_finds_the_identity_by_email() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "auth.createOrUpdateUserWithPassword",
        json!({ "email": "nurse@school.edu", "password": "old" }),
    );
    call_ok(
        &h.state,
        "2",
        "auth.setUserPassword",
        json!({ "email": "Nurse@School.edu", "newPassword": "new" }),
    );
    assert_eq!(h.auth.password_of("nurse@school.edu").as_deref(), Some("new"));
}

#[test]
fn set_user_password_for_unknown_email_is_not_found() {
    let h = harness();
    let (code, message) = call_err(
        &h.state,
        "1",
        "auth.setUserPassword",
        json!({ "email": "ghost@school.edu", "newPassword": "pw" }),
    );
    assert_eq!(code, "not_found");
    assert_eq!(message, "User not found for email");
}

#[test]
fn test_admin_reports_a_user_count() {
    let h = harness();
    call_ok(
        &h.state,
        "1",
        "auth.createOrUpdateUserWithPassword",
        json!({ "email": "one@school.edu", "password": "pw" }),
    );
    let result = call_ok(&h.state, "2", "auth.testAdmin", json!({}));
    assert_eq!(result.get("ok").and_then(Value::as_bool), Some(true));
    assert_eq!(result.get("usersSeen").and_then(Value::as_u64), Some(1));
}
