use serde_json::{json, Value};

use crate::auth::LinkKind;
use crate::ipc::error::ok;
use crate::ipc::helpers::{optional_str, redirect, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;

fn handle_create_staff_user(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let name = required_str(&req.params, "name")?;
        let email = required_str(&req.params, "email")?;
        let role = Role::from_label_or_staff(optional_str(&req.params, "role").as_deref());
        let redirect = redirect(&req.params)?;
        let outcome = state.auth.create_staff_user(&name, &email, role, &redirect)?;
        Ok(json!({
            "userId": outcome.user_id,
            "invited": outcome.invited,
            "recoveryLink": outcome.recovery_link,
            "inviteLink": outcome.invite_link,
        }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_generate_link(state: &AppState, req: &Request, kind: LinkKind) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let email = required_str(&req.params, "email")?;
        let redirect = redirect(&req.params)?;
        let link = state.auth.generate_link(kind, &email, &redirect)?;
        Ok(json!({ "actionLink": link }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_set_user_password(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let email = required_str(&req.params, "email")?;
        let password = required_str(&req.params, "newPassword")?;
        let user_id = state.auth.set_user_password(&email, &password)?;
        Ok(json!({ "userId": user_id }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_create_or_update(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let email = required_str(&req.params, "email")?;
        let password = required_str(&req.params, "password")?;
        let name = optional_str(&req.params, "name");
        let role = optional_str(&req.params, "role");
        let user_id = state.auth.create_or_update_user_with_password(
            &email,
            &password,
            name.as_deref(),
            role.as_deref(),
        )?;
        Ok(json!({ "userId": user_id }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_test_admin(state: &AppState, req: &Request) -> serde_json::Value {
    match state.auth.test_admin() {
        Ok(seen) => ok(&req.id, json!({ "ok": true, "usersSeen": seen })),
        Err(e) => HandlerErr::from(e).response(&req.id),
    }
}

fn handle_diagnose(state: &AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, state.config.diagnostics())
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.createStaffUser" => Some(handle_create_staff_user(state, req)),
        "auth.generateInviteLink" => Some(handle_generate_link(state, req, LinkKind::Invite)),
        "auth.generateRecoveryLink" => Some(handle_generate_link(state, req, LinkKind::Recovery)),
        "auth.setUserPassword" => Some(handle_set_user_password(state, req)),
        "auth.createOrUpdateUserWithPassword" => Some(handle_create_or_update(state, req)),
        "auth.testAdmin" => Some(handle_test_admin(state, req)),
        "auth.diagnose" => Some(handle_diagnose(state, req)),
        _ => None,
    }
}
