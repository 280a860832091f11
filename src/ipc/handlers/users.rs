use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{payload, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{UserInsert, UserUpdate};

fn handle_list(state: &AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "rows": state.services.users.list() }))
}

fn handle_get(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_str(&req.params, "id")?;
        let row = state.services.users.get(&id)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_create(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let insert: UserInsert = payload(&req.params, "user")?;
        let row = state.services.users.create(&insert)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_update(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_str(&req.params, "id")?;
        let patch: UserUpdate = payload(&req.params, "patch")?;
        let row = state.services.users.update(&id, &patch)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_delete(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_str(&req.params, "id")?;
        let deleted = state.services.users.delete(&id)?;
        Ok(json!({ "deleted": deleted }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "users.list" => Some(handle_list(state, req)),
        "users.get" => Some(handle_get(state, req)),
        "users.create" => Some(handle_create(state, req)),
        "users.update" => Some(handle_update(state, req)),
        "users.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
