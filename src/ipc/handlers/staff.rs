use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{payload, required_i64, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{StaffInsert, StaffUpdate};

fn handle_list(state: &AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "rows": state.services.staff.list() }))
}

fn handle_get(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_i64(&req.params, "id")?;
        let row = state.services.staff.get(id)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_create(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let insert: StaffInsert = payload(&req.params, "staff")?;
        let row = state.services.staff.create(&insert)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_update(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_i64(&req.params, "id")?;
        let patch: StaffUpdate = payload(&req.params, "patch")?;
        let row = state.services.staff.update(id, &patch)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_delete(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_i64(&req.params, "id")?;
        let deleted = state.services.staff.delete(id)?;
        Ok(json!({ "deleted": deleted }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "staff.list" => Some(handle_list(state, req)),
        "staff.get" => Some(handle_get(state, req)),
        "staff.create" => Some(handle_create(state, req)),
        "staff.update" => Some(handle_update(state, req)),
        "staff.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
