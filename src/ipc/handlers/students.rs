use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{payload, required_i64, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{StudentInsert, StudentUpdate};

fn handle_list(state: &AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "rows": state.services.students.list() }))
}

fn handle_get(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_i64(&req.params, "id")?;
        let row = state.services.students.get(id)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_create(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let insert: StudentInsert = payload(&req.params, "student")?;
        let row = state.services.students.create(&insert)?;
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
        let patch: StudentUpdate = payload(&req.params, "patch")?;
        let row = state.services.students.update(id, &patch)?;
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
        let deleted = state.services.students.delete(id)?;
        Ok(json!({ "deleted": deleted }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_search(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let query = required_str(&req.params, "query")?;
        let rows = state.services.students.search(&query)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.get" => Some(handle_get(state, req)),
        "students.create" => Some(handle_create(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        "students.search" => Some(handle_search(state, req)),
        _ => None,
    }
}
