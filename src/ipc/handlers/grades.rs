use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{payload, required_i64, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{GradeInsert, GradeUpdate};

fn handle_list(state: &AppState, req: &Request) -> serde_json::Value {
    match state.services.grades.list() {
        Ok(rows) => ok(&req.id, json!({ "rows": rows })),
        Err(e) => HandlerErr::from(e).response(&req.id),
    }
}

fn handle_by_student(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let student_id = required_i64(&req.params, "studentId")?;
        let rows = state.services.grades.by_student(student_id)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_by_subject(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let subject = required_str(&req.params, "subject")?;
        let rows = state.services.grades.by_subject(&subject)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_create(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let insert: GradeInsert = payload(&req.params, "grade")?;
        let row = state.services.grades.create(&insert)?;
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
        let patch: GradeUpdate = payload(&req.params, "patch")?;
        let row = state.services.grades.update(id, &patch)?;
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
        let deleted = state.services.grades.delete(id)?;
        Ok(json!({ "deleted": deleted }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.list" => Some(handle_list(state, req)),
        "grades.byStudent" => Some(handle_by_student(state, req)),
        "grades.bySubject" => Some(handle_by_subject(state, req)),
        "grades.create" => Some(handle_create(state, req)),
        "grades.update" => Some(handle_update(state, req)),
        "grades.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
