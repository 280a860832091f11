use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{payload, required_i64, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceInsert, AttendanceUpdate};

fn handle_by_student(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let student_id = required_i64(&req.params, "studentId")?;
        let rows = state.services.attendance.by_student(student_id)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_by_date(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let date = required_str(&req.params, "date")?;
        let rows = state.services.attendance.by_date(&date)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_create(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let record: AttendanceInsert = payload(&req.params, "record")?;
        let row = state.services.attendance.create(&record)?;
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
        let patch: AttendanceUpdate = payload(&req.params, "patch")?;
        let row = state.services.attendance.update(id, &patch)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_bulk_upsert(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let records: Vec<AttendanceInsert> = payload(&req.params, "records")?;
        let rows = state.services.attendance.bulk_upsert(&records)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.byStudent" => Some(handle_by_student(state, req)),
        "attendance.byDate" => Some(handle_by_date(state, req)),
        "attendance.create" => Some(handle_create(state, req)),
        "attendance.update" => Some(handle_update(state, req)),
        "attendance.bulkUpsert" => Some(handle_bulk_upsert(state, req)),
        _ => None,
    }
}
