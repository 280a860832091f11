use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{required_i64, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn handle_today_for_teacher(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let teacher_id = required_str(&req.params, "teacherId")?;
        let academic_year = required_str(&req.params, "academicYear")?;
        let day_of_week = required_i64(&req.params, "dayOfWeek")?;
        let rows = state
            .services
            .classes
            .today_for_teacher(&teacher_id, &academic_year, day_of_week)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.todayForTeacher" => Some(handle_today_for_teacher(state, req)),
        _ => None,
    }
}
