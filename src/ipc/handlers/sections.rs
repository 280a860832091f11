use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{optional_str, payload, required_i64, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::GradeSectionInsert;
use crate::store::Row;

fn handle_list_sections(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let year = required_str(&req.params, "academicYear")?;
        let rows = state.services.grade_sections.list(&year)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_add_section(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let insert = GradeSectionInsert {
            grade: required_i64(&req.params, "grade")?,
            section_name: required_str(&req.params, "sectionName")?,
            academic_year: required_str(&req.params, "academicYear")?,
            notes: optional_str(&req.params, "notes"),
        };
        let row = state.services.grade_sections.add(&insert)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_remove_section(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let grade = required_i64(&req.params, "grade")?;
        let section_name = required_str(&req.params, "sectionName")?;
        let academic_year = required_str(&req.params, "academicYear")?;
        let deleted = state
            .services
            .grade_sections
            .remove_by_composite(grade, &section_name, &academic_year)?;
        Ok(json!({ "deleted": deleted }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_list_subjects(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let section_id = required_i64(&req.params, "sectionId")?;
        let rows = state.services.section_subjects.list_by_section(section_id)?;
        Ok(json!({ "rows": rows }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_create_subject(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let row: Row = payload(&req.params, "payload")?;
        let created = state.services.section_subjects.create(&row)?;
        Ok(json!({ "row": created }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_update_subject(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_i64(&req.params, "id")?;
        let patch: Row = payload(&req.params, "patch")?;
        let updated = state.services.section_subjects.update(id, &patch)?;
        Ok(json!({ "row": updated }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_delete_subject(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let id = required_i64(&req.params, "id")?;
        let deleted = state.services.section_subjects.delete(id)?;
        Ok(json!({ "deleted": deleted }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_list_staff(state: &AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "rows": state.services.staff.list() }))
}

fn handle_list_users(state: &AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "rows": state.services.users.list() }))
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "admin.listStaff" => Some(handle_list_staff(state, req)),
        "admin.listUsers" => Some(handle_list_users(state, req)),
        "admin.listGradeSections" => Some(handle_list_sections(state, req)),
        "admin.addGradeSection" => Some(handle_add_section(state, req)),
        "admin.removeGradeSectionByComposite" => Some(handle_remove_section(state, req)),
        "admin.listSectionSubjects" => Some(handle_list_subjects(state, req)),
        "admin.createSectionSubject" => Some(handle_create_subject(state, req)),
        "admin.updateSectionSubject" => Some(handle_update_subject(state, req)),
        "admin.deleteSectionSubject" => Some(handle_delete_subject(state, req)),
        _ => None,
    }
}
