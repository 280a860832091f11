use serde_json::Value;
use uuid::Uuid;

use super::{stamp_updated, store_error, ServiceError};
use crate::drift::{insert_with_drift, update_with_drift, SECTION_SUBJECT_WRITE_GROUPS};
use crate::router::ClientRouter;
use crate::store::{Filter, Order, Row, StoreError};

const TABLE: &str = "section_subjects";

#[derive(Clone)]
pub struct SectionSubjectsService {
    router: ClientRouter,
}

fn subject_error(e: StoreError) -> ServiceError {
    match e {
        StoreError::Conflict(_) => ServiceError::Conflict(
            "This subject is already assigned to the selected section.".to_string(),
        ),
        other => store_error(other),
    }
}

fn is_uuid_v1_5(value: &Value) -> bool {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(|u| (1..=5).contains(&u.get_version_num()))
        .unwrap_or(false)
}

/// Nothing non-numeric may reach the store in `staff_id`; empty strings and
/// garbage normalize to null rather than erroring.
fn coerce_staff_id(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Value::Null;
            }
            trimmed
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| trimmed.parse::<f64>().map(Value::from))
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// `teacher_id` must be a well-formed UUID (versions 1-5) or it is omitted
/// entirely — never sent as null; `staff_id` is coerced to a number or null.
pub fn sanitize(payload: &Row) -> Row {
    let mut out = payload.clone();
    if out.contains_key("teacher_id") && !out.get("teacher_id").map(is_uuid_v1_5).unwrap_or(false)
    {
        out.remove("teacher_id");
    }
    if let Some(v) = out.get("staff_id") {
        let coerced = coerce_staff_id(v);
        out.insert("staff_id".to_string(), coerced);
    }
    out
}

impl SectionSubjectsService {
    pub fn new(router: ClientRouter) -> Self {
        Self { router }
    }

    pub fn list_by_section(&self, section_id: i64) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("admin.listSectionSubjects", |store| {
                store.select(
                    TABLE,
                    &[Filter::eq("section_id", section_id)],
                    Some(&Order::asc("subject")),
                )
            })
            .map_err(store_error)
    }

    pub fn create(&self, payload: &Row) -> Result<Value, ServiceError> {
        for key in ["section_id", "subject"] {
            if payload.get(key).map(Value::is_null).unwrap_or(true) {
                return Err(ServiceError::BadPayload(format!("missing {key}")));
            }
        }
        let row = sanitize(payload);
        self.router
            .run("admin.createSectionSubject", |store| {
                insert_with_drift(store, TABLE, &row, SECTION_SUBJECT_WRITE_GROUPS)
            })
            .map_err(subject_error)
    }

    pub fn update(&self, id: i64, patch: &Row) -> Result<Value, ServiceError> {
        let mut row = sanitize(patch);
        stamp_updated(&mut row);
        self.router
            .run("admin.updateSectionSubject", |store| {
                update_with_drift(
                    store,
                    TABLE,
                    &[Filter::eq("id", id)],
                    &row,
                    SECTION_SUBJECT_WRITE_GROUPS,
                )
            })
            .map_err(subject_error)
    }

    pub fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        self.router
            .run("admin.deleteSectionSubject", |store| {
                store.delete(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn invalid_teacher_id_is_omitted_not_nulled() {
        let out = sanitize(&row(json!({ "subject": "Math", "teacher_id": "2" })));
        assert!(!out.contains_key("teacher_id"));
    }

    #[test]
    fn valid_teacher_id_survives() {
        let id = Uuid::new_v4().to_string();
        let out = sanitize(&row(json!({ "teacher_id": id })));
        assert_eq!(out.get("teacher_id").and_then(Value::as_str), Some(id.as_str()));
    }

    #[test]
    fn staff_id_coercions() {
        let cases = [
            (json!(""), Value::Null),
            (json!("12"), json!(12)),
            (json!(7), json!(7)),
            (json!("abc"), Value::Null),
            (Value::Null, Value::Null),
            (json!(true), Value::Null),
        ];
        for (input, expected) in cases {
            let out = sanitize(&row(json!({ "staff_id": input })));
            assert_eq!(out.get("staff_id"), Some(&expected), "input {input:?}");
        }
    }
}
