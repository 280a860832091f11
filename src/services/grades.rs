use serde_json::Value;

use super::{stamp_updated, store_error, to_row, ServiceError};
use crate::model::{GradeInsert, GradeUpdate};
use crate::router::ClientRouter;
use crate::store::{Filter, Order};

const TABLE: &str = "grades";

/// Academic records: like attendance, read failures propagate instead of
/// substituting sample data.
#[derive(Clone)]
pub struct GradesService {
    router: ClientRouter,
}

impl GradesService {
    pub fn new(router: ClientRouter) -> Self {
        Self { router }
    }

    pub fn list(&self) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("grades.list", |store| {
                store.select(TABLE, &[], Some(&Order::desc("created_at")))
            })
            .map_err(store_error)
    }

    pub fn by_student(&self, student_id: i64) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("grades.byStudent", |store| {
                store.select(
                    TABLE,
                    &[Filter::eq("student_id", student_id)],
                    Some(&Order::desc("created_at")),
                )
            })
            .map_err(store_error)
    }

    pub fn by_subject(&self, subject: &str) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("grades.bySubject", |store| {
                store.select(TABLE, &[Filter::eq("subject", subject)], None)
            })
            .map_err(store_error)
    }

    pub fn create(&self, payload: &GradeInsert) -> Result<Value, ServiceError> {
        let row = to_row(payload)?;
        self.router
            .run("grades.create", |store| store.insert(TABLE, &row))
            .map_err(store_error)
    }

    pub fn update(&self, id: i64, patch: &GradeUpdate) -> Result<Value, ServiceError> {
        let mut row = to_row(patch)?;
        stamp_updated(&mut row);
        self.router
            .run("grades.update", |store| {
                store.update(TABLE, &[Filter::eq("id", id)], &row)
            })
            .map_err(store_error)
    }

    pub fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        self.router
            .run("grades.delete", |store| {
                store.delete(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }
}
