use serde_json::Value;

use super::{stamp_updated, store_error, to_row, ServiceError};
use crate::model::{AttendanceInsert, AttendanceUpdate};
use crate::router::ClientRouter;
use crate::store::{Filter, Order, Row};

const TABLE: &str = "attendance";

/// Academic records: no sample-data fallback anywhere on this service —
/// substituted attendance would be actively misleading.
#[derive(Clone)]
pub struct AttendanceService {
    router: ClientRouter,
}

impl AttendanceService {
    pub fn new(router: ClientRouter) -> Self {
        Self { router }
    }

    pub fn by_student(&self, student_id: i64) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("attendance.byStudent", |store| {
                store.select(
                    TABLE,
                    &[Filter::eq("student_id", student_id)],
                    Some(&Order::desc("date")),
                )
            })
            .map_err(store_error)
    }

    pub fn by_date(&self, date: &str) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("attendance.byDate", |store| {
                store.select(TABLE, &[Filter::eq("date", date)], None)
            })
            .map_err(store_error)
    }

    pub fn create(&self, payload: &AttendanceInsert) -> Result<Value, ServiceError> {
        let row = to_row(payload)?;
        self.router
            .run("attendance.create", |store| store.insert(TABLE, &row))
            .map_err(store_error)
    }

    pub fn update(&self, id: i64, patch: &AttendanceUpdate) -> Result<Value, ServiceError> {
        let mut row = to_row(patch)?;
        stamp_updated(&mut row);
        self.router
            .run("attendance.update", |store| {
                store.update(TABLE, &[Filter::eq("id", id)], &row)
            })
            .map_err(store_error)
    }

    /// Upsert on (student_id, date) so re-marking a day never trips the
    /// composite uniqueness constraint.
    pub fn bulk_upsert(&self, records: &[AttendanceInsert]) -> Result<Vec<Value>, ServiceError> {
        let rows: Vec<Row> = records
            .iter()
            .map(|r| {
                let mut row = to_row(r)?;
                stamp_updated(&mut row);
                Ok(row)
            })
            .collect::<Result<_, ServiceError>>()?;
        self.router
            .run("attendance.bulkUpsert", |store| {
                store.upsert(TABLE, &rows, &["student_id", "date"])
            })
            .map_err(store_error)
    }
}
