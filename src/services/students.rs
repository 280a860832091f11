use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::{store_error, to_row, ServiceError};
use crate::drift::{insert_with_drift, update_with_drift, STUDENT_WRITE_GROUPS};
use crate::fallback::{SampleData, SAMPLE_STUDENT_COUNT};
use crate::model::{StudentInsert, StudentUpdate};
use crate::router::ClientRouter;
use crate::store::{Filter, Order};

const TABLE: &str = "students";

#[derive(Clone)]
pub struct StudentsService {
    router: ClientRouter,
    samples: Arc<SampleData>,
}

impl StudentsService {
    pub fn new(router: ClientRouter, samples: Arc<SampleData>) -> Self {
        Self { router, samples }
    }

    /// Newest first. A read failure substitutes generated sample rows so the
    /// first-run experience is never a blank screen.
    pub fn list(&self) -> Vec<Value> {
        let fetched = self.router.run("students.list", |store| {
            store.select(TABLE, &[], Some(&Order::desc("created_at")))
        });
        match fetched {
            Ok(rows) => rows,
            Err(e) => {
                warn!("students unavailable, using fallback data: {e}");
                self.samples
                    .students(SAMPLE_STUDENT_COUNT)
                    .iter()
                    .filter_map(|s| serde_json::to_value(s).ok())
                    .collect()
            }
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<Value>, ServiceError> {
        self.router
            .run("students.get", |store| {
                store.select_one(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }

    /// Insert with the full payload; if the remote schema lacks the suffix
    /// column group, resubmit once without it.
    pub fn create(&self, payload: &StudentInsert) -> Result<Value, ServiceError> {
        let row = to_row(payload)?;
        self.router
            .run("students.create", |store| {
                insert_with_drift(store, TABLE, &row, STUDENT_WRITE_GROUPS)
            })
            .map_err(store_error)
    }

    pub fn update(&self, id: i64, patch: &StudentUpdate) -> Result<Value, ServiceError> {
        let mut row = to_row(patch)?;
        super::stamp_updated(&mut row);
        self.router
            .run("students.update", |store| {
                update_with_drift(
                    store,
                    TABLE,
                    &[Filter::eq("id", id)],
                    &row,
                    STUDENT_WRITE_GROUPS,
                )
            })
            .map_err(store_error)
    }

    /// Idempotent: removing an absent id is success with a zero count.
    pub fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        self.router
            .run("students.delete", |store| {
                store.delete(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }

    pub fn search(&self, query: &str) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("students.search", |store| {
                store.search(
                    TABLE,
                    &["first_name", "last_name", "email"],
                    query,
                    Some(&Order::desc("created_at")),
                )
            })
            .map_err(store_error)
    }
}
