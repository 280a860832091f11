use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::{stamp_updated, store_error, to_row, ServiceError};
use crate::fallback::{SampleData, SAMPLE_STAFF_COUNT};
use crate::model::{StaffInsert, StaffUpdate};
use crate::router::ClientRouter;
use crate::store::{Filter, Order};

const TABLE: &str = "staff";

#[derive(Clone)]
pub struct StaffService {
    router: ClientRouter,
    samples: Arc<SampleData>,
}

impl StaffService {
    pub fn new(router: ClientRouter, samples: Arc<SampleData>) -> Self {
        Self { router, samples }
    }

    pub fn list(&self) -> Vec<Value> {
        let fetched = self.router.run("staff.list", |store| {
            store.select(TABLE, &[], Some(&Order::desc("created_at")))
        });
        match fetched {
            Ok(rows) => rows,
            Err(e) => {
                warn!("staff unavailable, using fallback data: {e}");
                self.samples
                    .staff(SAMPLE_STAFF_COUNT)
                    .iter()
                    .filter_map(|s| serde_json::to_value(s).ok())
                    .collect()
            }
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<Value>, ServiceError> {
        self.router
            .run("staff.get", |store| {
                store.select_one(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }

    pub fn create(&self, payload: &StaffInsert) -> Result<Value, ServiceError> {
        let row = to_row(payload)?;
        self.router
            .run("staff.create", |store| store.insert(TABLE, &row))
            .map_err(store_error)
    }

    pub fn update(&self, id: i64, patch: &StaffUpdate) -> Result<Value, ServiceError> {
        let mut row = to_row(patch)?;
        stamp_updated(&mut row);
        self.router
            .run("staff.update", |store| {
                store.update(TABLE, &[Filter::eq("id", id)], &row)
            })
            .map_err(store_error)
    }

    pub fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        self.router
            .run("staff.delete", |store| {
                store.delete(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }
}
