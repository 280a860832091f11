use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::ServiceError;
use crate::fallback::SampleData;
use crate::router::ClientRouter;
use crate::store::{Filter, Order};

const TABLE: &str = "class_schedules";

#[derive(Clone)]
pub struct ClassesService {
    router: ClientRouter,
    samples: Arc<SampleData>,
}

impl ClassesService {
    pub fn new(router: ClientRouter, samples: Arc<SampleData>) -> Self {
        Self { router, samples }
    }

    /// A teacher's timetable for one weekday, earliest class first. Falls
    /// back to a small sample timetable when the table is unreachable.
    pub fn today_for_teacher(
        &self,
        teacher_id: &str,
        academic_year: &str,
        day_of_week: i64,
    ) -> Result<Vec<Value>, ServiceError> {
        let fetched = self.router.run("classes.todayForTeacher", |store| {
            store.select(
                TABLE,
                &[
                    Filter::eq("teacher_id", teacher_id),
                    Filter::eq("academic_year", academic_year),
                    Filter::eq("day_of_week", day_of_week),
                ],
                Some(&Order::asc("start_time")),
            )
        });
        match fetched {
            Ok(rows) => Ok(rows),
            Err(e) => {
                warn!("class schedules unavailable, using fallback data: {e}");
                self.samples
                    .classes_for(teacher_id, academic_year, day_of_week)
                    .iter()
                    .map(|c| serde_json::to_value(c).map_err(|e| ServiceError::Store(e.to_string())))
                    .collect()
            }
        }
    }
}
