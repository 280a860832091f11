use serde_json::Value;

use super::{store_error, to_row, ServiceError};
use crate::model::GradeSectionInsert;
use crate::router::ClientRouter;
use crate::store::{Filter, Order, StoreError};

const TABLE: &str = "grade_sections";

/// Sections are keyed by the (grade, section_name, academic_year) triple;
/// `id` is a surrogate callers often don't have, hence the composite delete.
#[derive(Clone)]
pub struct GradeSectionsService {
    router: ClientRouter,
}

fn section_error(e: StoreError) -> ServiceError {
    match e {
        StoreError::Conflict(_) => ServiceError::Conflict(
            "A section with the same name already exists for this grade and year.".to_string(),
        ),
        other => store_error(other),
    }
}

impl GradeSectionsService {
    pub fn new(router: ClientRouter) -> Self {
        Self { router }
    }

    pub fn list(&self, academic_year: &str) -> Result<Vec<Value>, ServiceError> {
        self.router
            .run("admin.listGradeSections", |store| {
                store.select(
                    TABLE,
                    &[Filter::eq("academic_year", academic_year)],
                    Some(&Order::asc("grade")),
                )
            })
            .map_err(store_error)
    }

    pub fn add(&self, payload: &GradeSectionInsert) -> Result<Value, ServiceError> {
        let row = to_row(payload)?;
        self.router
            .run("admin.addGradeSection", |store| store.insert(TABLE, &row))
            .map_err(section_error)
    }

    /// Deletes exactly the rows matching all three key fields — never a
    /// subset of the key.
    pub fn remove_by_composite(
        &self,
        grade: i64,
        section_name: &str,
        academic_year: &str,
    ) -> Result<u64, ServiceError> {
        self.router
            .run("admin.removeGradeSectionByComposite", |store| {
                store.delete(
                    TABLE,
                    &[
                        Filter::eq("grade", grade),
                        Filter::eq("section_name", section_name),
                        Filter::eq("academic_year", academic_year),
                    ],
                )
            })
            .map_err(store_error)
    }
}
