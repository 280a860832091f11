//! Per-entity CRUD over the remote store. Services hold an injected
//! [`ClientRouter`] and, for the demo-safe read paths, a [`SampleData`]
//! generator; they own no state of their own — every read re-fetches.

pub mod attendance;
pub mod classes;
pub mod grade_sections;
pub mod grades;
pub mod section_subjects;
pub mod settings;
pub mod staff;
pub mod students;
pub mod users;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthAdmin;
use crate::fallback::SampleData;
use crate::router::ClientRouter;
use crate::store::{Row, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotConfigured(String),
    #[error("{0}")]
    MissingTable(String),
    #[error("column {0} is missing from the remote schema")]
    MissingColumn(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Permission(String),
    #[error("{0}")]
    BadPayload(String),
    #[error("{0}")]
    Store(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::MissingTable(_) => "missing_table",
            Self::MissingColumn(_) => "missing_column",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::Permission(_) => "permission",
            Self::BadPayload(_) => "bad_params",
            Self::Store(_) => "store_error",
        }
    }
}

/// Default mapping from store failures to caller-facing errors. A missing
/// table names the migration script that provisions it — the remote database
/// is user-provisioned and may be mid-migration.
pub(crate) fn store_error(e: StoreError) -> ServiceError {
    match e {
        StoreError::NotConfigured(m) => ServiceError::NotConfigured(m),
        StoreError::MissingTable { table } => {
            let script = table.replace('_', "-");
            ServiceError::MissingTable(format!(
                "Database is missing table public.{table}. Open the Supabase SQL editor and run \
                 database/create-{script}-table.sql (and database/rls_policies_all.sql), then reload."
            ))
        }
        StoreError::MissingColumn { table, column } => {
            ServiceError::MissingColumn(format!("{table}.{column}"))
        }
        StoreError::Conflict(m) => ServiceError::Conflict(m),
        StoreError::NotFound => ServiceError::NotFound("no rows matched".to_string()),
        StoreError::Permission(m) => ServiceError::Permission(m),
        other => ServiceError::Store(other.to_string()),
    }
}

pub(crate) fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Serialize a typed payload into a store row.
pub(crate) fn to_row<T: Serialize>(payload: &T) -> Result<Row, ServiceError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ServiceError::BadPayload("payload must be an object".to_string())),
        Err(e) => Err(ServiceError::BadPayload(e.to_string())),
    }
}

/// Caller-side refresh of `updated_at`, applied before every update/upsert.
pub(crate) fn stamp_updated(row: &mut Row) {
    row.insert("updated_at".to_string(), Value::from(now()));
}

/// The full service set, built once at startup from injected clients.
pub struct Services {
    pub students: students::StudentsService,
    pub staff: staff::StaffService,
    pub attendance: attendance::AttendanceService,
    pub grades: grades::GradesService,
    pub users: users::UsersService,
    pub grade_sections: grade_sections::GradeSectionsService,
    pub section_subjects: section_subjects::SectionSubjectsService,
    pub settings: settings::SettingsService,
    pub classes: classes::ClassesService,
}

impl Services {
    pub fn new(
        router: ClientRouter,
        samples: Arc<SampleData>,
        auth: Option<Arc<dyn AuthAdmin>>,
    ) -> Self {
        Self {
            students: students::StudentsService::new(router.clone(), samples.clone()),
            staff: staff::StaffService::new(router.clone(), samples.clone()),
            attendance: attendance::AttendanceService::new(router.clone()),
            grades: grades::GradesService::new(router.clone()),
            users: users::UsersService::new(router.clone(), samples.clone(), auth),
            grade_sections: grade_sections::GradeSectionsService::new(router.clone()),
            section_subjects: section_subjects::SectionSubjectsService::new(router.clone()),
            settings: settings::SettingsService::new(router.clone()),
            classes: classes::ClassesService::new(router, samples),
        }
    }
}
