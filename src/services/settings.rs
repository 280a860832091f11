use serde_json::{Map, Value};

use super::{now, store_error, ServiceError};
use crate::router::ClientRouter;
use crate::store::Filter;

const TABLE: &str = "app_settings";

/// Key/value bag for app-wide configuration (school name, current academic
/// year, grading scheme). Values are stored as JSON so callers keep shape.
#[derive(Clone)]
pub struct SettingsService {
    router: ClientRouter,
}

impl SettingsService {
    pub fn new(router: ClientRouter) -> Self {
        Self { router }
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, ServiceError> {
        let row = self
            .router
            .run("settings.get", |store| {
                store.select_one(TABLE, &[Filter::eq("key", key)])
            })
            .map_err(store_error)?;
        Ok(row.and_then(|r| r.get("value").cloned()))
    }

    pub fn set(&self, key: &str, value: &Value) -> Result<Value, ServiceError> {
        let mut row = Map::new();
        row.insert("key".to_string(), Value::from(key));
        row.insert("value".to_string(), value.clone());
        row.insert("updated_at".to_string(), Value::from(now()));
        let mut written = self
            .router
            .run("settings.set", |store| {
                store.upsert(TABLE, std::slice::from_ref(&row), &["key"])
            })
            .map_err(store_error)?;
        written
            .pop()
            .ok_or_else(|| ServiceError::Store("upsert returned no rows".to_string()))
    }

    /// All settings flattened into a single key -> value object.
    pub fn list(&self) -> Result<Value, ServiceError> {
        let rows = self
            .router
            .run("settings.list", |store| store.select(TABLE, &[], None))
            .map_err(store_error)?;
        let mut out = Map::new();
        for row in rows {
            if let (Some(key), Some(value)) = (
                row.get("key").and_then(Value::as_str),
                row.get("value"),
            ) {
                out.insert(key.to_string(), value.clone());
            }
        }
        Ok(Value::Object(out))
    }
}
