use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use super::{stamp_updated, store_error, to_row, ServiceError};
use crate::auth::AuthAdmin;
use crate::fallback::SampleData;
use crate::model::{UserInsert, UserUpdate};
use crate::router::ClientRouter;
use crate::store::{Filter, Order};

const TABLE: &str = "users";

/// Profile rows linked to auth identities. `create` provisions the auth
/// identity first, then the profile; the auth id becomes the row id.
#[derive(Clone)]
pub struct UsersService {
    router: ClientRouter,
    samples: Arc<SampleData>,
    auth: Option<Arc<dyn AuthAdmin>>,
}

impl UsersService {
    pub fn new(
        router: ClientRouter,
        samples: Arc<SampleData>,
        auth: Option<Arc<dyn AuthAdmin>>,
    ) -> Self {
        Self {
            router,
            samples,
            auth,
        }
    }

    pub fn list(&self) -> Vec<Value> {
        let fetched = self.router.run("users.list", |store| {
            store.select(TABLE, &[], Some(&Order::desc("created_at")))
        });
        match fetched {
            Ok(rows) => rows,
            Err(e) => {
                warn!("users unavailable, using fallback data: {e}");
                self.samples
                    .users()
                    .iter()
                    .filter_map(|u| serde_json::to_value(u).ok())
                    .collect()
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<Value>, ServiceError> {
        self.router
            .run("users.get", |store| {
                store.select_one(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }

    pub fn create(&self, payload: &UserInsert) -> Result<Value, ServiceError> {
        let auth = self.auth.as_deref().ok_or_else(|| {
            ServiceError::NotConfigured(
                "Creating users requires the service-role key; set SUPABASE_SERVICE_ROLE_KEY \
                 and restart."
                    .to_string(),
            )
        })?;
        let password = payload.password.as_deref().unwrap_or("defaultPassword123");
        let metadata = serde_json::json!({ "name": payload.name });
        let auth_user = auth
            .create_user(&payload.email, password, metadata)
            .map_err(|e| ServiceError::Store(e.to_string()))?;

        let mut profile = Map::new();
        profile.insert("id".to_string(), Value::from(auth_user.id));
        profile.insert("email".to_string(), Value::from(payload.email.clone()));
        profile.insert("name".to_string(), Value::from(payload.name.clone()));
        profile.insert(
            "role".to_string(),
            serde_json::to_value(payload.role).unwrap_or(Value::Null),
        );
        if let Some(avatar) = &payload.avatar_url {
            profile.insert("avatar_url".to_string(), Value::from(avatar.clone()));
        }
        self.router
            .run("users.create", |store| store.insert(TABLE, &profile))
            .map_err(store_error)
    }

    pub fn update(&self, id: &str, patch: &UserUpdate) -> Result<Value, ServiceError> {
        let mut row = to_row(patch)?;
        stamp_updated(&mut row);
        self.router
            .run("users.update", |store| {
                store.update(TABLE, &[Filter::eq("id", id)], &row)
            })
            .map_err(store_error)
    }

    pub fn delete(&self, id: &str) -> Result<u64, ServiceError> {
        self.router
            .run("users.delete", |store| {
                store.delete(TABLE, &[Filter::eq("id", id)])
            })
            .map_err(store_error)
    }
}
