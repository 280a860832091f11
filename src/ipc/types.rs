use std::sync::Arc;

use serde::Deserialize;

use crate::auth::AuthBridge;
use crate::config::Config;
use crate::docstore::DocStore;
use crate::services::Services;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub services: Services,
    pub auth: AuthBridge,
    pub docs: Option<Arc<dyn DocStore>>,
    pub config: Config,
}
