use std::sync::Arc;

use serde_json::{json, Value};

use schoolhubd::auth::{AuthAdmin, AuthBridge, MemAuthAdmin};
use schoolhubd::config::Config;
use schoolhubd::docstore::{DocStore, MemDocStore};
use schoolhubd::fallback::SampleData;
use schoolhubd::ipc::{handle_request, AppState, Request};
use schoolhubd::router::ClientRouter;
use schoolhubd::services::Services;
use schoolhubd::store::{MemStore, TableStore};

pub struct Harness {
    pub state: AppState,
    pub store: Arc<MemStore>,
    pub auth: Arc<MemAuthAdmin>,
}

/// One in-memory store wired as the privileged client, plus an in-memory
/// auth admin and document store.
pub fn harness() -> Harness {
    let store = Arc::new(MemStore::with_label("service-role"));
    harness_with_stores(Some(store.clone()), None, store)
}

/// Explicit privileged/direct wiring for credential-routing tests. `probe`
/// is whichever store the test wants to inspect afterwards.
pub fn harness_with_stores(
    privileged: Option<Arc<MemStore>>,
    direct: Option<Arc<MemStore>>,
    probe: Arc<MemStore>,
) -> Harness {
    let auth = Arc::new(MemAuthAdmin::new());
    let router = ClientRouter::new(
        privileged.map(|s| s as Arc<dyn TableStore>),
        direct.map(|s| s as Arc<dyn TableStore>),
    );
    let samples = Arc::new(SampleData::from_seed(7));
    let services = Services::new(
        router.clone(),
        samples,
        Some(auth.clone() as Arc<dyn AuthAdmin>),
    );
    let bridge = AuthBridge::new(
        Some(auth.clone() as Arc<dyn AuthAdmin>),
        None,
        router,
        Some("https://app.example.test/set-password".to_string()),
    );
    let state = AppState {
        services,
        auth: bridge,
        docs: Some(Arc::new(MemDocStore::new()) as Arc<dyn DocStore>),
        config: Config::default(),
    };
    Harness {
        state,
        store: probe,
        auth,
    }
}

/// No stores at all: every data path is unconfigured.
pub fn harness_unconfigured() -> Harness {
    let probe = Arc::new(MemStore::new());
    harness_with_stores(None, None, probe)
}

pub fn call(state: &AppState, id: &str, method: &str, params: Value) -> Value {
    handle_request(
        state,
        Request {
            id: id.to_string(),
            method: method.to_string(),
            params,
        },
    )
}

pub fn call_ok(state: &AppState, id: &str, method: &str, params: Value) -> Value {
    let resp = call(state, id, method, params);
    assert_eq!(resp.get("id").and_then(Value::as_str), Some(id));
    assert_eq!(
        resp.get("ok").and_then(Value::as_bool),
        Some(true),
        "{method} failed: {resp}"
    );
    resp.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Asserts failure and returns (code, message).
pub fn call_err(state: &AppState, id: &str, method: &str, params: Value) -> (String, String) {
    let resp = call(state, id, method, params);
    assert_eq!(
        resp.get("ok").and_then(Value::as_bool),
        Some(false),
        "{method} unexpectedly succeeded: {resp}"
    );
    let error = resp.get("error").cloned().unwrap_or_default();
    (
        error
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    )
}
