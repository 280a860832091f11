use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn handle_get(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let key = required_str(&req.params, "key")?;
        let value = state.services.settings.get(&key)?;
        Ok(json!({ "value": value }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_set(state: &AppState, req: &Request) -> serde_json::Value {
    let run = || -> Result<Value, HandlerErr> {
        let key = required_str(&req.params, "key")?;
        let value = req
            .params
            .get("value")
            .ok_or_else(|| HandlerErr::bad_params("missing value"))?;
        let row = state.services.settings.set(&key, value)?;
        Ok(json!({ "row": row }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_list(state: &AppState, req: &Request) -> serde_json::Value {
    match state.services.settings.list() {
        Ok(settings) => ok(&req.id, json!({ "settings": settings })),
        Err(e) => HandlerErr::from(e).response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(handle_get(state, req)),
        "settings.set" => Some(handle_set(state, req)),
        "settings.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
