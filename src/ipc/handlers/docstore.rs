use serde_json::{json, Value};

use crate::docstore::DocStore;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn store<'a>(state: &'a AppState, req: &Request) -> Result<&'a dyn DocStore, Value> {
    state.docs.as_deref().ok_or_else(|| {
        err(
            &req.id,
            "not_configured",
            "Document store is disabled; set ENABLE_MONGO=true and restart.",
            None,
        )
    })
}

fn handle_ping(state: &AppState, req: &Request) -> serde_json::Value {
    let docs = match store(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match docs.ping() {
        Ok(reply) => ok(&req.id, json!({ "reply": reply })),
        Err(e) => HandlerErr::from(e).response(&req.id),
    }
}

fn handle_find_one(state: &AppState, req: &Request) -> serde_json::Value {
    let docs = match store(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let run = || -> Result<Value, HandlerErr> {
        let collection = required_str(&req.params, "collection")?;
        let filter = req.params.get("filter").cloned().unwrap_or(Value::Null);
        let found = docs.find_one(&collection, &filter)?;
        Ok(json!({ "document": found }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_insert_one(state: &AppState, req: &Request) -> serde_json::Value {
    let docs = match store(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let run = || -> Result<Value, HandlerErr> {
        let collection = required_str(&req.params, "collection")?;
        let document = req
            .params
            .get("document")
            .filter(|d| d.is_object())
            .ok_or_else(|| HandlerErr::bad_params("missing document"))?;
        let id = docs.insert_one(&collection, document)?;
        Ok(json!({ "insertedId": id }))
    };
    match run() {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "db.ping" => Some(handle_ping(state, req)),
        "db.findOne" => Some(handle_find_one(state, req)),
        "db.insertOne" => Some(handle_insert_one(state, req)),
        _ => None,
    }
}
