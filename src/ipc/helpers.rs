use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::err;
use crate::auth::{AuthError, Redirect};
use crate::docstore::DocStoreError;
use crate::services::ServiceError;

pub(crate) struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }
}

impl From<ServiceError> for HandlerErr {
    fn from(e: ServiceError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: None,
        }
    }
}

impl From<AuthError> for HandlerErr {
    fn from(e: AuthError) -> Self {
        let code = match &e {
            AuthError::NotConfigured(_) => "not_configured",
            AuthError::NotFound(_) => "not_found",
            AuthError::Remote(_) | AuthError::Transport(_) => "auth_error",
        };
        Self {
            code,
            message: e.to_string(),
            details: None,
        }
    }
}

impl From<DocStoreError> for HandlerErr {
    fn from(e: DocStoreError) -> Self {
        let code = match &e {
            DocStoreError::Unavailable(_) => "not_configured",
            DocStoreError::Remote(_) => "doc_error",
        };
        Self {
            code,
            message: e.to_string(),
            details: None,
        }
    }
}

pub(crate) fn required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))
}

pub(crate) fn required_i64(params: &Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))
}

pub(crate) fn optional_str(params: &Value, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Deserialize `params[key]` into a typed payload.
pub(crate) fn payload<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, HandlerErr> {
    let raw = params
        .get(key)
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))?;
    serde_json::from_value(raw).map_err(|e| HandlerErr::bad_params(format!("{key}: {e}")))
}

/// `redirectTo` is tri-state: absent uses the configured default, an explicit
/// null omits the redirect, a string overrides.
pub(crate) fn redirect(params: &Value) -> Result<Redirect, HandlerErr> {
    match params.get("redirectTo") {
        None => Ok(Redirect::Default),
        Some(Value::Null) => Ok(Redirect::Omit),
        Some(Value::String(u)) => Ok(Redirect::Url(u.clone())),
        Some(_) => Err(HandlerErr::bad_params("redirectTo must be a string or null")),
    }
}
