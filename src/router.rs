//! Credential routing. Two optional clients share one contract: a
//! service-role (privileged) store and an anon-key (direct) store. Data
//! operations prefer the privileged client and retry once against the direct
//! client when the privileged call fails; neither configured is a distinct,
//! actionable error, never a silent no-op.

use std::sync::Arc;

use tracing::warn;

use crate::store::{StoreError, TableStore};

pub const NOT_CONFIGURED_HINT: &str =
    "set SUPABASE_URL plus SUPABASE_SERVICE_ROLE_KEY (or SUPABASE_ANON_KEY) and restart";

#[derive(Clone, Default)]
pub struct ClientRouter {
    privileged: Option<Arc<dyn TableStore>>,
    direct: Option<Arc<dyn TableStore>>,
}

impl ClientRouter {
    pub fn new(
        privileged: Option<Arc<dyn TableStore>>,
        direct: Option<Arc<dyn TableStore>>,
    ) -> Self {
        Self { privileged, direct }
    }

    pub fn has_privileged(&self) -> bool {
        self.privileged.is_some()
    }

    pub fn has_any(&self) -> bool {
        self.privileged.is_some() || self.direct.is_some()
    }

    /// Run `f` against the privileged client, falling back to the direct
    /// client on any failure. The fallback's error wins when both fail.
    pub fn run<T>(
        &self,
        op: &str,
        f: impl Fn(&dyn TableStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        match (&self.privileged, &self.direct) {
            (Some(privileged), Some(direct)) => match f(privileged.as_ref()) {
                Ok(v) => Ok(v),
                Err(e) => {
                    warn!(
                        op,
                        client = privileged.label(),
                        "privileged call failed ({e}), retrying with direct client"
                    );
                    f(direct.as_ref())
                }
            },
            (Some(privileged), None) => f(privileged.as_ref()),
            (None, Some(direct)) => f(direct.as_ref()),
            (None, None) => Err(StoreError::NotConfigured(NOT_CONFIGURED_HINT.to_string())),
        }
    }
}
