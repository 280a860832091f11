use serde_json::{json, Value};

/// Environment-derived settings, read once at startup. Missing credentials
/// are not fatal: the daemon still runs and reports `not_configured` on the
/// paths that need them.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub anon_key: Option<String>,
    pub service_role_key: Option<String>,
    pub redirect_to: Option<String>,
    pub enable_mongo: bool,
    pub mongo_uri: String,
    pub mongo_db: String,
}

impl Config {
    pub fn from_env() -> Self {
        let get = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            supabase_url: get("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            anon_key: get("SUPABASE_ANON_KEY"),
            service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            redirect_to: get("SUPABASE_REDIRECT_TO"),
            enable_mongo: get("ENABLE_MONGO")
                .map(|v| v.to_ascii_lowercase() == "true")
                .unwrap_or(false),
            mongo_uri: get("MONGODB_URI").unwrap_or_else(|| "mongodb://127.0.0.1:27017".into()),
            mongo_db: get("MONGODB_DB").unwrap_or_else(|| "schoolhub".into()),
        }
    }

    pub fn has_privileged(&self) -> bool {
        self.supabase_url.is_some() && self.service_role_key.is_some()
    }

    pub fn has_direct(&self) -> bool {
        self.supabase_url.is_some() && self.anon_key.is_some()
    }

    /// Masked view of which credentials are visible, for `auth.diagnose`.
    /// Never leaks more than a short prefix.
    pub fn diagnostics(&self) -> Value {
        let sample = |v: &Option<String>, n: usize| {
            v.as_ref().map(|s| format!("{}...", s.chars().take(n).collect::<String>()))
        };
        json!({
            "hasUrl": self.supabase_url.is_some(),
            "hasAnonKey": self.anon_key.is_some(),
            "hasServiceKey": self.service_role_key.is_some(),
            "urlSample": sample(&self.supabase_url, 24),
            "keySample": sample(&self.service_role_key, 6),
        })
    }
}
