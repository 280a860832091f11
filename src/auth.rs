//! Auth administration: the GoTrue admin API behind a trait, plus the
//! privileged account flows (invite, recovery links, password set,
//! create-or-update). The flows also repair the `users` profile row lazily —
//! a profile must exist whenever an auth identity does.

use std::sync::{Arc, Mutex};

use reqwest::blocking::Client;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::model::Role;
use crate::router::ClientRouter;
use crate::store::Filter;

/// Paged email lookup bounds: GoTrue has no direct lookup-by-email, so we
/// walk pages. The page cap is a safety valve against unbounded looping, not
/// a timeout.
const LOOKUP_PER_PAGE: u32 = 1000;
const LOOKUP_MAX_PAGES: u32 = 100;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    NotConfigured(String),
    #[error("{0}")]
    NotFound(String),
    #[error("auth service error: {0}")]
    Remote(String),
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum LinkKind {
    Invite,
    Recovery,
}

impl LinkKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Invite => "invite",
            Self::Recovery => "recovery",
        }
    }
}

/// Redirect handling mirrors the desktop bridge: an explicit null means
/// "omit the redirect and use the hosted form"; absent falls back to the
/// configured default.
#[derive(Debug, Clone)]
pub enum Redirect {
    Default,
    Omit,
    Url(String),
}

impl Redirect {
    pub fn resolve(&self, default: Option<&str>) -> Option<String> {
        match self {
            Self::Default => default.map(str::to_string),
            Self::Omit => None,
            Self::Url(u) => Some(u.clone()),
        }
    }
}

pub trait AuthAdmin: Send + Sync {
    fn create_user(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthUser, AuthError>;

    fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<AuthUser>, AuthError>;

    fn update_password(&self, user_id: &str, password: &str) -> Result<AuthUser, AuthError>;

    fn invite_by_email(
        &self,
        email: &str,
        metadata: Value,
        redirect_to: Option<&str>,
    ) -> Result<AuthUser, AuthError>;

    fn generate_link(
        &self,
        kind: LinkKind,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<String, AuthError>;
}

/// Case-insensitive paged search for an auth identity by email.
pub fn find_user_by_email(
    admin: &dyn AuthAdmin,
    email: &str,
) -> Result<Option<AuthUser>, AuthError> {
    let needle = email.to_lowercase();
    let mut page = 1;
    while page <= LOOKUP_MAX_PAGES {
        let users = admin.list_users(page, LOOKUP_PER_PAGE)?;
        let count = users.len();
        if let Some(found) = users.into_iter().find(|u| {
            u.email
                .as_deref()
                .map(|e| e.to_lowercase() == needle)
                .unwrap_or(false)
        }) {
            return Ok(Some(found));
        }
        if count < LOOKUP_PER_PAGE as usize {
            break;
        }
        page += 1;
    }
    Ok(None)
}

// --- GoTrue admin client (service-role key) ---

pub struct GoTrueAdmin {
    http: Client,
    base: String,
    key: String,
}

impl GoTrueAdmin {
    pub fn new(url: &str, service_role_key: &str) -> Result<Self, AuthError> {
        let http = Client::builder()
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base: format!("{}/auth/v1", url.trim_end_matches('/')),
            key: service_role_key.to_string(),
        })
    }

    fn post(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .post(format!("{}{path}", self.base))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn check(resp: reqwest::blocking::Response) -> Result<Value, AuthError> {
        let status = resp.status();
        let body: Value = resp.json().unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("msg")
            .or_else(|| body.get("message"))
            .or_else(|| body.get("error_description"))
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("auth request failed with status {status}"));
        Err(AuthError::Remote(message))
    }

    fn user_from(body: &Value) -> Result<AuthUser, AuthError> {
        // Create/update return the user directly; some endpoints nest it.
        let user = body.get("user").unwrap_or(body);
        let id = user
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Remote("auth response carried no user id".to_string()))?;
        Ok(AuthUser {
            id: id.to_string(),
            email: user.get("email").and_then(Value::as_str).map(str::to_string),
        })
    }
}

impl AuthAdmin for GoTrueAdmin {
    fn create_user(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthUser, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "email_confirm": true,
            "user_metadata": metadata,
        });
        let resp = self
            .post("/admin/users")
            .json(&body)
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Self::user_from(&Self::check(resp)?)
    }

    fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<AuthUser>, AuthError> {
        let resp = self
            .http
            .get(format!("{}/admin/users", self.base))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let body = Self::check(resp)?;
        let users = body
            .get("users")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        users.iter().map(Self::user_from).collect()
    }

    fn update_password(&self, user_id: &str, password: &str) -> Result<AuthUser, AuthError> {
        let resp = self
            .http
            .put(format!("{}/admin/users/{user_id}", self.base))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .json(&json!({ "password": password }))
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Self::user_from(&Self::check(resp)?)
    }

    fn invite_by_email(
        &self,
        email: &str,
        metadata: Value,
        redirect_to: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        let mut req = self.post("/invite").json(&json!({
            "email": email,
            "data": metadata,
        }));
        if let Some(redirect) = redirect_to {
            req = req.query(&[("redirect_to", redirect)]);
        }
        let resp = req.send().map_err(|e| AuthError::Transport(e.to_string()))?;
        Self::user_from(&Self::check(resp)?)
    }

    fn generate_link(
        &self,
        kind: LinkKind,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<String, AuthError> {
        let mut body = json!({
            "type": kind.as_str(),
            "email": email,
        });
        if let Some(redirect) = redirect_to {
            body["redirect_to"] = Value::from(redirect);
        }
        let resp = self
            .post("/admin/generate_link")
            .json(&body)
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let parsed = Self::check(resp)?;
        parsed
            .get("action_link")
            .or_else(|| parsed.get("properties").and_then(|p| p.get("action_link")))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AuthError::Remote(format!("no {} link returned", kind.as_str())))
    }
}

// --- Edge function client (anon key; reduced-trust web fallback) ---

pub struct EdgeFunctions {
    http: Client,
    base: String,
    key: String,
}

impl EdgeFunctions {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, AuthError> {
        let http = Client::builder()
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base: format!("{}/functions/v1", url.trim_end_matches('/')),
            key: anon_key.to_string(),
        })
    }

    pub fn invoke(&self, name: &str, body: &Value) -> Result<Value, AuthError> {
        let resp = self
            .http
            .post(format!("{}/{name}", self.base))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .json(body)
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        resp.json().map_err(|e| AuthError::Transport(e.to_string()))
    }
}

// --- Privileged account flows ---

#[derive(Debug, Clone, Default)]
pub struct StaffUserResult {
    pub user_id: Option<String>,
    pub invited: bool,
    pub recovery_link: Option<String>,
    pub invite_link: Option<String>,
}

pub struct AuthBridge {
    admin: Option<Arc<dyn AuthAdmin>>,
    functions: Option<EdgeFunctions>,
    users: ClientRouter,
    default_redirect: Option<String>,
}

impl AuthBridge {
    pub fn new(
        admin: Option<Arc<dyn AuthAdmin>>,
        functions: Option<EdgeFunctions>,
        users: ClientRouter,
        default_redirect: Option<String>,
    ) -> Self {
        Self {
            admin,
            functions,
            users,
            default_redirect,
        }
    }

    pub fn has_admin(&self) -> bool {
        self.admin.is_some()
    }

    fn admin(&self) -> Result<&dyn AuthAdmin, AuthError> {
        self.admin.as_deref().ok_or_else(|| {
            AuthError::NotConfigured(
                "Supabase admin is not configured on this machine. Ensure SUPABASE_URL and \
                 SUPABASE_SERVICE_ROLE_KEY are set and restart."
                    .to_string(),
            )
        })
    }

    fn resolve_redirect(&self, redirect: &Redirect) -> Option<String> {
        redirect.resolve(self.default_redirect.as_deref())
    }

    /// Invite a staff member by email. On invite failure (already
    /// registered, mail disabled), fall back to a recovery link, then an
    /// un-mailed invite link; only when all three fail does the caller see
    /// an error.
    pub fn create_staff_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        redirect: &Redirect,
    ) -> Result<StaffUserResult, AuthError> {
        let admin = self.admin()?;
        let redirect_to = self.resolve_redirect(redirect);
        let metadata = json!({
            "name": name,
            "role": role,
            "must_change_password": true,
        });

        match admin.invite_by_email(email, metadata, redirect_to.as_deref()) {
            Ok(user) => {
                self.ensure_profile(&user.id, email, name, role, false);
                Ok(StaffUserResult {
                    user_id: Some(user.id),
                    invited: true,
                    ..StaffUserResult::default()
                })
            }
            Err(invite_err) => {
                if let Ok(link) =
                    admin.generate_link(LinkKind::Recovery, email, redirect_to.as_deref())
                {
                    return Ok(StaffUserResult {
                        recovery_link: Some(link),
                        ..StaffUserResult::default()
                    });
                }
                if let Ok(link) =
                    admin.generate_link(LinkKind::Invite, email, redirect_to.as_deref())
                {
                    return Ok(StaffUserResult {
                        invite_link: Some(link),
                        ..StaffUserResult::default()
                    });
                }
                Err(invite_err)
            }
        }
    }

    pub fn generate_link(
        &self,
        kind: LinkKind,
        email: &str,
        redirect: &Redirect,
    ) -> Result<String, AuthError> {
        let redirect_to = self.resolve_redirect(redirect);
        self.admin()?.generate_link(kind, email, redirect_to.as_deref())
    }

    /// Finds the auth identity by email and sets its password directly.
    pub fn set_user_password(&self, email: &str, new_password: &str) -> Result<String, AuthError> {
        let admin = self.admin()?;
        let user = find_user_by_email(admin, email)?
            .ok_or_else(|| AuthError::NotFound("User not found for email".to_string()))?;
        let updated = admin.update_password(&user.id, new_password)?;
        Ok(updated.id)
    }

    /// Create the auth identity, or update the existing one's password; then
    /// repair the profile row. Calling twice with the same email updates in
    /// place rather than duplicating.
    pub fn create_or_update_user_with_password(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        role_label: Option<&str>,
    ) -> Result<String, AuthError> {
        let role = Role::from_label_or_staff(role_label);
        let final_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

        let admin = match self.admin() {
            Ok(admin) => admin,
            // Reduced trust: the create-user edge function runs server-side
            // with the service role.
            Err(not_configured) => {
                return self.create_user_via_function(email, password, &final_name, role, not_configured)
            }
        };

        let metadata = json!({ "name": final_name, "role": role });
        let user_id = match admin.create_user(email, password, metadata) {
            Ok(user) => user.id,
            Err(create_err) => {
                let existing = find_user_by_email(admin, email)?
                    .ok_or(create_err)?;
                admin.update_password(&existing.id, password)?;
                existing.id
            }
        };

        self.ensure_profile(&user_id, email, &final_name, role, true);
        Ok(user_id)
    }

    fn create_user_via_function(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
        not_configured: AuthError,
    ) -> Result<String, AuthError> {
        let Some(functions) = &self.functions else {
            return Err(not_configured);
        };
        let body = json!({ "email": email, "password": password, "name": name, "role": role });
        let data = functions.invoke("create-user", &body)?;
        if data.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            Ok(data
                .get("userId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string())
        } else {
            let message = data
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Failed to create/update user credentials");
            Err(AuthError::Remote(message.to_string()))
        }
    }

    /// Capability probe: does the service key actually work?
    pub fn test_admin(&self) -> Result<usize, AuthError> {
        Ok(self.admin()?.list_users(1, 1)?.len())
    }

    /// Insert-if-missing, else optionally refresh name/role. Profile repair
    /// is best-effort: a failure is a warning, never a flow error.
    fn ensure_profile(&self, user_id: &str, email: &str, name: &str, role: Role, update_existing: bool) {
        let role_value = serde_json::to_value(role).unwrap_or(Value::Null);
        let result = self.users.run("users.ensureProfile", |store| {
            let filters = [Filter::eq("id", user_id)];
            match store.select_one("users", &filters)? {
                None => {
                    let mut row = Map::new();
                    row.insert("id".to_string(), Value::from(user_id));
                    row.insert("email".to_string(), Value::from(email));
                    row.insert("name".to_string(), Value::from(name));
                    row.insert("role".to_string(), role_value.clone());
                    row.insert("avatar_url".to_string(), Value::Null);
                    store.insert("users", &row).map(|_| ())
                }
                Some(_) if update_existing => {
                    let mut patch = Map::new();
                    patch.insert("name".to_string(), Value::from(name));
                    patch.insert("role".to_string(), role_value.clone());
                    patch.insert(
                        "updated_at".to_string(),
                        Value::from(chrono::Utc::now().to_rfc3339()),
                    );
                    store.update("users", &filters, &patch).map(|_| ())
                }
                Some(_) => Ok(()),
            }
        });
        if let Err(e) = result {
            warn!(user_id, "created auth user but failed to ensure users profile: {e}");
        }
    }
}

// --- In-memory double for tests ---

#[derive(Default)]
struct MemAuthInner {
    users: Vec<MemAuthUser>,
    invite_failure: Option<String>,
    link_failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemAuthUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub metadata: Value,
}

/// Test double for [`AuthAdmin`]; remembers passwords so tests can assert
/// update-over-create behavior.
#[derive(Default)]
pub struct MemAuthAdmin {
    inner: Mutex<MemAuthInner>,
}

impl MemAuthAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_invites(&self, message: &str) {
        self.inner.lock().unwrap().invite_failure = Some(message.to_string());
    }

    pub fn fail_links(&self, message: &str) {
        self.inner.lock().unwrap().link_failure = Some(message.to_string());
    }

    pub fn users(&self) -> Vec<MemAuthUser> {
        self.inner.lock().unwrap().users.clone()
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| u.password.clone())
    }
}

impl AuthAdmin for MemAuthAdmin {
    fn create_user(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(AuthError::Remote("A user with this email address has already been registered".to_string()));
        }
        let user = MemAuthUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            metadata,
        };
        inner.users.push(user.clone());
        Ok(AuthUser {
            id: user.id,
            email: Some(user.email),
        })
    }

    fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<AuthUser>, AuthError> {
        let inner = self.inner.lock().unwrap();
        let start = ((page.max(1) - 1) * per_page) as usize;
        Ok(inner
            .users
            .iter()
            .skip(start)
            .take(per_page as usize)
            .map(|u| AuthUser {
                id: u.id.clone(),
                email: Some(u.email.clone()),
            })
            .collect())
    }

    fn update_password(&self, user_id: &str, password: &str) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AuthError::NotFound("user not found".to_string()))?;
        user.password = password.to_string();
        Ok(AuthUser {
            id: user.id.clone(),
            email: Some(user.email.clone()),
        })
    }

    fn invite_by_email(
        &self,
        email: &str,
        metadata: Value,
        _redirect_to: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        {
            let inner = self.inner.lock().unwrap();
            if let Some(msg) = &inner.invite_failure {
                return Err(AuthError::Remote(msg.clone()));
            }
        }
        self.create_user(email, "", metadata)
    }

    fn generate_link(
        &self,
        kind: LinkKind,
        email: &str,
        _redirect_to: Option<&str>,
    ) -> Result<String, AuthError> {
        let inner = self.inner.lock().unwrap();
        if let Some(msg) = &inner.link_failure {
            return Err(AuthError::Remote(msg.clone()));
        }
        Ok(format!(
            "https://auth.example.test/verify?type={}&email={email}",
            kind.as_str()
        ))
    }
}
