use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use schoolhubd::auth::{AuthBridge, EdgeFunctions, GoTrueAdmin};
use schoolhubd::config::Config;
use schoolhubd::docstore::DocStore;
use schoolhubd::fallback::SampleData;
use schoolhubd::ipc::{self, AppState, Request};
use schoolhubd::router::ClientRouter;
use schoolhubd::services::Services;
use schoolhubd::store::{PostgrestClient, TableStore};

fn build_state(config: Config) -> Result<AppState> {
    let privileged: Option<Arc<dyn TableStore>> =
        match (&config.supabase_url, &config.service_role_key) {
            (Some(url), Some(key)) => Some(Arc::new(PostgrestClient::new(url, key, "service-role")?)),
            _ => None,
        };
    let direct: Option<Arc<dyn TableStore>> = match (&config.supabase_url, &config.anon_key) {
        (Some(url), Some(key)) => Some(Arc::new(PostgrestClient::new(url, key, "anon")?)),
        _ => None,
    };
    let router = ClientRouter::new(privileged, direct);

    let admin = match (&config.supabase_url, &config.service_role_key) {
        (Some(url), Some(key)) => {
            Some(Arc::new(GoTrueAdmin::new(url, key)?) as Arc<dyn schoolhubd::auth::AuthAdmin>)
        }
        _ => None,
    };
    let functions = match (&config.supabase_url, &config.anon_key) {
        (Some(url), Some(key)) => Some(EdgeFunctions::new(url, key)?),
        _ => None,
    };

    let docs = open_doc_store(&config);

    let samples = Arc::new(SampleData::new());
    let services = Services::new(router.clone(), samples, admin.clone());
    let auth = AuthBridge::new(admin, functions, router, config.redirect_to.clone());

    Ok(AppState {
        services,
        auth,
        docs,
        config,
    })
}

#[cfg(feature = "mongo")]
fn open_doc_store(config: &Config) -> Option<Arc<dyn DocStore>> {
    if !config.enable_mongo {
        return None;
    }
    match schoolhubd::docstore::mongo::MongoDocStore::connect(&config.mongo_uri, &config.mongo_db) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!("document store enabled but unreachable: {e}");
            None
        }
    }
}

#[cfg(not(feature = "mongo"))]
fn open_doc_store(config: &Config) -> Option<Arc<dyn DocStore>> {
    if config.enable_mongo {
        warn!("ENABLE_MONGO is set but this build has no document store support");
    }
    None
}

fn main() -> Result<()> {
    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env();
    info!(
        privileged = config.has_privileged(),
        direct = config.has_direct(),
        "starting"
    );
    let state = build_state(config)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply with an id we never parsed.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    Ok(())
}
