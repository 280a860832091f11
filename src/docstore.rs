//! Optional document-store bridge (`db.ping` / `db.findOne` /
//! `db.insertOne`). Off unless explicitly enabled, matching the desktop
//! shell's opt-in Mongo connection; the daemon holds one client for its
//! process lifetime.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocStoreError {
    #[error("document store is not available: {0}")]
    Unavailable(String),
    #[error("document store error: {0}")]
    Remote(String),
}

pub trait DocStore: Send + Sync {
    fn ping(&self) -> Result<Value, DocStoreError>;
    fn find_one(&self, collection: &str, filter: &Value) -> Result<Option<Value>, DocStoreError>;
    fn insert_one(&self, collection: &str, document: &Value) -> Result<Value, DocStoreError>;
}

#[cfg(feature = "mongo")]
pub mod mongo {
    use mongodb::bson::{doc, Document};
    use mongodb::sync::{Client, Database};
    use serde_json::Value;

    use super::{DocStore, DocStoreError};

    pub struct MongoDocStore {
        db: Database,
    }

    impl MongoDocStore {
        pub fn connect(uri: &str, db_name: &str) -> Result<Self, DocStoreError> {
            let client = Client::with_uri_str(uri)
                .map_err(|e| DocStoreError::Unavailable(e.to_string()))?;
            Ok(Self {
                db: client.database(db_name),
            })
        }

        fn to_document(value: &Value) -> Result<Document, DocStoreError> {
            if value.is_null() {
                return Ok(Document::new());
            }
            mongodb::bson::to_document(value).map_err(|e| DocStoreError::Remote(e.to_string()))
        }
    }

    impl DocStore for MongoDocStore {
        fn ping(&self) -> Result<Value, DocStoreError> {
            let reply = self
                .db
                .run_command(doc! { "ping": 1 })
                .run()
                .map_err(|e| DocStoreError::Remote(e.to_string()))?;
            serde_json::to_value(reply).map_err(|e| DocStoreError::Remote(e.to_string()))
        }

        fn find_one(
            &self,
            collection: &str,
            filter: &Value,
        ) -> Result<Option<Value>, DocStoreError> {
            let found = self
                .db
                .collection::<Document>(collection)
                .find_one(Self::to_document(filter)?)
                .run()
                .map_err(|e| DocStoreError::Remote(e.to_string()))?;
            found
                .map(|d| serde_json::to_value(d).map_err(|e| DocStoreError::Remote(e.to_string())))
                .transpose()
        }

        fn insert_one(&self, collection: &str, document: &Value) -> Result<Value, DocStoreError> {
            let result = self
                .db
                .collection::<Document>(collection)
                .insert_one(Self::to_document(document)?)
                .run()
                .map_err(|e| DocStoreError::Remote(e.to_string()))?;
            serde_json::to_value(result.inserted_id)
                .map_err(|e| DocStoreError::Remote(e.to_string()))
        }
    }
}

/// In-memory document store for tests of the `db.*` surface.
#[derive(Default)]
pub struct MemDocStore {
    inner: std::sync::Mutex<std::collections::HashMap<String, Vec<Value>>>,
}

impl MemDocStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocStore for MemDocStore {
    fn ping(&self) -> Result<Value, DocStoreError> {
        Ok(serde_json::json!({ "ok": 1 }))
    }

    fn find_one(&self, collection: &str, filter: &Value) -> Result<Option<Value>, DocStoreError> {
        let inner = self.inner.lock().unwrap();
        let docs = inner.get(collection).cloned().unwrap_or_default();
        let matches = |doc: &Value| {
            filter
                .as_object()
                .map(|f| f.iter().all(|(k, v)| doc.get(k) == Some(v)))
                .unwrap_or(true)
        };
        Ok(docs.into_iter().find(matches))
    }

    fn insert_one(&self, collection: &str, document: &Value) -> Result<Value, DocStoreError> {
        let mut inner = self.inner.lock().unwrap();
        let docs = inner.entry(collection.to_string()).or_default();
        let id = Value::from(format!("doc-{}", docs.len() + 1));
        let mut stored = document.clone();
        if let Some(obj) = stored.as_object_mut() {
            obj.entry("_id".to_string()).or_insert(id.clone());
        }
        docs.push(stored);
        Ok(id)
    }
}
