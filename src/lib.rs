//! Data sidecar for the SchoolHub desktop app.
//!
//! The binary speaks newline-delimited JSON on stdin/stdout; everything else
//! lives here so tests can drive the IPC surface against in-memory stores.

pub mod auth;
pub mod config;
pub mod docstore;
pub mod drift;
pub mod fallback;
pub mod ipc;
pub mod model;
pub mod router;
pub mod services;
pub mod store;
