//! PostgreSQL store backend
//!
//! Workflow transactions run at the configured isolation level and lock the
//! rows they read with `SELECT ... FOR UPDATE`.

pub mod client;
pub mod models;
pub mod store;

pub use client::{redact_connection_string, PostgreSQLClient};
pub use store::PostgreSQLStore;
