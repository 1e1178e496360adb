//! In-memory store backend
//!
//! Used by `database_target = "memory"` for local development, and by the
//! workflow tests. Data does not survive a restart.

pub mod store;

pub use store::{FailurePoint, MemoryStore};
