//! Store abstraction layer
//!
//! Trait-based access to the hospital tables, so the workflow runs unchanged
//! on PostgreSQL or the in-memory backend.

pub mod factory;
pub mod traits;

pub use factory::create_store;
pub use traits::{HospitalStore, StoreTransaction};
