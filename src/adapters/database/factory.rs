//! Store factory
//!
//! Builds the configured store backend.

use crate::adapters::database::traits::HospitalStore;
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLStore};
use crate::config::schema::{DatabaseTarget, WardlineConfig};
use crate::domain::{Result, WardlineError};
use std::sync::Arc;

/// Create a store based on the configuration
///
/// # Errors
///
/// Returns an error if the PostgreSQL section is missing or the pool cannot
/// be created.
pub async fn create_store(config: &WardlineConfig) -> Result<Arc<dyn HospitalStore>> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                WardlineError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL store");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            Ok(Arc::new(PostgreSQLStore::new(client)))
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Using in-memory store; all data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
