//! Migrate command implementation

use super::{connect_or_exit, load_or_exit};
use clap::Args;

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {}

impl MigrateArgs {
    /// Execute the migrate command
    ///
    /// The schema script is idempotent, so running it against an existing
    /// database is safe.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Applying schema");
        println!("🛠️  Applying Wardline schema");
        println!();

        let config = match load_or_exit(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let store = match connect_or_exit(&config).await {
            Ok(store) => store,
            Err(code) => return Ok(code),
        };

        match store.ensure_schema().await {
            Ok(()) => {
                println!("✅ Schema is up to date ({})", store.backend_name());
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Schema migration failed");
                println!("❌ Failed to apply schema");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }
}
