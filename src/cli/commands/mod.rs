//! CLI command implementations

pub mod init;
pub mod migrate;
pub mod serve;
pub mod status;
pub mod validate;

use crate::adapters::database::{create_store, HospitalStore};
use crate::config::{load_config, WardlineConfig};
use std::sync::Arc;

/// Load the configuration, printing the failure
///
/// `Err` carries the exit code to return.
pub(crate) fn load_or_exit(config_path: &str) -> Result<WardlineConfig, i32> {
    load_config(config_path).map_err(|e| {
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        2 // Configuration error exit code
    })
}

/// Open the configured store and check it is reachable, printing the failure
///
/// `Err` carries the exit code to return.
pub(crate) async fn connect_or_exit(
    config: &WardlineConfig,
) -> Result<Arc<dyn HospitalStore>, i32> {
    let store = match create_store(config).await {
        Ok(store) => store,
        Err(e) => {
            println!("❌ Failed to create database client");
            println!("   Error: {e}");
            return Err(4); // Connection error exit code
        }
    };

    if let Err(e) = store.test_connection().await {
        println!("❌ Failed to connect to database");
        println!("   Error: {e}");
        return Err(4);
    }
    Ok(store)
}
