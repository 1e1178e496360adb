//! Configuration management for Wardline.
//!
//! # Overview
//!
//! Wardline reads a single TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `WARDLINE_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wardline::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("wardline.toml")?;
//! println!("Bind address: {}", config.server.bind_address);
//! println!("Store: {:?}", config.database_target);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ServerConfig`] - Bind address, request timeout, CORS
//! - [`PostgreSQLConfig`] - Connection pool and transaction isolation
//! - [`AdmissionConfig`] - Discharge behaviour
//! - [`AuthConfig`] - Static bearer tokens and their roles
//! - [`LoggingConfig`] - Local log files
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//! database_target = "postgresql"
//!
//! [server]
//! bind_address = "0.0.0.0:8080"
//!
//! [postgresql]
//! connection_string = "${WARDLINE_DATABASE_URL}"
//! max_connections = 10
//!
//! [admission]
//! post_discharge_status = "Active"
//!
//! [[auth.tokens]]
//! name = "front-desk"
//! token = "${WARDLINE_FRONT_DESK_TOKEN}"
//! role = "front_desk"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    AdmissionConfig, ApplicationConfig, AuthConfig, DatabaseTarget, Environment, LoggingConfig,
    PostgreSQLConfig, Role, ServerConfig, TokenConfig, WardlineConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
