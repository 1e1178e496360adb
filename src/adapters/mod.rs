//! Persistence backends for Wardline.
//!
//! - [`database`] - Store traits and the factory that picks a backend
//! - [`postgresql`] - PostgreSQL implementation
//! - [`memory`] - In-process implementation for development and tests
//!
//! # Example
//!
//! ```rust,no_run
//! use wardline::adapters::database::create_store;
//! use wardline::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("wardline.toml")?;
//! let store = create_store(&config).await?;
//! store.test_connection().await?;
//! store.ensure_schema().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
