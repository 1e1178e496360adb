//! PostgreSQL client implementation
//!
//! Owns the connection pool. Every pooled connection is opened with the
//! configured `statement_timeout`, so no statement can hold row locks for
//! longer than that.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{Result, WardlineError};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::NoTls;

/// Schema applied by [`PostgreSQLClient::ensure_schema`]
const SCHEMA_SQL: &str = include_str!("../../../migrations/001_initial_schema.sql");

/// PostgreSQL client for Wardline
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// Connections are opened lazily, so this succeeds even when the server
    /// is down. Call [`test_connection`](Self::test_connection) to check.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid, TLS cannot be
    /// set up, or the pool cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_str()
            .parse()
            .map_err(|e| {
                WardlineError::Configuration(format!(
                    "Invalid PostgreSQL connection string: {}",
                    e
                ))
            })?;

        pg_config
            .ssl_mode(pg_ssl_mode(&config.ssl_mode))
            .connect_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .options(&format!(
                "-c statement_timeout={}",
                config.statement_timeout_seconds * 1000
            ));

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.ssl_mode == "disable" {
            Manager::from_config(pg_config, NoTls, manager_config)
        } else {
            Manager::from_config(pg_config, tls_connector(&config.ssl_mode)?, manager_config)
        };

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .build()
            .map_err(|e| {
                WardlineError::Database(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be obtained or `SELECT 1` fails.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| WardlineError::Database(format!("Connection test failed: {}", e)))?;

        tracing::info!(
            target = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Apply the embedded schema
    ///
    /// Every statement is `IF NOT EXISTS`, so this is safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .batch_execute(SCHEMA_SQL)
            .await
            .map_err(|e| WardlineError::Database(format!("Failed to execute migration: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            WardlineError::Database(format!("Failed to get connection from pool: {}", e))
        })
    }

    /// `BEGIN` statement for workflow transactions
    pub fn begin_statement(&self) -> String {
        format!("BEGIN ISOLATION LEVEL {}", self.config.isolation_clause())
    }

    /// Get the connection string (without credentials)
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_str())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn pg_ssl_mode(ssl_mode: &str) -> SslMode {
    match ssl_mode {
        "disable" => SslMode::Disable,
        "allow" | "prefer" => SslMode::Prefer,
        _ => SslMode::Require,
    }
}

/// TLS connector matching libpq's verification rules for `ssl_mode`
fn tls_connector(ssl_mode: &str) -> Result<MakeTlsConnector> {
    let mut builder = native_tls::TlsConnector::builder();
    match ssl_mode {
        "verify-full" => {}
        "verify-ca" => {
            builder.danger_accept_invalid_hostnames(true);
        }
        _ => {
            builder.danger_accept_invalid_certs(true);
        }
    }

    let connector = builder.build().map_err(|e| {
        WardlineError::Configuration(format!("Failed to build TLS connector: {}", e))
    })?;
    Ok(MakeTlsConnector::new(connector))
}

/// Connection string with credentials removed, for display
pub fn redact_connection_string(conn: &str) -> String {
    let without_scheme = match conn
        .strip_prefix("postgresql://")
        .or_else(|| conn.strip_prefix("postgres://"))
    {
        Some(rest) => rest,
        None => return redact_keyword_form(conn),
    };

    match without_scheme.rsplit_once('@') {
        Some((_, host)) => format!("postgresql://***@{}", host),
        None => format!("postgresql://{}", without_scheme),
    }
}

/// `host=db password=x` style strings
fn redact_keyword_form(conn: &str) -> String {
    conn.split_whitespace()
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key.eq_ignore_ascii_case("password") => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
