//! Validate config command implementation
//!
//! Loads the configuration file (which also validates it) and prints a
//! summary with every secret redacted.

use super::load_or_exit;
use crate::adapters::postgresql::redact_connection_string;
use crate::config::{DatabaseTarget, WardlineConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_or_exit(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };

        println!("✅ Configuration is valid");
        println!();
        print!("{}", summary(&config));
        println!();
        Ok(0)
    }
}

fn summary(config: &WardlineConfig) -> String {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Environment: {:?}", config.environment),
        format!("  Log Level: {}", config.application.log_level),
        format!("  Bind Address: {}", config.server.bind_address),
        format!(
            "  Request Timeout: {}s",
            config.server.request_timeout_seconds
        ),
    ];

    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            lines.push("  Database Target: PostgreSQL".to_string());
            if let Some(pg) = &config.postgresql {
                lines.push(format!(
                    "  PostgreSQL Connection: {}",
                    redact_connection_string(pg.connection_string.expose_secret().as_str())
                ));
                lines.push(format!("  Max Connections: {}", pg.max_connections));
                lines.push(format!("  SSL Mode: {}", pg.ssl_mode));
                lines.push(format!("  Isolation Level: {}", pg.isolation_level));
            }
        }
        DatabaseTarget::Memory => {
            lines.push("  Database Target: Memory (data is lost on restart)".to_string());
        }
    }

    lines.push(format!(
        "  Post-discharge Status: {}",
        config.admission.post_discharge_status
    ));
    if config.auth.enabled {
        let tokens = config
            .auth
            .tokens
            .iter()
            .map(|t| format!("{} ({})", t.name, t.role))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  API Tokens: {tokens}"));
    } else {
        lines.push("  API Authentication: DISABLED".to_string());
    }
    lines.push(format!(
        "  File Logging: {}",
        if config.logging.local_enabled {
            config.logging.local_path.as_str()
        } else {
            "off"
        }
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
