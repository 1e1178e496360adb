//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, Environment, WardlineConfig};
use super::secret::secret_string;
use crate::domain::errors::WardlineError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into WardlineConfig
/// 4. Applies environment variable overrides (WARDLINE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`WardlineError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails or a value is
/// invalid.
///
/// # Examples
///
/// ```no_run
/// use wardline::config::load_config;
///
/// let config = load_config("wardline.toml").expect("Failed to load config");
/// println!("Serving on {}", config.server.bind_address);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<WardlineConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(WardlineError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        WardlineError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses, overrides and validates configuration text
///
/// # Errors
///
/// Same as [`load_config`], minus the file access errors.
pub fn parse_config(contents: &str) -> Result<WardlineConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: WardlineConfig = toml::from_str(&contents)
        .map_err(|e| WardlineError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        WardlineError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap_or_else(|_| unreachable!())
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for (index, line) in input.lines().enumerate() {
        if index > 0 {
            result.push('\n');
        }

        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(WardlineError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        WardlineError::Configuration(format!("{name} has an invalid value '{value}'"))
    })
}

/// Applies environment variable overrides using the WARDLINE_* prefix
///
/// Variables follow the pattern `WARDLINE_<SECTION>_<KEY>`, for example
/// `WARDLINE_SERVER_BIND_ADDRESS` or `WARDLINE_POSTGRESQL_CONNECTION_STRING`.
/// A malformed numeric or boolean override is a configuration error.
fn apply_env_overrides(config: &mut WardlineConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("WARDLINE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("WARDLINE_ENVIRONMENT") {
        config.environment = match val.trim().to_ascii_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(WardlineError::Configuration(format!(
                    "WARDLINE_ENVIRONMENT has an invalid value '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("WARDLINE_DATABASE_TARGET") {
        config.database_target = match val.trim().to_ascii_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(WardlineError::Configuration(format!(
                    "WARDLINE_DATABASE_TARGET has an invalid value '{other}'"
                )))
            }
        };
    }

    // Server overrides
    if let Ok(val) = std::env::var("WARDLINE_SERVER_BIND_ADDRESS") {
        config.server.bind_address = val;
    }
    if let Ok(val) = std::env::var("WARDLINE_SERVER_REQUEST_TIMEOUT_SECONDS") {
        config.server.request_timeout_seconds =
            parse_env("WARDLINE_SERVER_REQUEST_TIMEOUT_SECONDS", &val)?;
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("WARDLINE_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("WARDLINE_POSTGRESQL_MAX_CONNECTIONS") {
            pg_config.max_connections = parse_env("WARDLINE_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Ok(val) = std::env::var("WARDLINE_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS") {
            pg_config.statement_timeout_seconds =
                parse_env("WARDLINE_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS", &val)?;
        }
        if let Ok(val) = std::env::var("WARDLINE_POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
        if let Ok(val) = std::env::var("WARDLINE_POSTGRESQL_ISOLATION_LEVEL") {
            pg_config.isolation_level = val;
        }
    }

    // Admission overrides
    if let Ok(val) = std::env::var("WARDLINE_ADMISSION_POST_DISCHARGE_STATUS") {
        config.admission.post_discharge_status = val
            .parse()
            .map_err(|e: String| WardlineError::Configuration(e))?;
    }

    // Auth overrides
    if let Ok(val) = std::env::var("WARDLINE_AUTH_ENABLED") {
        config.auth.enabled = parse_env("WARDLINE_AUTH_ENABLED", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("WARDLINE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("WARDLINE_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("WARDLINE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
