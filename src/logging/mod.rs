//! Logging and observability
//!
//! Structured logging through `tracing`, plus a few macros that give the
//! workflow events a fixed set of field names so they can be queried from
//! JSON log files.
//!
//! # Example
//!
//! ```no_run
//! use wardline::logging::init_logging;
//! use wardline::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a committed admission
///
/// # Example
///
/// ```no_run
/// use wardline::log_admission;
///
/// log_admission!(12, 5, 9, 2);
/// ```
#[macro_export]
macro_rules! log_admission {
    ($admission_id:expr, $patient_id:expr, $bed_id:expr, $doctor_id:expr) => {
        tracing::info!(
            admission_id = %$admission_id,
            patient_id = %$patient_id,
            bed_id = %$bed_id,
            doctor_id = %$doctor_id,
            "Patient admitted"
        );
    };
}

/// Log a committed discharge
///
/// # Example
///
/// ```no_run
/// use wardline::log_discharge;
///
/// log_discharge!(12, 5, 9, 36);
/// ```
#[macro_export]
macro_rules! log_discharge {
    ($admission_id:expr, $patient_id:expr, $bed_id:expr, $stay_hours:expr) => {
        tracing::info!(
            admission_id = %$admission_id,
            patient_id = %$patient_id,
            bed_id = %$bed_id,
            stay_hours = $stay_hours,
            "Patient discharged"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use wardline::log_error_with_context;
/// use wardline::domain::WardlineError;
///
/// let error = WardlineError::Database("connection reset".to_string());
/// log_error_with_context!(&error, "Failed to commit admission");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
