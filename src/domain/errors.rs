//! Domain error types
//!
//! This module defines the error hierarchy for Wardline. All errors are
//! domain-specific and don't expose third-party types.

use crate::domain::bed::BedStatus;
use std::fmt;
use thiserror::Error;

/// Main Wardline error type
///
/// This is the primary error type used throughout the application. The HTTP
/// layer maps each variant onto a status code, so the variants follow the
/// failure kinds a caller can act on rather than the component that failed.
#[derive(Debug, Error)]
pub enum WardlineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing or malformed input, detected before the store is touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    /// A listing the caller needs was empty (e.g. no bed available)
    #[error("{0}")]
    NothingAvailable(String),

    /// A workflow precondition was violated
    #[error("{0}")]
    Conflict(#[from] ConflictKind),

    /// Transaction or connectivity failure in the persistent store
    #[error("Database error: {0}")]
    Database(String),

    /// Missing or invalid credential
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    /// Authenticated caller lacks the required role
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl WardlineError {
    /// Shorthand for a [`WardlineError::NotFound`]
    pub fn not_found(entity: EntityKind, id: impl Into<i64>) -> Self {
        WardlineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether the caller may retry the same request unchanged
    ///
    /// Store failures (timeouts, dropped connections) and lost serialization
    /// races are transient. Everything else will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WardlineError::Database(_) | WardlineError::Conflict(ConflictKind::ConcurrentUpdate)
        )
    }
}

/// Entity named by a [`WardlineError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Patient,
    Bed,
    Admission,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Patient => "Patient",
            EntityKind::Bed => "Bed",
            EntityKind::Admission => "Admission",
        };
        f.write_str(name)
    }
}

/// Precondition failures of the admission workflow
///
/// Each variant names the entity whose state blocked the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictKind {
    /// The patient already has an active admission
    #[error("Patient already admitted")]
    PatientAlreadyAdmitted,

    /// The bed is not available for admission
    #[error("Bed {bed_id} is not available (status: {status})")]
    BedUnavailable { bed_id: i64, status: BedStatus },

    /// The admission was already closed
    #[error("Admission already discharged")]
    AdmissionAlreadyDischarged,

    /// Occupancy is owned by the admission workflow
    #[error("Bed {bed_id} occupancy can only change through admission or discharge")]
    BedOccupied { bed_id: i64 },

    /// The store rejected the transaction because a concurrent one won
    #[error("Concurrent update detected, please retry")]
    ConcurrentUpdate,
}

// Conversion from std::io::Error
impl From<std::io::Error> for WardlineError {
    fn from(err: std::io::Error) -> Self {
        WardlineError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for WardlineError {
    fn from(err: serde_json::Error) -> Self {
        WardlineError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for WardlineError {
    fn from(err: toml::de::Error) -> Self {
        WardlineError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wardline_error_display() {
        let err = WardlineError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_not_found_display() {
        let err = WardlineError::not_found(EntityKind::Bed, 9);
        assert_eq!(err.to_string(), "Bed 9 not found");
    }

    #[test]
    fn test_conflict_conversion() {
        let err: WardlineError = ConflictKind::PatientAlreadyAdmitted.into();
        assert!(matches!(
            err,
            WardlineError::Conflict(ConflictKind::PatientAlreadyAdmitted)
        ));
        assert_eq!(err.to_string(), "Patient already admitted");
    }

    #[test]
    fn test_bed_unavailable_names_status() {
        let err = ConflictKind::BedUnavailable {
            bed_id: 10,
            status: BedStatus::Maintenance,
        };
        assert_eq!(
            err.to_string(),
            "Bed 10 is not available (status: Maintenance)"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(WardlineError::Database("timeout".to_string()).is_transient());
        assert!(WardlineError::Conflict(ConflictKind::ConcurrentUpdate).is_transient());
        assert!(!WardlineError::Conflict(ConflictKind::PatientAlreadyAdmitted).is_transient());
        assert!(!WardlineError::Validation("x".to_string()).is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: WardlineError = io_err.into();
        assert!(matches!(err, WardlineError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: WardlineError = json_err.into();
        assert!(matches!(err, WardlineError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: WardlineError = toml_err.into();
        assert!(matches!(err, WardlineError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_wardline_error_implements_std_error() {
        let err = WardlineError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
