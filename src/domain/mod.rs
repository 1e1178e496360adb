//! Domain models and types for Wardline.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`BedId`], [`AdmissionId`], [`DoctorId`])
//! - **Domain models** ([`Patient`], [`Bed`], [`Admission`])
//! - **Error types** ([`WardlineError`], [`ConflictKind`], [`EntityKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes, so ids from different tables cannot be mixed:
//!
//! ```rust
//! use wardline::domain::{BedId, PatientId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patient_id = PatientId::new(5)?;
//! let bed_id = BedId::new(9)?;
//!
//! // This won't compile
//! // let wrong: PatientId = bed_id;
//! # Ok(())
//! # }
//! ```
//!
//! # Status vocabularies
//!
//! Each entity has exactly one status enum, serialized with its PascalCase
//! variant name (`"Available"`, `"Admitted"`, ...). The same strings are
//! stored in the database and checked by the schema.

pub mod admission;
pub mod bed;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;
mod text;

// Re-export commonly used types for convenience
pub use admission::{Admission, AdmissionStatus, AdmitCommand, NewAdmission};
pub use bed::{Bed, BedFilter, BedOccupancy, BedStatus, NewBed};
pub use errors::{ConflictKind, EntityKind, WardlineError};
pub use ids::{AdmissionId, BedId, DoctorId, PatientId};
pub use patient::{NewPatient, Patient, PatientCensus, PatientDetails, PatientStatus};
pub use result::Result;
