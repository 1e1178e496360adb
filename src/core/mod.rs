//! Core business logic for Wardline.
//!
//! # Modules
//!
//! - [`admission`] - The admit/discharge workflow, the only code allowed to
//!   change occupancy
//! - [`registry`] - Patient registration and census
//! - [`ward`] - Bed inventory, manual bed status and occupancy
//!
//! Every component takes an `Arc<dyn HospitalStore>`; none of them hold
//! state of their own.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wardline::adapters::memory::MemoryStore;
//! use wardline::config::AdmissionConfig;
//! use wardline::core::{AdmissionManager, PatientRegistry, WardManager};
//! use wardline::domain::{AdmitCommand, BedStatus, DoctorId, NewBed, NewPatient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let registry = PatientRegistry::new(store.clone());
//! let ward = WardManager::new(store.clone());
//! let admissions = AdmissionManager::new(store, &AdmissionConfig::default());
//!
//! let patient = registry
//!     .register(NewPatient::builder().name("Ada Obi").build()?)
//!     .await?;
//! let bed = ward
//!     .add_bed(NewBed::new("B-009", "General", BedStatus::Available)?)
//!     .await?;
//!
//! let command = AdmitCommand::new(patient.id, DoctorId::new(2)?, bed.id, "flu")?;
//! let admission = admissions.admit(command).await?;
//! admissions.discharge(admission.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod admission;
pub mod registry;
pub mod ward;

pub use admission::AdmissionManager;
pub use registry::PatientRegistry;
pub use ward::WardManager;
