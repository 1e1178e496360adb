// Wardline - Hospital administration backend
// Copyright (c) 2026 Wardline Contributors
// Licensed under the MIT License

//! # Wardline - hospital administration backend
//!
//! Wardline keeps the patient register, the bed inventory of every ward, and
//! the admission records that tie the two together, and serves them over an
//! authenticated HTTP JSON API.
//!
//! ## Overview
//!
//! The heart of the crate is the admission workflow. Admitting a patient
//! touches three rows (the patient, the bed and a new admission) and
//! discharging touches the same three again. Each operation is a single
//! store transaction, so a hospital never sees a bed that is occupied
//! without an active admission, or a patient admitted twice.
//!
//! ## Architecture
//!
//! - [`api`] - axum router, bearer-token auth and JSON handlers
//! - [`cli`] - Command-line interface (`serve`, `migrate`, `status`, ...)
//! - [`core`] - Admission workflow, patient registry and ward management
//! - [`adapters`] - Store backends (PostgreSQL, in-memory)
//! - [`domain`] - Identifiers, models and the error type
//! - [`config`] - TOML configuration with environment overrides
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wardline::adapters::database::create_store;
//! use wardline::config::load_config;
//! use wardline::core::AdmissionManager;
//! use wardline::domain::{AdmitCommand, BedId, DoctorId, PatientId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("wardline.toml")?;
//!     let store = create_store(&config).await?;
//!     let admissions = AdmissionManager::new(store, &config.admission);
//!
//!     let command = AdmitCommand::new(
//!         PatientId::new(5)?,
//!         DoctorId::new(2)?,
//!         BedId::new(9)?,
//!         "flu",
//!     )?;
//!     let admission = admissions.admit(command).await?;
//!     println!("Admission {} opened", admission.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::WardlineError`]. Workflow precondition
//! failures are [`domain::ConflictKind`] values inside
//! `WardlineError::Conflict`; the API maps them to 409.
//!
//! ```rust,no_run
//! use wardline::domain::{ConflictKind, WardlineError};
//!
//! fn describe(err: &WardlineError) -> &'static str {
//!     match err {
//!         WardlineError::Conflict(ConflictKind::ConcurrentUpdate) => "retry",
//!         WardlineError::Conflict(_) => "rejected",
//!         WardlineError::NotFound { .. } => "unknown id",
//!         _ => "failed",
//!     }
//! }
//! ```

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
