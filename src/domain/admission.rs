//! Admission domain model
//!
//! One admission row is kept per stay. `discharge_date` is set exactly when
//! `status` is `Discharged`; [`Admission::discharge`] is the only way to make
//! that transition on the in-memory type.

use super::errors::{ConflictKind, WardlineError};
use super::ids::{AdmissionId, BedId, DoctorId, PatientId};
use super::text::check_text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum accepted diagnosis length, in characters
pub const MAX_DIAGNOSIS_LEN: usize = 2000;

/// Admission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdmissionStatus {
    Active,
    Discharged,
}

impl AdmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionStatus::Active => "Active",
            AdmissionStatus::Discharged => "Discharged",
        }
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AdmissionStatus::Active),
            "discharged" => Ok(AdmissionStatus::Discharged),
            _ => Err(format!(
                "Invalid admission status '{}'. Must be one of: Active, Discharged",
                s
            )),
        }
    }
}

/// A patient's recorded stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub id: AdmissionId,
    pub patient_id: PatientId,
    pub bed_id: BedId,
    pub doctor_id: DoctorId,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub diagnosis: String,
    pub status: AdmissionStatus,
}

impl Admission {
    pub fn is_active(&self) -> bool {
        self.status == AdmissionStatus::Active
    }

    /// Closes the stay at `at`
    ///
    /// # Errors
    ///
    /// Returns a conflict if the admission was already discharged.
    pub fn discharge(&mut self, at: DateTime<Utc>) -> Result<(), WardlineError> {
        if !self.is_active() {
            return Err(ConflictKind::AdmissionAlreadyDischarged.into());
        }
        self.status = AdmissionStatus::Discharged;
        self.discharge_date = Some(at);
        Ok(())
    }

    /// Length of stay so far (or in total, once discharged)
    pub fn length_of_stay(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.discharge_date.unwrap_or(now) - self.admission_date
    }
}

/// Validated input for the admit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmitCommand {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub bed_id: BedId,
    pub diagnosis: String,
}

impl AdmitCommand {
    /// Creates a command, normalising and checking the diagnosis text
    ///
    /// # Errors
    ///
    /// Returns an error if the diagnosis is blank, too long or contains NUL.
    pub fn new(
        patient_id: PatientId,
        doctor_id: DoctorId,
        bed_id: BedId,
        diagnosis: impl Into<String>,
    ) -> Result<Self, String> {
        let diagnosis = diagnosis.into().trim().to_string();
        if diagnosis.is_empty() {
            return Err("diagnosis is required".to_string());
        }
        check_text("diagnosis", &diagnosis)?;
        if diagnosis.chars().count() > MAX_DIAGNOSIS_LEN {
            return Err(format!(
                "diagnosis must be at most {MAX_DIAGNOSIS_LEN} characters"
            ));
        }
        Ok(Self {
            patient_id,
            doctor_id,
            bed_id,
            diagnosis,
        })
    }
}

/// Row data for inserting an admission inside a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmission {
    pub patient_id: PatientId,
    pub bed_id: BedId,
    pub doctor_id: DoctorId,
    pub diagnosis: String,
    pub admission_date: DateTime<Utc>,
}

impl NewAdmission {
    pub fn from_command(command: &AdmitCommand, admission_date: DateTime<Utc>) -> Self {
        Self {
            patient_id: command.patient_id,
            bed_id: command.bed_id,
            doctor_id: command.doctor_id,
            diagnosis: command.diagnosis.clone(),
            admission_date,
        }
    }
}
