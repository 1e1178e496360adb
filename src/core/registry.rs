//! Patient registration and lookup

use crate::adapters::database::traits::HospitalStore;
use crate::domain::{
    EntityKind, NewPatient, Patient, PatientCensus, PatientDetails, PatientId, Result,
    WardlineError,
};
use chrono::{SubsecRound, Utc};
use std::sync::Arc;

/// Front-desk patient registry
pub struct PatientRegistry {
    store: Arc<dyn HospitalStore>,
}

impl PatientRegistry {
    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        Self { store }
    }

    /// Register a new patient
    ///
    /// `NewPatient` is already validated, and can only carry the Active or
    /// Waiting status.
    pub async fn register(&self, patient: NewPatient) -> Result<Patient> {
        let patient = self
            .store
            .insert_patient(&patient, Utc::now().trunc_subsecs(6))
            .await?;

        tracing::info!(
            patient_id = %patient.id,
            status = %patient.status,
            "Patient registered"
        );
        Ok(patient)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the patient does not exist.
    pub async fn get(&self, patient_id: PatientId) -> Result<Patient> {
        self.store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| WardlineError::not_found(EntityKind::Patient, patient_id))
    }

    /// Replace a patient's demographics
    ///
    /// The status is untouched, so an admitted patient stays admitted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the patient does not exist.
    pub async fn update(&self, patient_id: PatientId, details: PatientDetails) -> Result<Patient> {
        let patient = self
            .store
            .update_patient(patient_id, &details)
            .await?
            .ok_or_else(|| WardlineError::not_found(EntityKind::Patient, patient_id))?;

        tracing::info!(patient_id = %patient.id, "Patient details updated");
        Ok(patient)
    }

    /// All patients ordered by name
    pub async fn list(&self) -> Result<Vec<Patient>> {
        self.store.list_patients().await
    }

    /// Patient counts per status
    pub async fn census(&self) -> Result<PatientCensus> {
        let patients = self.store.list_patients().await?;
        Ok(PatientCensus::from_patients(&patients))
    }
}
