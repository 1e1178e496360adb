//! Store abstraction traits
//!
//! Backends implement [`HospitalStore`] for plain reads and inserts and hand
//! out a [`StoreTransaction`] for every multi-row change. Workflow code never
//! writes to two tables outside a transaction.

use crate::domain::{
    Admission, AdmissionId, AdmissionStatus, Bed, BedFilter, BedId, BedStatus, NewAdmission,
    NewBed, NewPatient, Patient, PatientDetails, PatientId, PatientStatus, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The persistent store holding the patients, beds and admissions tables
#[async_trait]
pub trait HospitalStore: Send + Sync {
    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Create tables, constraints and indexes if they don't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    async fn ensure_schema(&self) -> Result<()>;

    /// Open a transaction
    ///
    /// Rows read through the transaction are locked until it commits or
    /// rolls back. Dropping it without committing rolls it back.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the transaction
    /// cannot be started.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>>;

    /// All patients ordered by name
    async fn list_patients(&self) -> Result<Vec<Patient>>;

    async fn insert_patient(
        &self,
        patient: &NewPatient,
        registered_at: DateTime<Utc>,
    ) -> Result<Patient>;

    /// Replace a patient's demographics, leaving the status alone
    ///
    /// Returns `None` if the patient does not exist.
    async fn update_patient(
        &self,
        id: PatientId,
        details: &PatientDetails,
    ) -> Result<Option<Patient>>;

    async fn get_bed(&self, id: BedId) -> Result<Option<Bed>>;

    /// Beds matching `filter`, ordered by bed number
    async fn list_beds(&self, filter: &BedFilter) -> Result<Vec<Bed>>;

    async fn insert_bed(&self, bed: &NewBed) -> Result<Bed>;

    async fn get_admission(&self, id: AdmissionId) -> Result<Option<Admission>>;

    /// A patient's admissions, newest first
    async fn list_admissions_by_patient(&self, patient_id: PatientId) -> Result<Vec<Admission>>;

    /// Admissions with the given status (all when `None`), newest first
    async fn list_admissions(&self, status: Option<AdmissionStatus>) -> Result<Vec<Admission>>;

    /// Short backend name for logs and `status` output
    fn backend_name(&self) -> &'static str;
}

/// An open store transaction
///
/// The `*_for_update` reads lock the returned row for the rest of the
/// transaction.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn patient_for_update(&mut self, id: PatientId) -> Result<Option<Patient>>;

    async fn bed_for_update(&mut self, id: BedId) -> Result<Option<Bed>>;

    async fn admission_for_update(&mut self, id: AdmissionId) -> Result<Option<Admission>>;

    /// The patient's Active admission, if any
    async fn active_admission_for_patient(
        &mut self,
        patient_id: PatientId,
    ) -> Result<Option<Admission>>;

    async fn insert_admission(&mut self, admission: &NewAdmission) -> Result<Admission>;

    /// Marks an admission Discharged at `discharge_date`
    async fn close_admission(
        &mut self,
        id: AdmissionId,
        discharge_date: DateTime<Utc>,
    ) -> Result<()>;

    /// Sets a bed's status and occupant together
    async fn set_bed_state(
        &mut self,
        id: BedId,
        status: BedStatus,
        patient_id: Option<PatientId>,
    ) -> Result<()>;

    async fn set_patient_status(&mut self, id: PatientId, status: PatientStatus) -> Result<()>;

    /// Make every write of this transaction visible
    ///
    /// # Errors
    ///
    /// Returns `Conflict(ConcurrentUpdate)` if the store aborted the
    /// transaction in favour of a concurrent one, or `Database` otherwise.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every write of this transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}
