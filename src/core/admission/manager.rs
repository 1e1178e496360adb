//! Admission workflow manager
//!
//! Admit and discharge are the only operations that move a patient into or
//! out of `Admitted` and a bed into or out of `Occupied`. Each runs as one
//! store transaction over the patient, bed and admission rows:
//!
//! 1. Input is validated and the referenced rows are checked to exist with
//!    plain reads, before any transaction opens.
//! 2. Inside the transaction the rows are locked and the preconditions are
//!    checked again against the locked state.
//! 3. Any failure rolls the transaction back explicitly. Only a fully
//!    successful sequence of writes is committed.
//!
//! Rows are always locked patient before bed, which keeps concurrent admits
//! and discharges from deadlocking each other.

use crate::adapters::database::traits::{HospitalStore, StoreTransaction};
use crate::config::AdmissionConfig;
use crate::domain::{
    Admission, AdmissionId, AdmissionStatus, AdmitCommand, BedStatus, ConflictKind, EntityKind,
    NewAdmission, PatientId, PatientStatus, Result, WardlineError,
};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;

/// Runs the admit/discharge workflow against a [`HospitalStore`]
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wardline::adapters::memory::MemoryStore;
/// use wardline::config::AdmissionConfig;
/// use wardline::core::admission::AdmissionManager;
///
/// let store = Arc::new(MemoryStore::new());
/// let manager = AdmissionManager::new(store, &AdmissionConfig::default());
/// ```
pub struct AdmissionManager {
    store: Arc<dyn HospitalStore>,
    post_discharge_status: PatientStatus,
}

impl AdmissionManager {
    pub fn new(store: Arc<dyn HospitalStore>, config: &AdmissionConfig) -> Self {
        Self {
            store,
            post_discharge_status: config.post_discharge_status,
        }
    }

    /// Admit a patient into a bed
    ///
    /// On success the admission is Active, the bed is Occupied by the
    /// patient and the patient is Admitted.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the patient or bed does not exist
    /// - `Conflict(PatientAlreadyAdmitted)` if the patient has an active admission
    /// - `Conflict(BedUnavailable)` if the bed is not Available
    /// - `Conflict(ConcurrentUpdate)` if a concurrent transaction won a race
    /// - `Database` if the store fails; nothing is written in that case
    pub async fn admit(&self, command: AdmitCommand) -> Result<Admission> {
        if self.store.get_patient(command.patient_id).await?.is_none() {
            return Err(WardlineError::not_found(
                EntityKind::Patient,
                command.patient_id,
            ));
        }
        if self.store.get_bed(command.bed_id).await?.is_none() {
            return Err(WardlineError::not_found(EntityKind::Bed, command.bed_id));
        }

        let mut tx = self.store.begin().await?;
        let admission = match admit_in(tx.as_mut(), &command, now()).await {
            Ok(admission) => admission,
            Err(e) => {
                abort(tx, "admit", &e).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        crate::log_admission!(
            admission.id,
            admission.patient_id,
            admission.bed_id,
            admission.doctor_id
        );
        Ok(admission)
    }

    /// Discharge an active admission
    ///
    /// The bed named by the admission becomes Available with no occupant and
    /// the patient moves to the configured post-discharge status. Returns the
    /// closed admission.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the admission does not exist
    /// - `Conflict(AdmissionAlreadyDischarged)` if it is not Active
    /// - `Conflict(ConcurrentUpdate)` if a concurrent transaction won a race
    /// - `Database` if the store fails; nothing is written in that case
    pub async fn discharge(&self, admission_id: AdmissionId) -> Result<Admission> {
        if self.store.get_admission(admission_id).await?.is_none() {
            return Err(WardlineError::not_found(EntityKind::Admission, admission_id));
        }

        let at = now();
        let mut tx = self.store.begin().await?;
        let admission =
            match discharge_in(tx.as_mut(), admission_id, at, self.post_discharge_status).await {
                Ok(admission) => admission,
                Err(e) => {
                    abort(tx, "discharge", &e).await;
                    return Err(e);
                }
            };
        tx.commit().await?;

        crate::log_discharge!(
            admission.id,
            admission.patient_id,
            admission.bed_id,
            admission
                .length_of_stay(admission.discharge_date.unwrap_or(at))
                .num_hours()
        );
        Ok(admission)
    }

    /// Get one admission
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the admission does not exist.
    pub async fn get(&self, admission_id: AdmissionId) -> Result<Admission> {
        self.store
            .get_admission(admission_id)
            .await?
            .ok_or_else(|| WardlineError::not_found(EntityKind::Admission, admission_id))
    }

    /// A patient's admission history, newest first
    ///
    /// Empty when the patient has no admissions, including when no such
    /// patient is registered.
    pub async fn list_for_patient(&self, patient_id: PatientId) -> Result<Vec<Admission>> {
        self.store.list_admissions_by_patient(patient_id).await
    }

    /// All Active admissions, newest first
    pub async fn list_active(&self) -> Result<Vec<Admission>> {
        self.store
            .list_admissions(Some(AdmissionStatus::Active))
            .await
    }

    /// Admissions with the given status, or all of them, newest first
    pub async fn list(&self, status: Option<AdmissionStatus>) -> Result<Vec<Admission>> {
        self.store.list_admissions(status).await
    }
}

/// Current time at the store's timestamp precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Rolls back after a failed step
///
/// The original error is what the caller sees; a failing rollback is only
/// logged, since the store discards the transaction either way.
async fn abort(tx: Box<dyn StoreTransaction>, operation: &str, cause: &WardlineError) {
    match cause {
        WardlineError::Conflict(kind) => {
            tracing::info!(operation, reason = %kind, "Workflow precondition failed, rolling back");
        }
        WardlineError::Database(_) => {
            crate::log_error_with_context!(cause, operation);
        }
        _ => {
            tracing::debug!(operation, error = %cause, "Rolling back");
        }
    }

    if let Err(e) = tx.rollback().await {
        tracing::warn!(operation, error = %e, "Rollback failed");
    }
}

async fn admit_in(
    tx: &mut dyn StoreTransaction,
    command: &AdmitCommand,
    at: DateTime<Utc>,
) -> Result<Admission> {
    let patient = tx
        .patient_for_update(command.patient_id)
        .await?
        .ok_or_else(|| WardlineError::not_found(EntityKind::Patient, command.patient_id))?;

    if patient.is_admitted()
        || tx
            .active_admission_for_patient(command.patient_id)
            .await?
            .is_some()
    {
        return Err(ConflictKind::PatientAlreadyAdmitted.into());
    }

    let bed = tx
        .bed_for_update(command.bed_id)
        .await?
        .ok_or_else(|| WardlineError::not_found(EntityKind::Bed, command.bed_id))?;

    if !bed.is_available() {
        return Err(ConflictKind::BedUnavailable {
            bed_id: bed.id.get(),
            status: bed.status,
        }
        .into());
    }

    let admission = tx
        .insert_admission(&NewAdmission::from_command(command, at))
        .await?;
    tx.set_bed_state(bed.id, BedStatus::Occupied, Some(patient.id))
        .await?;
    tx.set_patient_status(patient.id, PatientStatus::Admitted)
        .await?;

    Ok(admission)
}

async fn discharge_in(
    tx: &mut dyn StoreTransaction,
    admission_id: AdmissionId,
    at: DateTime<Utc>,
    post_discharge_status: PatientStatus,
) -> Result<Admission> {
    let mut admission = tx
        .admission_for_update(admission_id)
        .await?
        .ok_or_else(|| WardlineError::not_found(EntityKind::Admission, admission_id))?;

    if !admission.is_active() {
        return Err(ConflictKind::AdmissionAlreadyDischarged.into());
    }
    // Never earlier than admission, whatever this instance's clock says
    let at = at.max(admission.admission_date);

    tx.patient_for_update(admission.patient_id)
        .await?
        .ok_or_else(|| WardlineError::not_found(EntityKind::Patient, admission.patient_id))?;
    // Look the bed up through the admission, whatever its current state
    tx.bed_for_update(admission.bed_id)
        .await?
        .ok_or_else(|| WardlineError::not_found(EntityKind::Bed, admission.bed_id))?;

    tx.close_admission(admission.id, at).await?;
    tx.set_bed_state(admission.bed_id, BedStatus::Available, None)
        .await?;
    tx.set_patient_status(admission.patient_id, post_discharge_status)
        .await?;

    admission.discharge(at)?;
    Ok(admission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FailurePoint, MemoryStore};
    use crate::domain::{BedId, DoctorId, NewBed, NewPatient};

    struct Fixture {
        store: MemoryStore,
        manager: AdmissionManager,
        patient_id: PatientId,
        bed_id: BedId,
    }

    async fn fixture(bed_status: BedStatus) -> Fixture {
        let store = MemoryStore::new();
        let patient = store
            .insert_patient(
                &NewPatient::builder().name("Chidi Okafor").build().unwrap(),
                Utc::now(),
            )
            .await
            .unwrap();
        let bed = store
            .insert_bed(&NewBed::new("B-009", "General", bed_status).unwrap())
            .await
            .unwrap();
        let manager = AdmissionManager::new(Arc::new(store.clone()), &AdmissionConfig::default());
        Fixture {
            store,
            manager,
            patient_id: patient.id,
            bed_id: bed.id,
        }
    }

    fn command(patient_id: PatientId, bed_id: BedId) -> AdmitCommand {
        AdmitCommand::new(patient_id, DoctorId::new(2).unwrap(), bed_id, "flu").unwrap()
    }

    #[tokio::test]
    async fn test_admit_updates_all_three_rows() {
        let f = fixture(BedStatus::Available).await;

        let admission = f
            .manager
            .admit(command(f.patient_id, f.bed_id))
            .await
            .unwrap();
        assert!(admission.is_active());
        assert!(admission.discharge_date.is_none());

        let bed = f.store.get_bed(f.bed_id).await.unwrap().unwrap();
        assert_eq!(bed.status, BedStatus::Occupied);
        assert_eq!(bed.patient_id, Some(f.patient_id));

        let patient = f.store.get_patient(f.patient_id).await.unwrap().unwrap();
        assert_eq!(patient.status, PatientStatus::Admitted);
    }

    #[tokio::test]
    async fn test_admit_unknown_bed_is_not_found() {
        let f = fixture(BedStatus::Available).await;
        let err = f
            .manager
            .admit(command(f.patient_id, BedId::new(999).unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WardlineError::NotFound {
                entity: EntityKind::Bed,
                id: 999
            }
        ));
    }

    #[tokio::test]
    async fn test_admit_into_reserved_bed_conflicts() {
        let f = fixture(BedStatus::Reserved).await;
        let err = f
            .manager
            .admit(command(f.patient_id, f.bed_id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WardlineError::Conflict(ConflictKind::BedUnavailable {
                status: BedStatus::Reserved,
                ..
            })
        ));

        let patient = f.store.get_patient(f.patient_id).await.unwrap().unwrap();
        assert_eq!(patient.status, PatientStatus::Waiting);
        assert!(f.manager.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discharge_uses_configured_status() {
        let f = fixture(BedStatus::Available).await;
        let manager = AdmissionManager::new(
            Arc::new(f.store.clone()),
            &AdmissionConfig {
                post_discharge_status: PatientStatus::Discharged,
            },
        );

        let admission = manager.admit(command(f.patient_id, f.bed_id)).await.unwrap();
        let closed = manager.discharge(admission.id).await.unwrap();
        assert_eq!(closed.status, AdmissionStatus::Discharged);
        assert!(closed.discharge_date.is_some());

        let patient = f.store.get_patient(f.patient_id).await.unwrap().unwrap();
        assert_eq!(patient.status, PatientStatus::Discharged);
    }

    #[tokio::test]
    async fn test_discharge_twice_conflicts() {
        let f = fixture(BedStatus::Available).await;
        let admission = f
            .manager
            .admit(command(f.patient_id, f.bed_id))
            .await
            .unwrap();
        f.manager.discharge(admission.id).await.unwrap();

        let err = f.manager.discharge(admission.id).await.unwrap_err();
        assert!(matches!(
            err,
            WardlineError::Conflict(ConflictKind::AdmissionAlreadyDischarged)
        ));
    }

    #[tokio::test]
    async fn test_failed_bed_update_rolls_back_admit() {
        let f = fixture(BedStatus::Available).await;
        f.store.inject_failure(FailurePoint::SetBedState).await;

        let err = f
            .manager
            .admit(command(f.patient_id, f.bed_id))
            .await
            .unwrap_err();
        assert!(matches!(err, WardlineError::Database(_)));

        assert!(f.manager.list(None).await.unwrap().is_empty());
        let bed = f.store.get_bed(f.bed_id).await.unwrap().unwrap();
        assert_eq!(bed.status, BedStatus::Available);
    }

    #[tokio::test]
    async fn test_list_for_unknown_patient_is_empty() {
        let f = fixture(BedStatus::Available).await;
        let history = f
            .manager
            .list_for_patient(PatientId::new(404).unwrap())
            .await
            .unwrap();
        assert!(history.is_empty());

        let history = f.manager.list_for_patient(f.patient_id).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_discharge_never_precedes_admission() {
        let f = fixture(BedStatus::Available).await;
        // Admitted by an instance whose clock runs ahead
        let admitted_at = now() + chrono::Duration::hours(1);
        let mut tx = f.store.begin().await.unwrap();
        let seeded = tx
            .insert_admission(&NewAdmission::from_command(
                &command(f.patient_id, f.bed_id),
                admitted_at,
            ))
            .await
            .unwrap();
        tx.set_bed_state(f.bed_id, BedStatus::Occupied, Some(f.patient_id))
            .await
            .unwrap();
        tx.set_patient_status(f.patient_id, PatientStatus::Admitted)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let closed = f.manager.discharge(seeded.id).await.unwrap();
        assert_eq!(closed.discharge_date, Some(admitted_at));
        let stored = f.store.get_admission(seeded.id).await.unwrap().unwrap();
        assert_eq!(stored.discharge_date, Some(admitted_at));
    }
}
