//! In-process store
//!
//! All tables live behind one `tokio::sync::Mutex`. A transaction holds the
//! lock from `begin` until it commits or is dropped, and edits a private copy
//! of the tables that replaces the live copy on commit. Transactions are
//! therefore fully serialized and a rolled-back one leaves no trace.

use crate::adapters::database::traits::{HospitalStore, StoreTransaction};
use crate::domain::{
    Admission, AdmissionId, AdmissionStatus, Bed, BedFilter, BedId, BedStatus, ConflictKind,
    EntityKind, NewAdmission, NewBed, NewPatient, Patient, PatientDetails, PatientId,
    PatientStatus, Result, WardlineError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Transaction step at which an injected failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    InsertAdmission,
    CloseAdmission,
    SetBedState,
    SetPatientStatus,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    patients: BTreeMap<i64, Patient>,
    beds: BTreeMap<i64, Bed>,
    admissions: BTreeMap<i64, Admission>,
    next_patient_id: i64,
    next_bed_id: i64,
    next_admission_id: i64,
    /// Consumed by the next transaction
    fail_at: Option<FailurePoint>,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// In-memory [`HospitalStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next transaction fail with a `Database` error at `point`
    ///
    /// The failure fires once. Writes made earlier in that transaction are
    /// discarded with it.
    pub async fn inject_failure(&self, point: FailurePoint) {
        self.tables.lock().await.fail_at = Some(point);
    }
}

fn to_id<T: TryFrom<i64, Error = String>>(raw: i64) -> Result<T> {
    T::try_from(raw).map_err(WardlineError::Database)
}

fn sort_newest_first(admissions: &mut [Admission]) {
    admissions.sort_by(|a, b| {
        b.admission_date
            .cmp(&a.admission_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl HospitalStore for MemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let mut guard = self.tables.clone().lock_owned().await;
        let fail_at = guard.fail_at.take();
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            fail_at,
        }))
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        Ok(self.tables.lock().await.patients.get(&id.get()).cloned())
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let mut patients: Vec<Patient> =
            self.tables.lock().await.patients.values().cloned().collect();
        patients.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(patients)
    }

    async fn insert_patient(
        &self,
        patient: &NewPatient,
        registered_at: DateTime<Utc>,
    ) -> Result<Patient> {
        let mut tables = self.tables.lock().await;
        let id = to_id(Tables::next_id(&mut tables.next_patient_id))?;
        let row = Patient {
            id,
            name: patient.name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            date_of_birth: patient.date_of_birth,
            gender: patient.gender.clone(),
            address: patient.address.clone(),
            status: patient.status,
            registered_at,
        };
        tables.patients.insert(id.get(), row.clone());
        Ok(row)
    }

    async fn update_patient(
        &self,
        id: PatientId,
        details: &PatientDetails,
    ) -> Result<Option<Patient>> {
        let mut tables = self.tables.lock().await;
        let Some(patient) = tables.patients.get_mut(&id.get()) else {
            return Ok(None);
        };
        patient.name = details.name.clone();
        patient.email = details.email.clone();
        patient.phone = details.phone.clone();
        patient.date_of_birth = details.date_of_birth;
        patient.gender = details.gender.clone();
        patient.address = details.address.clone();
        Ok(Some(patient.clone()))
    }

    async fn get_bed(&self, id: BedId) -> Result<Option<Bed>> {
        Ok(self.tables.lock().await.beds.get(&id.get()).cloned())
    }

    async fn list_beds(&self, filter: &BedFilter) -> Result<Vec<Bed>> {
        let mut beds: Vec<Bed> = self
            .tables
            .lock()
            .await
            .beds
            .values()
            .filter(|bed| filter.matches(bed))
            .cloned()
            .collect();
        beds.sort_by(|a, b| a.bed_number.cmp(&b.bed_number).then_with(|| a.id.cmp(&b.id)));
        Ok(beds)
    }

    async fn insert_bed(&self, bed: &NewBed) -> Result<Bed> {
        let mut tables = self.tables.lock().await;
        if tables.beds.values().any(|b| b.bed_number == bed.bed_number) {
            return Err(WardlineError::Validation(format!(
                "bed_number '{}' already exists",
                bed.bed_number
            )));
        }
        let id = to_id(Tables::next_id(&mut tables.next_bed_id))?;
        let row = Bed {
            id,
            bed_number: bed.bed_number.clone(),
            ward: bed.ward.clone(),
            status: bed.status,
            patient_id: None,
        };
        tables.beds.insert(id.get(), row.clone());
        Ok(row)
    }

    async fn get_admission(&self, id: AdmissionId) -> Result<Option<Admission>> {
        Ok(self.tables.lock().await.admissions.get(&id.get()).cloned())
    }

    async fn list_admissions_by_patient(&self, patient_id: PatientId) -> Result<Vec<Admission>> {
        let mut admissions: Vec<Admission> = self
            .tables
            .lock()
            .await
            .admissions
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        sort_newest_first(&mut admissions);
        Ok(admissions)
    }

    async fn list_admissions(&self, status: Option<AdmissionStatus>) -> Result<Vec<Admission>> {
        let mut admissions: Vec<Admission> = self
            .tables
            .lock()
            .await
            .admissions
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        sort_newest_first(&mut admissions);
        Ok(admissions)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Transaction over a private copy of the tables
struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    fail_at: Option<FailurePoint>,
}

impl MemoryTransaction {
    fn check_failure(&mut self, point: FailurePoint) -> Result<()> {
        if self.fail_at == Some(point) {
            self.fail_at = None;
            tracing::debug!(?point, "Injected store failure");
            return Err(WardlineError::Database(format!(
                "injected failure at {point:?}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn patient_for_update(&mut self, id: PatientId) -> Result<Option<Patient>> {
        Ok(self.working.patients.get(&id.get()).cloned())
    }

    async fn bed_for_update(&mut self, id: BedId) -> Result<Option<Bed>> {
        Ok(self.working.beds.get(&id.get()).cloned())
    }

    async fn admission_for_update(&mut self, id: AdmissionId) -> Result<Option<Admission>> {
        Ok(self.working.admissions.get(&id.get()).cloned())
    }

    async fn active_admission_for_patient(
        &mut self,
        patient_id: PatientId,
    ) -> Result<Option<Admission>> {
        Ok(self
            .working
            .admissions
            .values()
            .find(|a| a.patient_id == patient_id && a.is_active())
            .cloned())
    }

    async fn insert_admission(&mut self, admission: &NewAdmission) -> Result<Admission> {
        self.check_failure(FailurePoint::InsertAdmission)?;

        // Same guarantee as the partial unique indexes on the SQL schema
        if self.working.admissions.values().any(|a| {
            a.is_active() && (a.patient_id == admission.patient_id || a.bed_id == admission.bed_id)
        }) {
            return Err(ConflictKind::ConcurrentUpdate.into());
        }

        let id = to_id(Tables::next_id(&mut self.working.next_admission_id))?;
        let row = Admission {
            id,
            patient_id: admission.patient_id,
            bed_id: admission.bed_id,
            doctor_id: admission.doctor_id,
            admission_date: admission.admission_date,
            discharge_date: None,
            diagnosis: admission.diagnosis.clone(),
            status: AdmissionStatus::Active,
        };
        self.working.admissions.insert(id.get(), row.clone());
        Ok(row)
    }

    async fn close_admission(
        &mut self,
        id: AdmissionId,
        discharge_date: DateTime<Utc>,
    ) -> Result<()> {
        self.check_failure(FailurePoint::CloseAdmission)?;
        let admission = self
            .working
            .admissions
            .get_mut(&id.get())
            .ok_or_else(|| WardlineError::not_found(EntityKind::Admission, id))?;
        admission.discharge(discharge_date)
    }

    async fn set_bed_state(
        &mut self,
        id: BedId,
        status: BedStatus,
        patient_id: Option<PatientId>,
    ) -> Result<()> {
        self.check_failure(FailurePoint::SetBedState)?;
        if (status == BedStatus::Occupied) != patient_id.is_some() {
            return Err(WardlineError::Database(format!(
                "bed {id}: patient_id must be set exactly when status is Occupied"
            )));
        }
        let bed = self
            .working
            .beds
            .get_mut(&id.get())
            .ok_or_else(|| WardlineError::not_found(EntityKind::Bed, id))?;
        bed.status = status;
        bed.patient_id = patient_id;
        Ok(())
    }

    async fn set_patient_status(&mut self, id: PatientId, status: PatientStatus) -> Result<()> {
        self.check_failure(FailurePoint::SetPatientStatus)?;
        let patient = self
            .working
            .patients
            .get_mut(&id.get())
            .ok_or_else(|| WardlineError::not_found(EntityKind::Patient, id))?;
        patient.status = status;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        this.check_failure(FailurePoint::Commit)?;
        let MemoryTransaction {
            mut guard, working, ..
        } = this;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, Patient, Bed) {
        let store = MemoryStore::new();
        let patient = store
            .insert_patient(
                &NewPatient::builder().name("Ada Obi").build().unwrap(),
                Utc::now(),
            )
            .await
            .unwrap();
        let bed = store
            .insert_bed(&NewBed::new("B-001", "General", BedStatus::Available).unwrap())
            .await
            .unwrap();
        (store, patient, bed)
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let (store, patient, bed) = seeded().await;

        let mut tx = store.begin().await.unwrap();
        tx.set_bed_state(bed.id, BedStatus::Occupied, Some(patient.id))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let bed = store.get_bed(bed.id).await.unwrap().unwrap();
        assert_eq!(bed.status, BedStatus::Occupied);
        assert_eq!(bed.patient_id, Some(patient.id));
    }

    #[tokio::test]
    async fn test_drop_discards_writes() {
        let (store, patient, _) = seeded().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_patient_status(patient.id, PatientStatus::Admitted)
                .await
                .unwrap();
        }

        let patient = store.get_patient(patient.id).await.unwrap().unwrap();
        assert_eq!(patient.status, PatientStatus::Waiting);
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let (store, patient, _) = seeded().await;
        store.inject_failure(FailurePoint::SetPatientStatus).await;

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .set_patient_status(patient.id, PatientStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, WardlineError::Database(_)));
        tx.rollback().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.set_patient_status(patient.id, PatientStatus::Active)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_bed_state_requires_matching_occupant() {
        let (store, patient, bed) = seeded().await;

        let mut tx = store.begin().await.unwrap();
        assert!(tx
            .set_bed_state(bed.id, BedStatus::Occupied, None)
            .await
            .is_err());
        assert!(tx
            .set_bed_state(bed.id, BedStatus::Reserved, Some(patient.id))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_second_active_admission_rejected() {
        let (store, patient, bed) = seeded().await;
        let new_admission = NewAdmission {
            patient_id: patient.id,
            bed_id: bed.id,
            doctor_id: crate::domain::DoctorId::new(2).unwrap(),
            diagnosis: "flu".to_string(),
            admission_date: Utc::now(),
        };

        let mut tx = store.begin().await.unwrap();
        tx.insert_admission(&new_admission).await.unwrap();
        let err = tx.insert_admission(&new_admission).await.unwrap_err();
        assert!(matches!(
            err,
            WardlineError::Conflict(ConflictKind::ConcurrentUpdate)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_bed_number_rejected() {
        let (store, _, _) = seeded().await;
        let result = store
            .insert_bed(&NewBed::new("B-001", "ICU", BedStatus::Available).unwrap())
            .await;
        assert!(matches!(result, Err(WardlineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_patients_sorted_by_name() {
        let store = MemoryStore::new();
        for name in ["Zainab", "Bola", "Musa"] {
            store
                .insert_patient(&NewPatient::builder().name(name).build().unwrap(), Utc::now())
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .list_patients()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Bola", "Musa", "Zainab"]);
    }
}
