//! PostgreSQL store integration tests
//!
//! Ignored by default. Run against a scratch database with:
//!
//! ```text
//! WARDLINE_TEST_DATABASE_URL=postgresql://wardline:pw@localhost/wardline_test \
//!     cargo test --test postgres_store_test -- --ignored
//! ```
//!
//! Rows are never deleted; every test creates its own patients and
//! uniquely-numbered beds.

use std::sync::Arc;
use wardline::adapters::database::HospitalStore;
use wardline::adapters::postgresql::{PostgreSQLClient, PostgreSQLStore};
use wardline::config::{parse_config, AdmissionConfig};
use wardline::core::{AdmissionManager, PatientRegistry, WardManager};
use wardline::domain::{
    AdmissionStatus, AdmitCommand, Bed, BedStatus, ConflictKind, DoctorId, NewBed, NewPatient,
    Patient, PatientId, PatientStatus, WardlineError,
};

async fn store() -> Option<Arc<PostgreSQLStore>> {
    if std::env::var("WARDLINE_TEST_DATABASE_URL").is_err() {
        eprintln!("WARDLINE_TEST_DATABASE_URL not set, skipping");
        return None;
    }
    let config = parse_config(
        r#"
database_target = "postgresql"

[postgresql]
connection_string = "${WARDLINE_TEST_DATABASE_URL}"
max_connections = 8
ssl_mode = "disable"

[auth]
enabled = false
"#,
    )
    .unwrap();

    let client = PostgreSQLClient::new(config.postgresql.unwrap())
        .await
        .unwrap();
    let store = PostgreSQLStore::new(client);
    store.test_connection().await.unwrap();
    store.ensure_schema().await.unwrap();
    Some(Arc::new(store))
}

async fn patient(store: &Arc<PostgreSQLStore>) -> Patient {
    PatientRegistry::new(store.clone())
        .register(NewPatient::builder().name("Integration Patient").build().unwrap())
        .await
        .unwrap()
}

async fn bed(store: &Arc<PostgreSQLStore>, status: BedStatus) -> Bed {
    let number = format!("T-{}", uuid::Uuid::new_v4().simple());
    WardManager::new(store.clone())
        .add_bed(NewBed::new(number, "Test", status).unwrap())
        .await
        .unwrap()
}

fn manager(store: &Arc<PostgreSQLStore>) -> Arc<AdmissionManager> {
    Arc::new(AdmissionManager::new(store.clone(), &AdmissionConfig::default()))
}

fn command(patient: &Patient, bed: &Bed) -> AdmitCommand {
    AdmitCommand::new(patient.id, DoctorId::new(2).unwrap(), bed.id, "flu").unwrap()
}

#[tokio::test]
#[ignore]
async fn test_admit_and_discharge_round_trip() {
    let Some(store) = store().await else { return };
    let admissions = manager(&store);
    let patient = patient(&store).await;
    let bed = bed(&store, BedStatus::Available).await;

    let admission = admissions.admit(command(&patient, &bed)).await.unwrap();
    let loaded_bed = store.get_bed(bed.id).await.unwrap().unwrap();
    assert_eq!(loaded_bed.status, BedStatus::Occupied);
    assert_eq!(loaded_bed.patient_id, Some(patient.id));
    let loaded_patient = store.get_patient(patient.id).await.unwrap().unwrap();
    assert_eq!(loaded_patient.status, PatientStatus::Admitted);

    let closed = admissions.discharge(admission.id).await.unwrap();
    assert_eq!(closed.status, AdmissionStatus::Discharged);
    assert!(closed.discharge_date.is_some());

    let stored = store.get_admission(admission.id).await.unwrap().unwrap();
    assert_eq!(stored, closed);
    let loaded_bed = store.get_bed(bed.id).await.unwrap().unwrap();
    assert_eq!(loaded_bed.status, BedStatus::Available);
    assert_eq!(loaded_bed.patient_id, None);
}

#[tokio::test]
#[ignore]
async fn test_second_admit_conflicts() {
    let Some(store) = store().await else { return };
    let admissions = manager(&store);
    let patient = patient(&store).await;
    let first = bed(&store, BedStatus::Available).await;
    let second = bed(&store, BedStatus::Available).await;

    admissions.admit(command(&patient, &first)).await.unwrap();
    let err = admissions.admit(command(&patient, &second)).await.unwrap_err();
    assert!(matches!(
        err,
        WardlineError::Conflict(ConflictKind::PatientAlreadyAdmitted)
    ));
    let untouched = store.get_bed(second.id).await.unwrap().unwrap();
    assert_eq!(untouched, second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_admits_same_bed() {
    let Some(store) = store().await else { return };
    let admissions = manager(&store);
    let bed = bed(&store, BedStatus::Available).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let patient = patient(&store).await;
        let admissions = admissions.clone();
        let command = command(&patient, &bed);
        handles.push(tokio::spawn(async move { admissions.admit(command).await }));
    }

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(
            matches!(result, Err(WardlineError::Conflict(_))),
            "{result:?}"
        );
    }

    let active: Vec<_> = store
        .list_admissions(Some(AdmissionStatus::Active))
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.bed_id == bed.id)
        .collect();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_rollback_discards_writes() {
    let Some(store) = store().await else { return };
    let bed = bed(&store, BedStatus::Available).await;

    let mut tx = store.begin().await.unwrap();
    tx.bed_for_update(bed.id).await.unwrap().unwrap();
    tx.set_bed_state(bed.id, BedStatus::Maintenance, None)
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(store.get_bed(bed.id).await.unwrap().unwrap(), bed);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_bed_number_is_validation_error() {
    let Some(store) = store().await else { return };
    let bed = bed(&store, BedStatus::Available).await;

    let err = store
        .insert_bed(&NewBed::new(bed.bed_number.clone(), "Test", BedStatus::Available).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, WardlineError::Validation(_)), "{err}");
}

#[tokio::test]
#[ignore]
async fn test_update_patient_keeps_status() {
    let Some(store) = store().await else { return };
    let patient = patient(&store).await;

    let details = NewPatient::builder()
        .name("Integration Patient Renamed")
        .email("renamed@example.com")
        .build_details()
        .unwrap();
    let updated = store
        .update_patient(patient.id, &details)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Integration Patient Renamed");
    assert_eq!(updated.status, patient.status);
    assert_eq!(updated.registered_at, patient.registered_at);

    let missing = PatientId::new(i64::MAX).unwrap();
    assert!(store.update_patient(missing, &details).await.unwrap().is_none());
}
