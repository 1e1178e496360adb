//! PostgreSQL implementation of the store traits

use crate::adapters::database::traits::{HospitalStore, StoreTransaction};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    admission_from_row, bed_from_row, map_db_error, patient_from_row, ADMISSION_COLUMNS,
    BED_COLUMNS, PATIENT_COLUMNS,
};
use crate::domain::{
    Admission, AdmissionId, AdmissionStatus, Bed, BedFilter, BedId, BedStatus, EntityKind,
    NewAdmission, NewBed, NewPatient, Patient, PatientDetails, PatientId, PatientStatus, Result,
    WardlineError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// PostgreSQL-backed [`HospitalStore`]
pub struct PostgreSQLStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLStore {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl HospitalStore for PostgreSQLStore {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let conn = self.client.get_connection().await?;
        conn.batch_execute(&self.client.begin_statement())
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;

        Ok(Box::new(PostgreSQLTransaction { conn: Some(conn) }))
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        let conn = self.client.get_connection().await?;
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
        conn.query_opt(&query, &[&id.get()])
            .await
            .map_err(|e| map_db_error("Failed to load patient", e))?
            .as_ref()
            .map(patient_from_row)
            .transpose()
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let conn = self.client.get_connection().await?;
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY name, id");
        conn.query(&query, &[])
            .await
            .map_err(|e| map_db_error("Failed to list patients", e))?
            .iter()
            .map(patient_from_row)
            .collect()
    }

    async fn insert_patient(
        &self,
        patient: &NewPatient,
        registered_at: DateTime<Utc>,
    ) -> Result<Patient> {
        let conn = self.client.get_connection().await?;
        let query = format!(
            "INSERT INTO patients (name, email, phone, date_of_birth, gender, address, status, registered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PATIENT_COLUMNS}"
        );
        let row = conn
            .query_one(
                &query,
                &[
                    &patient.name,
                    &patient.email,
                    &patient.phone,
                    &patient.date_of_birth,
                    &patient.gender,
                    &patient.address,
                    &patient.status.as_str(),
                    &registered_at,
                ],
            )
            .await
            .map_err(|e| map_db_error("Failed to insert patient", e))?;
        patient_from_row(&row)
    }

    async fn update_patient(
        &self,
        id: PatientId,
        details: &PatientDetails,
    ) -> Result<Option<Patient>> {
        let conn = self.client.get_connection().await?;
        let query = format!(
            "UPDATE patients \
             SET name = $2, email = $3, phone = $4, date_of_birth = $5, gender = $6, address = $7 \
             WHERE id = $1 \
             RETURNING {PATIENT_COLUMNS}"
        );
        conn.query_opt(
            &query,
            &[
                &id.get(),
                &details.name,
                &details.email,
                &details.phone,
                &details.date_of_birth,
                &details.gender,
                &details.address,
            ],
        )
        .await
        .map_err(|e| map_db_error("Failed to update patient", e))?
        .as_ref()
        .map(patient_from_row)
        .transpose()
    }

    async fn get_bed(&self, id: BedId) -> Result<Option<Bed>> {
        let conn = self.client.get_connection().await?;
        let query = format!("SELECT {BED_COLUMNS} FROM beds WHERE id = $1");
        conn.query_opt(&query, &[&id.get()])
            .await
            .map_err(|e| map_db_error("Failed to load bed", e))?
            .as_ref()
            .map(bed_from_row)
            .transpose()
    }

    async fn list_beds(&self, filter: &BedFilter) -> Result<Vec<Bed>> {
        let conn = self.client.get_connection().await?;
        let query = format!(
            "SELECT {BED_COLUMNS} FROM beds \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::text IS NULL OR lower(ward) = lower($2)) \
             ORDER BY bed_number, id"
        );
        let status = filter.status.map(|s| s.as_str());
        let ward = filter.ward.as_deref();
        conn.query(&query, &[&status, &ward])
            .await
            .map_err(|e| map_db_error("Failed to list beds", e))?
            .iter()
            .map(bed_from_row)
            .collect()
    }

    async fn insert_bed(&self, bed: &NewBed) -> Result<Bed> {
        let conn = self.client.get_connection().await?;
        let query = format!(
            "INSERT INTO beds (bed_number, ward, status) VALUES ($1, $2, $3) \
             RETURNING {BED_COLUMNS}"
        );
        let row = conn
            .query_one(&query, &[&bed.bed_number, &bed.ward, &bed.status.as_str()])
            .await
            .map_err(|e| map_db_error("Failed to insert bed", e))?;
        bed_from_row(&row)
    }

    async fn get_admission(&self, id: AdmissionId) -> Result<Option<Admission>> {
        let conn = self.client.get_connection().await?;
        let query = format!("SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = $1");
        conn.query_opt(&query, &[&id.get()])
            .await
            .map_err(|e| map_db_error("Failed to load admission", e))?
            .as_ref()
            .map(admission_from_row)
            .transpose()
    }

    async fn list_admissions_by_patient(&self, patient_id: PatientId) -> Result<Vec<Admission>> {
        let conn = self.client.get_connection().await?;
        let query = format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions WHERE patient_id = $1 \
             ORDER BY admission_date DESC, id DESC"
        );
        conn.query(&query, &[&patient_id.get()])
            .await
            .map_err(|e| map_db_error("Failed to list admissions", e))?
            .iter()
            .map(admission_from_row)
            .collect()
    }

    async fn list_admissions(&self, status: Option<AdmissionStatus>) -> Result<Vec<Admission>> {
        let conn = self.client.get_connection().await?;
        let query = format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY admission_date DESC, id DESC"
        );
        let status = status.map(|s| s.as_str());
        conn.query(&query, &[&status])
            .await
            .map_err(|e| map_db_error("Failed to list admissions", e))?
            .iter()
            .map(admission_from_row)
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}

/// A pooled connection with an open transaction
///
/// `conn` is taken on commit or rollback. If the transaction is dropped
/// while still open, `Drop` rolls it back before the connection can be
/// reused.
struct PostgreSQLTransaction {
    conn: Option<deadpool_postgres::Object>,
}

impl PostgreSQLTransaction {
    fn conn(&self) -> Result<&deadpool_postgres::Object> {
        self.conn
            .as_ref()
            .ok_or_else(|| WardlineError::Database("transaction already finished".to_string()))
    }

    /// Runs an UPDATE that must hit exactly the row `id`
    async fn expect_one_row(
        &self,
        context: &str,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
        entity: EntityKind,
        id: i64,
    ) -> Result<()> {
        let affected = self
            .conn()?
            .execute(statement, params)
            .await
            .map_err(|e| map_db_error(context, e))?;
        if affected == 0 {
            return Err(WardlineError::not_found(entity, id));
        }
        Ok(())
    }
}

impl Drop for PostgreSQLTransaction {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = conn.batch_execute("ROLLBACK").await {
                        tracing::warn!(error = %e, "Rollback of abandoned transaction failed");
                        // Keep the connection out of the pool
                        drop(deadpool_postgres::Object::take(conn));
                    }
                });
            }
            Err(_) => {
                // No runtime to roll back on; closing the connection aborts it
                drop(deadpool_postgres::Object::take(conn));
            }
        }
    }
}

#[async_trait]
impl StoreTransaction for PostgreSQLTransaction {
    async fn patient_for_update(&mut self, id: PatientId) -> Result<Option<Patient>> {
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1 FOR UPDATE");
        self.conn()?
            .query_opt(&query, &[&id.get()])
            .await
            .map_err(|e| map_db_error("Failed to lock patient", e))?
            .as_ref()
            .map(patient_from_row)
            .transpose()
    }

    async fn bed_for_update(&mut self, id: BedId) -> Result<Option<Bed>> {
        let query = format!("SELECT {BED_COLUMNS} FROM beds WHERE id = $1 FOR UPDATE");
        self.conn()?
            .query_opt(&query, &[&id.get()])
            .await
            .map_err(|e| map_db_error("Failed to lock bed", e))?
            .as_ref()
            .map(bed_from_row)
            .transpose()
    }

    async fn admission_for_update(&mut self, id: AdmissionId) -> Result<Option<Admission>> {
        let query =
            format!("SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = $1 FOR UPDATE");
        self.conn()?
            .query_opt(&query, &[&id.get()])
            .await
            .map_err(|e| map_db_error("Failed to lock admission", e))?
            .as_ref()
            .map(admission_from_row)
            .transpose()
    }

    async fn active_admission_for_patient(
        &mut self,
        patient_id: PatientId,
    ) -> Result<Option<Admission>> {
        // Callers hold the patient row lock, which already serializes admits
        // for the same patient.
        let query = format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions \
             WHERE patient_id = $1 AND status = 'Active'"
        );
        self.conn()?
            .query_opt(&query, &[&patient_id.get()])
            .await
            .map_err(|e| map_db_error("Failed to check active admission", e))?
            .as_ref()
            .map(admission_from_row)
            .transpose()
    }

    async fn insert_admission(&mut self, admission: &NewAdmission) -> Result<Admission> {
        let query = format!(
            "INSERT INTO admissions (patient_id, bed_id, doctor_id, admission_date, diagnosis, status) \
             VALUES ($1, $2, $3, $4, $5, 'Active') \
             RETURNING {ADMISSION_COLUMNS}"
        );
        let row = self
            .conn()?
            .query_one(
                &query,
                &[
                    &admission.patient_id.get(),
                    &admission.bed_id.get(),
                    &admission.doctor_id.get(),
                    &admission.admission_date,
                    &admission.diagnosis,
                ],
            )
            .await
            .map_err(|e| map_db_error("Failed to insert admission", e))?;
        admission_from_row(&row)
    }

    async fn close_admission(
        &mut self,
        id: AdmissionId,
        discharge_date: DateTime<Utc>,
    ) -> Result<()> {
        self.expect_one_row(
            "Failed to close admission",
            "UPDATE admissions SET status = 'Discharged', discharge_date = $2 \
             WHERE id = $1 AND status = 'Active'",
            &[&id.get(), &discharge_date],
            EntityKind::Admission,
            id.get(),
        )
        .await
    }

    async fn set_bed_state(
        &mut self,
        id: BedId,
        status: BedStatus,
        patient_id: Option<PatientId>,
    ) -> Result<()> {
        let patient_id = patient_id.map(PatientId::get);
        self.expect_one_row(
            "Failed to update bed",
            "UPDATE beds SET status = $2, patient_id = $3 WHERE id = $1",
            &[&id.get(), &status.as_str(), &patient_id],
            EntityKind::Bed,
            id.get(),
        )
        .await
    }

    async fn set_patient_status(&mut self, id: PatientId, status: PatientStatus) -> Result<()> {
        self.expect_one_row(
            "Failed to update patient",
            "UPDATE patients SET status = $2 WHERE id = $1",
            &[&id.get(), &status.as_str()],
            EntityKind::Patient,
            id.get(),
        )
        .await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        let conn = this
            .conn
            .take()
            .ok_or_else(|| WardlineError::Database("transaction already finished".to_string()))?;

        if let Err(e) = conn.batch_execute("COMMIT").await {
            // A failed COMMIT has already ended the transaction server-side
            return Err(map_db_error("Failed to commit transaction", e));
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        let Some(conn) = this.conn.take() else {
            return Ok(());
        };

        conn.batch_execute("ROLLBACK")
            .await
            .map_err(|e| map_db_error("Failed to roll back transaction", e))
    }
}
