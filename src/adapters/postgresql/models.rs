//! Row mapping between PostgreSQL and domain types
//!
//! Column lists are shared by every query so the `from_row` functions can
//! read columns by name.

use crate::domain::{
    Admission, AdmissionStatus, Bed, BedStatus, ConflictKind, Patient, PatientId, PatientStatus,
    Result, WardlineError,
};
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

pub const PATIENT_COLUMNS: &str =
    "id, name, email, phone, date_of_birth, gender, address, status, registered_at";

pub const BED_COLUMNS: &str = "id, bed_number, ward, status, patient_id";

pub const ADMISSION_COLUMNS: &str =
    "id, patient_id, bed_id, doctor_id, admission_date, discharge_date, diagnosis, status";

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|e| WardlineError::Database(format!("Failed to read column '{name}': {e}")))
}

fn id_column<T>(row: &Row, name: &str) -> Result<T>
where
    T: TryFrom<i64, Error = String>,
{
    let raw: i64 = column(row, name)?;
    T::try_from(raw).map_err(WardlineError::Database)
}

fn status_column<T>(row: &Row, name: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: &str = column(row, name)?;
    raw.parse().map_err(WardlineError::Database)
}

pub fn patient_from_row(row: &Row) -> Result<Patient> {
    Ok(Patient {
        id: id_column(row, "id")?,
        name: column(row, "name")?,
        email: column(row, "email")?,
        phone: column(row, "phone")?,
        date_of_birth: column(row, "date_of_birth")?,
        gender: column(row, "gender")?,
        address: column(row, "address")?,
        status: status_column::<PatientStatus>(row, "status")?,
        registered_at: column(row, "registered_at")?,
    })
}

pub fn bed_from_row(row: &Row) -> Result<Bed> {
    let patient_id: Option<i64> = column(row, "patient_id")?;
    Ok(Bed {
        id: id_column(row, "id")?,
        bed_number: column(row, "bed_number")?,
        ward: column(row, "ward")?,
        status: status_column::<BedStatus>(row, "status")?,
        patient_id: patient_id
            .map(PatientId::try_from)
            .transpose()
            .map_err(WardlineError::Database)?,
    })
}

pub fn admission_from_row(row: &Row) -> Result<Admission> {
    Ok(Admission {
        id: id_column(row, "id")?,
        patient_id: id_column(row, "patient_id")?,
        bed_id: id_column(row, "bed_id")?,
        doctor_id: id_column(row, "doctor_id")?,
        admission_date: column(row, "admission_date")?,
        discharge_date: column(row, "discharge_date")?,
        diagnosis: column(row, "diagnosis")?,
        status: status_column::<AdmissionStatus>(row, "status")?,
    })
}

/// Maps a driver error onto the crate error type
///
/// Serialization failures, deadlocks and violations of the active-admission
/// unique indexes mean a concurrent transaction won; they surface as
/// `Conflict(ConcurrentUpdate)` so the caller can retry.
pub fn map_db_error(context: &str, err: tokio_postgres::Error) -> WardlineError {
    match err.code() {
        Some(code)
            if *code == SqlState::T_R_SERIALIZATION_FAILURE
                || *code == SqlState::T_R_DEADLOCK_DETECTED =>
        {
            tracing::debug!(context, error = %err, "Transaction lost a serialization race");
            ConflictKind::ConcurrentUpdate.into()
        }
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            let constraint = err
                .as_db_error()
                .and_then(|db| db.constraint())
                .unwrap_or_default();
            if constraint.starts_with("uq_admissions_active") {
                ConflictKind::ConcurrentUpdate.into()
            } else {
                WardlineError::Validation(format!("{context}: duplicate value ({constraint})"))
            }
        }
        _ => WardlineError::Database(format!("{context}: {err}")),
    }
}
