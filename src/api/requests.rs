//! Typed request bodies and query strings
//!
//! Fields are optional at the serde level so that a missing field comes back
//! as a named validation error rather than a generic decode failure.
//! `validate()` turns each request into the checked domain input.

use crate::domain::patient::NewPatientBuilder;
use crate::domain::{
    AdmissionStatus, AdmitCommand, BedFilter, BedId, BedStatus, DoctorId, NewBed, NewPatient,
    PatientDetails, PatientId, PatientStatus, Result, WardlineError,
};
use chrono::NaiveDate;
use serde::Deserialize;

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| WardlineError::Validation(format!("{field} is required")))
}

fn invalid(message: String) -> WardlineError {
    WardlineError::Validation(message)
}

/// Parse an id taken from the URL path
pub fn path_id<T>(raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(invalid)
}

/// Body of `POST /admissions`
#[derive(Debug, Default, Deserialize)]
pub struct AdmitRequest {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub bed_id: Option<i64>,
    pub diagnosis: Option<String>,
}

impl AdmitRequest {
    pub fn validate(self) -> Result<AdmitCommand> {
        let patient_id = PatientId::new(required(self.patient_id, "patient_id")?).map_err(invalid)?;
        let doctor_id = DoctorId::new(required(self.doctor_id, "doctor_id")?).map_err(invalid)?;
        let bed_id = BedId::new(required(self.bed_id, "bed_id")?).map_err(invalid)?;
        let diagnosis = required(self.diagnosis, "diagnosis")?;

        AdmitCommand::new(patient_id, doctor_id, bed_id, diagnosis).map_err(invalid)
    }
}

/// Body of `POST /patients` and `PUT /patients/:id`
#[derive(Debug, Default, Deserialize)]
pub struct PatientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

impl PatientRequest {
    /// Registration data; `status` may pick Active or Waiting
    pub fn validate(mut self) -> Result<NewPatient> {
        let status = self.status.take();
        let mut builder = self.demographics()?;
        if let Some(status) = status {
            builder = builder.status(status.parse::<PatientStatus>().map_err(invalid)?);
        }
        builder.build().map_err(invalid)
    }

    /// Replacement demographics for an edit, which never carries a status
    pub fn validate_update(self) -> Result<PatientDetails> {
        if self.status.is_some() {
            return Err(invalid(
                "status cannot be edited; it changes only through admission and discharge"
                    .to_string(),
            ));
        }
        self.demographics()?.build_details().map_err(invalid)
    }

    fn demographics(self) -> Result<NewPatientBuilder> {
        let mut builder = NewPatient::builder().name(required(self.name, "name")?);

        if let Some(email) = self.email {
            let trimmed = email.trim();
            if !trimmed.is_empty() && !trimmed.contains('@') {
                return Err(invalid(format!("email '{trimmed}' is not a valid address")));
            }
            builder = builder.email(email);
        }
        if let Some(phone) = self.phone {
            builder = builder.phone(phone);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            builder = builder.date_of_birth(date_of_birth);
        }
        if let Some(gender) = self.gender {
            builder = builder.gender(gender);
        }
        if let Some(address) = self.address {
            builder = builder.address(address);
        }
        Ok(builder)
    }
}

/// Body of `POST /beds`
#[derive(Debug, Default, Deserialize)]
pub struct AddBedRequest {
    pub bed_number: Option<String>,
    pub ward: Option<String>,
    pub status: Option<String>,
}

impl AddBedRequest {
    pub fn validate(self) -> Result<NewBed> {
        let status = match self.status {
            Some(status) => status.parse::<BedStatus>().map_err(invalid)?,
            None => BedStatus::Available,
        };
        NewBed::new(
            required(self.bed_number, "bed_number")?,
            required(self.ward, "ward")?,
            status,
        )
        .map_err(invalid)
    }
}

/// Body of `PUT /beds/{id}/status`
#[derive(Debug, Default, Deserialize)]
pub struct SetBedStatusRequest {
    pub status: Option<String>,
}

impl SetBedStatusRequest {
    pub fn validate(self) -> Result<BedStatus> {
        required(self.status, "status")?.parse().map_err(invalid)
    }
}

/// Query string of `GET /beds`
#[derive(Debug, Default, Deserialize)]
pub struct BedQuery {
    pub status: Option<String>,
    pub ward: Option<String>,
}

impl BedQuery {
    pub fn validate(self) -> Result<BedFilter> {
        let status = self
            .status
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<BedStatus>())
            .transpose()
            .map_err(invalid)?;
        let ward = self
            .ward
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        Ok(BedFilter { status, ward })
    }
}

/// Query string of `GET /admissions`
#[derive(Debug, Default, Deserialize)]
pub struct AdmissionQuery {
    pub status: Option<String>,
}

impl AdmissionQuery {
    pub fn validate(self) -> Result<Option<AdmissionStatus>> {
        self.status
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<AdmissionStatus>())
            .transpose()
            .map_err(invalid)
    }
}
