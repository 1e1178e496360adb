//! Patient domain model
//!
//! Patients are never deleted. Their `status` moves through
//! `Waiting/Active -> Admitted -> Active/Discharged`, and only the admission
//! workflow may enter or leave `Admitted`.

use super::ids::PatientId;
use super::text::check_text;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientStatus {
    /// Registered and not waiting on anything
    Active,
    /// Registered at the front desk, waiting for a doctor or bed
    Waiting,
    /// Holds an active admission
    Admitted,
    /// Left the hospital after a stay
    Discharged,
}

impl PatientStatus {
    /// All statuses, in display order
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Active,
        PatientStatus::Waiting,
        PatientStatus::Admitted,
        PatientStatus::Discharged,
    ];

    /// Canonical storage/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "Active",
            PatientStatus::Waiting => "Waiting",
            PatientStatus::Admitted => "Admitted",
            PatientStatus::Discharged => "Discharged",
        }
    }

    /// Statuses a patient may be registered with
    pub fn is_registrable(&self) -> bool {
        matches!(self, PatientStatus::Active | PatientStatus::Waiting)
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Invalid patient status '{}'. Must be one of: Active, Waiting, Admitted, Discharged",
                    s
                )
            })
    }
}

/// A registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub status: PatientStatus,
    pub registered_at: DateTime<Utc>,
}

impl Patient {
    /// Whether the patient currently holds an admission
    pub fn is_admitted(&self) -> bool {
        self.status == PatientStatus::Admitted
    }
}

/// Validated registration data for a new patient
///
/// # Examples
///
/// ```
/// use wardline::domain::patient::{NewPatient, PatientStatus};
///
/// let patient = NewPatient::builder()
///     .name("Ada Obi")
///     .phone("+234 800 000 0000")
///     .build()
///     .unwrap();
///
/// assert_eq!(patient.status, PatientStatus::Waiting);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub status: PatientStatus,
}

impl NewPatient {
    /// Creates a new builder for constructing a NewPatient
    pub fn builder() -> NewPatientBuilder {
        NewPatientBuilder::default()
    }
}

/// Builder for [`NewPatient`]
#[derive(Debug, Default)]
pub struct NewPatientBuilder {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    address: Option<String>,
    status: Option<PatientStatus>,
}

impl NewPatientBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn status(mut self, status: PatientStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Builds the NewPatient
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the date of birth is in the
    /// future, or the initial status is not `Active` or `Waiting`.
    pub fn build(self) -> Result<NewPatient, String> {
        let status = self.status.unwrap_or(PatientStatus::Waiting);
        if !status.is_registrable() {
            return Err(format!(
                "patients cannot be registered as {status}; use Active or Waiting"
            ));
        }

        let details = self.details()?;
        Ok(NewPatient {
            name: details.name,
            email: details.email,
            phone: details.phone,
            date_of_birth: details.date_of_birth,
            gender: details.gender,
            address: details.address,
            status,
        })
    }

    /// Builds replacement demographics for an existing patient
    ///
    /// # Errors
    ///
    /// Same rules as [`build`](Self::build), and a status must not be set.
    pub fn build_details(self) -> Result<PatientDetails, String> {
        if let Some(status) = self.status {
            return Err(format!(
                "status cannot be set to {status} by an edit; it follows admission and discharge"
            ));
        }
        self.details()
    }

    fn details(self) -> Result<PatientDetails, String> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or("name is required")?;
        check_text("name", &name)?;

        if let Some(dob) = self.date_of_birth {
            if dob > Utc::now().date_naive() {
                return Err(format!("date_of_birth {dob} is in the future"));
            }
        }

        Ok(PatientDetails {
            name,
            email: non_blank("email", self.email)?,
            phone: non_blank("phone", self.phone)?,
            date_of_birth: self.date_of_birth,
            gender: non_blank("gender", self.gender)?,
            address: non_blank("address", self.address)?,
        })
    }
}

/// Validated demographics that replace a patient's current ones
///
/// Carries no status, which only registration and the admission workflow set.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

/// Trimmed optional text; blank becomes `None`
fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>, String> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if let Some(v) = &value {
        check_text(field, v)?;
    }
    Ok(value)
}

/// Patient counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCensus {
    pub total: usize,
    pub active: usize,
    pub waiting: usize,
    pub admitted: usize,
    pub discharged: usize,
}

impl PatientCensus {
    /// Tallies a list of patients
    pub fn from_patients<'a>(patients: impl IntoIterator<Item = &'a Patient>) -> Self {
        patients
            .into_iter()
            .fold(PatientCensus::default(), |mut census, patient| {
                census.total += 1;
                match patient.status {
                    PatientStatus::Active => census.active += 1,
                    PatientStatus::Waiting => census.waiting += 1,
                    PatientStatus::Admitted => census.admitted += 1,
                    PatientStatus::Discharged => census.discharged += 1,
                }
                census
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Active", PatientStatus::Active)]
    #[test_case("waiting", PatientStatus::Waiting)]
    #[test_case("ADMITTED", PatientStatus::Admitted)]
    #[test_case(" Discharged ", PatientStatus::Discharged)]
    fn test_status_parse(input: &str, expected: PatientStatus) {
        assert_eq!(input.parse::<PatientStatus>().unwrap(), expected);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!("inpatient".parse::<PatientStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_pascal_case() {
        let json = serde_json::to_string(&PatientStatus::Admitted).unwrap();
        assert_eq!(json, "\"Admitted\"");
    }

    #[test]
    fn test_builder_defaults_to_waiting() {
        let patient = NewPatient::builder().name("  Ada Obi ").build().unwrap();
        assert_eq!(patient.name, "Ada Obi");
        assert_eq!(patient.status, PatientStatus::Waiting);
        assert!(patient.email.is_none());
    }

    #[test]
    fn test_builder_requires_name() {
        assert!(NewPatient::builder().build().is_err());
        assert!(NewPatient::builder().name("   ").build().is_err());
    }

    #[test]
    fn test_builder_blank_optionals_become_none() {
        let patient = NewPatient::builder()
            .name("Ada")
            .email("  ")
            .address("12 Marina Road")
            .build()
            .unwrap();
        assert!(patient.email.is_none());
        assert_eq!(patient.address.as_deref(), Some("12 Marina Road"));
    }

    #[test]
    fn test_builder_rejects_nul_characters() {
        assert!(NewPatient::builder().name("A\u{0}da").build().is_err());
        let err = NewPatient::builder()
            .name("Ada")
            .address("12 Marina\u{0}Road")
            .build()
            .unwrap_err();
        assert!(err.contains("address"), "{err}");
    }

    #[test]
    fn test_build_details_replaces_demographics() {
        let details = NewPatient::builder()
            .name(" Ada Obi ")
            .phone("")
            .gender("F")
            .build_details()
            .unwrap();
        assert_eq!(details.name, "Ada Obi");
        assert!(details.phone.is_none());
        assert_eq!(details.gender.as_deref(), Some("F"));
    }

    #[test_case(PatientStatus::Active)]
    #[test_case(PatientStatus::Admitted)]
    fn test_build_details_refuses_status(status: PatientStatus) {
        let err = NewPatient::builder()
            .name("Ada")
            .status(status)
            .build_details()
            .unwrap_err();
        assert!(err.contains("status"), "{err}");
    }

    #[test_case(PatientStatus::Admitted)]
    #[test_case(PatientStatus::Discharged)]
    fn test_builder_rejects_workflow_statuses(status: PatientStatus) {
        let result = NewPatient::builder().name("Ada").status(status).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_future_birth_date() {
        let tomorrow = Utc::now().date_naive() + chrono::Duration::days(1);
        let result = NewPatient::builder()
            .name("Ada")
            .date_of_birth(tomorrow)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_census_counts() {
        let now = Utc::now();
        let make = |id: i64, status| Patient {
            id: PatientId::new(id).unwrap(),
            name: format!("Patient {id}"),
            email: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            status,
            registered_at: now,
        };
        let patients = vec![
            make(1, PatientStatus::Admitted),
            make(2, PatientStatus::Waiting),
            make(3, PatientStatus::Waiting),
            make(4, PatientStatus::Discharged),
        ];

        let census = PatientCensus::from_patients(&patients);
        assert_eq!(census.total, 4);
        assert_eq!(census.admitted, 1);
        assert_eq!(census.waiting, 2);
        assert_eq!(census.discharged, 1);
        assert_eq!(census.active, 0);
    }
}
