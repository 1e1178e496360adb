//! Domain identifier types with validation
//!
//! Every table uses a positive `BIGSERIAL` key. The newtypes below keep a
//! bed id from being passed where a patient id is expected, and reject zero
//! or negative values at the edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier, rejecting non-positive values
            pub fn new(id: i64) -> Result<Self, String> {
                if id <= 0 {
                    return Err(format!("{} must be a positive integer, got {}", $label, id));
                }
                Ok(Self(id))
            }

            /// Returns the raw key
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw: i64 = s
                    .trim()
                    .parse()
                    .map_err(|_| format!("{} must be an integer, got '{}'", $label, s))?;
                Self::new(raw)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = String;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Patient identifier
    ///
    /// ```
    /// use wardline::domain::ids::PatientId;
    ///
    /// let id = PatientId::new(5).unwrap();
    /// assert_eq!(id.get(), 5);
    /// assert!(PatientId::new(0).is_err());
    /// ```
    PatientId,
    "patient_id"
);

define_id!(
    /// Bed identifier
    BedId,
    "bed_id"
);

define_id!(
    /// Admission identifier
    AdmissionId,
    "admission_id"
);

define_id!(
    /// Identifier of the attending doctor (an employee record)
    DoctorId,
    "doctor_id"
);
