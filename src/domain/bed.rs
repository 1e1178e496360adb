//! Bed domain model
//!
//! `BedStatus` is the single bed vocabulary used by the store, the workflow
//! and the JSON API.

use super::ids::{BedId, PatientId};
use super::text::check_text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bed status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BedStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl BedStatus {
    pub const ALL: [BedStatus; 4] = [
        BedStatus::Available,
        BedStatus::Occupied,
        BedStatus::Reserved,
        BedStatus::Maintenance,
    ];

    /// Canonical storage/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            BedStatus::Available => "Available",
            BedStatus::Occupied => "Occupied",
            BedStatus::Reserved => "Reserved",
            BedStatus::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BedStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Invalid bed status '{}'. Must be one of: Available, Occupied, Reserved, Maintenance",
                    s
                )
            })
    }
}

/// A physical bed in a ward
///
/// `patient_id` is only meaningful while `status` is `Occupied`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    pub id: BedId,
    pub bed_number: String,
    pub ward: String,
    pub status: BedStatus,
    pub patient_id: Option<PatientId>,
}

impl Bed {
    pub fn is_available(&self) -> bool {
        self.status == BedStatus::Available
    }

    /// The occupant, if the bed is occupied
    pub fn occupant(&self) -> Option<PatientId> {
        match self.status {
            BedStatus::Occupied => self.patient_id,
            _ => None,
        }
    }
}

/// Validated data for a new bed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBed {
    pub bed_number: String,
    pub ward: String,
    pub status: BedStatus,
}

impl NewBed {
    /// Validates and creates a new bed definition
    ///
    /// # Errors
    ///
    /// Returns an error if the bed number or ward is blank, or if the bed
    /// would start out occupied.
    pub fn new(
        bed_number: impl Into<String>,
        ward: impl Into<String>,
        status: BedStatus,
    ) -> Result<Self, String> {
        let bed_number = bed_number.into().trim().to_string();
        let ward = ward.into().trim().to_string();

        if bed_number.is_empty() {
            return Err("bed_number is required".to_string());
        }
        if ward.is_empty() {
            return Err("ward is required".to_string());
        }
        check_text("bed_number", &bed_number)?;
        check_text("ward", &ward)?;
        if status == BedStatus::Occupied {
            return Err("a new bed cannot start Occupied; admit a patient instead".to_string());
        }

        Ok(Self {
            bed_number,
            ward,
            status,
        })
    }
}

/// Criteria for listing beds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BedFilter {
    pub status: Option<BedStatus>,
    pub ward: Option<String>,
}

impl BedFilter {
    pub fn available() -> Self {
        Self {
            status: Some(BedStatus::Available),
            ward: None,
        }
    }

    pub fn in_ward(mut self, ward: impl Into<String>) -> Self {
        self.ward = Some(ward.into());
        self
    }

    /// Whether a bed satisfies this filter
    pub fn matches(&self, bed: &Bed) -> bool {
        self.status.map_or(true, |status| bed.status == status)
            && self
                .ward
                .as_deref()
                .map_or(true, |ward| bed.ward.eq_ignore_ascii_case(ward))
    }
}

/// Bed counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedOccupancy {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub reserved: usize,
    pub maintenance: usize,
    /// Occupied beds as a rounded percentage of all beds
    pub occupancy_pct: u8,
}

impl BedOccupancy {
    pub fn from_beds<'a>(beds: impl IntoIterator<Item = &'a Bed>) -> Self {
        let mut occupancy = beds
            .into_iter()
            .fold(BedOccupancy::default(), |mut acc, bed| {
                acc.total += 1;
                match bed.status {
                    BedStatus::Available => acc.available += 1,
                    BedStatus::Occupied => acc.occupied += 1,
                    BedStatus::Reserved => acc.reserved += 1,
                    BedStatus::Maintenance => acc.maintenance += 1,
                }
                acc
            });

        if occupancy.total > 0 {
            let pct = (occupancy.occupied as f64 / occupancy.total as f64 * 100.0).round();
            occupancy.occupancy_pct = pct as u8;
        }
        occupancy
    }
}
