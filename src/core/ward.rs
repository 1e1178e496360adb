//! Ward and bed management
//!
//! Beds can be added and moved between Available, Reserved and Maintenance
//! here. Occupancy belongs to the admission workflow: this module refuses to
//! set a bed Occupied or to change a bed that is.

use crate::adapters::database::traits::HospitalStore;
use crate::domain::{
    Bed, BedFilter, BedId, BedOccupancy, BedStatus, ConflictKind, EntityKind, NewBed, Result,
    WardlineError,
};
use std::sync::Arc;

/// Bed inventory for all wards
pub struct WardManager {
    store: Arc<dyn HospitalStore>,
}

impl WardManager {
    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        Self { store }
    }

    /// Add a bed to a ward
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the bed number is already in use.
    pub async fn add_bed(&self, bed: NewBed) -> Result<Bed> {
        let bed = self.store.insert_bed(&bed).await?;
        tracing::info!(
            bed_id = %bed.id,
            bed_number = %bed.bed_number,
            ward = %bed.ward,
            "Bed added"
        );
        Ok(bed)
    }

    pub async fn get_bed(&self, bed_id: BedId) -> Result<Bed> {
        self.store
            .get_bed(bed_id)
            .await?
            .ok_or_else(|| WardlineError::not_found(EntityKind::Bed, bed_id))
    }

    /// Beds matching `filter`, ordered by bed number
    pub async fn list_beds(&self, filter: &BedFilter) -> Result<Vec<Bed>> {
        self.store.list_beds(filter).await
    }

    /// Available beds, optionally limited to one ward
    ///
    /// # Errors
    ///
    /// Returns `NothingAvailable` when no bed is free.
    pub async fn available_beds(&self, ward: Option<&str>) -> Result<Vec<Bed>> {
        let filter = match ward {
            Some(ward) => BedFilter::available().in_ward(ward),
            None => BedFilter::available(),
        };
        let beds = self.store.list_beds(&filter).await?;
        if beds.is_empty() {
            return Err(WardlineError::NothingAvailable(
                "No beds currently available".to_string(),
            ));
        }
        Ok(beds)
    }

    /// Manually change a bed's status
    ///
    /// # Errors
    ///
    /// - `NotFound` if the bed does not exist
    /// - `Conflict(BedOccupied)` if `status` is Occupied or the bed is occupied
    pub async fn set_bed_status(&self, bed_id: BedId, status: BedStatus) -> Result<Bed> {
        if status == BedStatus::Occupied {
            return Err(ConflictKind::BedOccupied {
                bed_id: bed_id.get(),
            }
            .into());
        }
        if self.store.get_bed(bed_id).await?.is_none() {
            return Err(WardlineError::not_found(EntityKind::Bed, bed_id));
        }

        let mut tx = self.store.begin().await?;
        let locked = async {
            let bed = tx
                .bed_for_update(bed_id)
                .await?
                .ok_or_else(|| WardlineError::not_found(EntityKind::Bed, bed_id))?;
            if bed.status == BedStatus::Occupied {
                return Err(ConflictKind::BedOccupied {
                    bed_id: bed_id.get(),
                }
                .into());
            }
            tx.set_bed_state(bed_id, status, None).await?;
            Ok::<Bed, WardlineError>(bed)
        }
        .await;

        let mut bed = match locked {
            Ok(bed) => bed,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(e);
            }
        };
        tx.commit().await?;

        tracing::info!(
            bed_id = %bed_id,
            from = %bed.status,
            to = %status,
            "Bed status changed"
        );
        bed.status = status;
        bed.patient_id = None;
        Ok(bed)
    }

    /// Bed counts per status
    pub async fn occupancy(&self) -> Result<BedOccupancy> {
        let beds = self.store.list_beds(&BedFilter::default()).await?;
        Ok(BedOccupancy::from_beds(&beds))
    }
}
