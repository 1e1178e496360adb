//! Status command implementation
//!
//! Prints bed occupancy and the patient census.

use super::{connect_or_exit, load_or_exit};
use crate::adapters::database::HospitalStore;
use crate::config::AdmissionConfig;
use crate::core::{AdmissionManager, PatientRegistry, WardManager};
use crate::domain::{BedOccupancy, PatientCensus};
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Limit the bed listing to one ward
    #[arg(long)]
    pub ward: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking hospital status");

        println!("📊 Wardline Status");
        println!();

        let config = match load_or_exit(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let store = match connect_or_exit(&config).await {
            Ok(store) => store,
            Err(code) => return Ok(code),
        };

        match self.report(store).await {
            Ok(report) => {
                print!("{report}");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to read status");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    async fn report(&self, store: Arc<dyn HospitalStore>) -> crate::domain::Result<String> {
        let ward = WardManager::new(store.clone());
        let registry = PatientRegistry::new(store.clone());

        let occupancy = ward.occupancy().await?;
        let census = registry.census().await?;
        let admissions = AdmissionManager::new(store, &AdmissionConfig::default());
        let active = admissions.list_active().await?.len();

        let mut out = render(&occupancy, &census, active);

        if let Some(name) = &self.ward {
            let filter = crate::domain::BedFilter::default().in_ward(name.as_str());
            let beds = ward.list_beds(&filter).await?;
            out.push_str(&format!("\nWard {name}: {} bed(s)\n", beds.len()));
            out.push_str(&format!("{:<12} {:<14} {:<10}\n", "Bed", "Status", "Patient"));
            out.push_str(&format!("{}\n", "-".repeat(38)));
            for bed in beds {
                let patient = bed
                    .patient_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{:<12} {:<14} {:<10}\n",
                    bed.bed_number, bed.status, patient
                ));
            }
        }
        Ok(out)
    }
}

fn render(occupancy: &BedOccupancy, census: &PatientCensus, active_admissions: usize) -> String {
    format!(
        "Beds\n  Total:       {}\n  Available:   {}\n  Occupied:    {}\n  Reserved:    {}\n  Maintenance: {}\n  Occupancy:   {}%\n\n\
         Patients\n  Total:       {}\n  Waiting:     {}\n  Active:      {}\n  Admitted:    {}\n  Discharged:  {}\n\n\
         Active admissions: {}\n",
        occupancy.total,
        occupancy.available,
        occupancy.occupied,
        occupancy.reserved,
        occupancy.maintenance,
        occupancy.occupancy_pct,
        census.total,
        census.waiting,
        census.active,
        census.admitted,
        census.discharged,
        active_admissions,
    )
}
