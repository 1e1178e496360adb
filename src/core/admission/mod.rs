//! Patient admission and discharge

pub mod manager;

pub use manager::AdmissionManager;
