//! Shared handler state

use super::auth::{StaticTokenValidator, TokenValidator};
use crate::adapters::database::HospitalStore;
use crate::config::WardlineConfig;
use crate::core::{AdmissionManager, PatientRegistry, WardManager};
use std::sync::Arc;

/// Cloned into every handler; all members are shared
#[derive(Clone)]
pub struct AppState {
    pub admissions: Arc<AdmissionManager>,
    pub registry: Arc<PatientRegistry>,
    pub ward: Arc<WardManager>,
    pub store: Arc<dyn HospitalStore>,
    /// `None` when authentication is disabled
    pub validator: Option<Arc<dyn TokenValidator>>,
}

impl AppState {
    /// Wire the managers over `store`, with the static token table from `config`
    pub fn new(store: Arc<dyn HospitalStore>, config: &WardlineConfig) -> Self {
        let validator: Option<Arc<dyn TokenValidator>> = config
            .auth
            .enabled
            .then(|| Arc::new(StaticTokenValidator::from_config(&config.auth)) as _);
        Self::with_validator(store, config, validator)
    }

    /// Like [`AppState::new`] with a caller-supplied token validator
    pub fn with_validator(
        store: Arc<dyn HospitalStore>,
        config: &WardlineConfig,
        validator: Option<Arc<dyn TokenValidator>>,
    ) -> Self {
        if validator.is_none() {
            tracing::warn!("API authentication is disabled");
        }
        Self {
            admissions: Arc::new(AdmissionManager::new(store.clone(), &config.admission)),
            registry: Arc::new(PatientRegistry::new(store.clone())),
            ward: Arc::new(WardManager::new(store.clone())),
            store,
            validator,
        }
    }
}
