//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::RentalStore;
use crate::services::khalti_service::PaymentGateway;
use crate::services::notification_service::Notifier;
use crate::services::rental_service::RentalService;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub store: Arc<dyn RentalStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: Arc<dyn RentalStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            store,
            gateway,
            notifier,
        }
    }

    /// Servicio de alquiler sobre los colaboradores del estado
    pub fn rental_service(&self) -> RentalService {
        RentalService::new(self.store.clone(), self.gateway.clone(), self.notifier.clone())
    }
}
