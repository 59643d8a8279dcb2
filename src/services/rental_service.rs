//! Servicio de alquiler
//!
//! Orquesta el flujo completo de un alquiler:
//! `initiate` → redirección → callback → `lookup(pidx)` → `apply` → aviso al propietario.
//!
//! La única transición `Available -> Rented` pasa por `apply`, que delega el
//! check-and-set atómico en el store.

use std::sync::Arc;

use crate::models::payment::{
    InitiatedPayment, PaymentCallback, PaymentConfirmation, PaymentRequest, PaymentStatus,
    RenterIdentity,
};
use crate::models::rent_transaction::{RentCommand, RentalRecord};
use crate::models::vehicle::{RentalState, Vehicle};
use crate::repositories::RentalStore;
use crate::services::khalti_service::PaymentGateway;
use crate::services::notification_service::{Notifier, RentalNotice};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Resultado de aplicar una confirmación
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    Rented(RentalRecord),
    /// Estado distinto de `Completed`: sin cambios ni filas nuevas
    Ignored(PaymentStatus),
}

/// Qué pasó con el aviso al propietario
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationStatus {
    Sent,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct RentalOutcome {
    pub record: RentalRecord,
    pub notification: NotificationStatus,
}

#[derive(Clone)]
pub struct RentalService {
    store: Arc<dyn RentalStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
}

impl RentalService {
    pub fn new(
        store: Arc<dyn RentalStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
        }
    }

    async fn listed_vehicle(&self, vehicle_id: i64) -> AppResult<Vehicle> {
        self.store
            .find_vehicle(vehicle_id)
            .await?
            .filter(Vehicle::is_listed)
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))
    }

    /// Abrir una sesión de pago para alquilar `vehicle_id`
    ///
    /// El importe es el `rent_price` del vehículo y el `merchant_username`
    /// el del propietario.
    pub async fn initiate_rental(
        &self,
        vehicle_id: i64,
        renter: RenterIdentity,
    ) -> AppResult<InitiatedPayment> {
        let vehicle = self.listed_vehicle(vehicle_id).await?;

        if vehicle.state() == RentalState::Rented {
            return Err(AppError::Conflict(format!(
                "Vehicle {} is not available for rent",
                vehicle_id
            )));
        }

        let owner = self
            .store
            .find_user(vehicle.owner_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("owner {} of vehicle {} is missing", vehicle.owner_id, vehicle_id))
            })?;

        let request = PaymentRequest {
            vehicle_id,
            vehicle_name: vehicle.vehicle_model.clone(),
            merchant_username: owner.username,
            renter,
            amount: vehicle.rent_price,
        };

        self.gateway
            .initiate(request)
            .await
            .map_err(|e| e.into_initiation_error())
    }

    /// Procesar el callback de la pasarela para `payer_id`
    pub async fn verify_payment(&self, payer_id: i64, callback: PaymentCallback) -> AppResult<RentalOutcome> {
        let lookup = self
            .gateway
            .lookup(&callback.pidx)
            .await
            .map_err(|e| e.into_lookup_error())?;

        log::info!(
            "💳 Pago pidx={} en estado {} ({})",
            lookup.pidx,
            lookup.status,
            lookup.gateway_status
        );

        let confirmation = PaymentConfirmation {
            pidx: lookup.pidx,
            status: lookup.status,
            vehicle_id: callback.vehicle_id,
            transaction_id: callback.transaction_id,
            total_amount: lookup.total_amount,
            payer_id,
        };

        match self.apply(confirmation).await? {
            ApplyOutcome::Rented(record) => {
                let notification = self.notify_owner(&record).await;
                Ok(RentalOutcome { record, notification })
            }
            ApplyOutcome::Ignored(status) => Err(AppError::PaymentVerification(format!(
                "payment status is {}",
                status
            ))),
        }
    }

    /// Aplicar una confirmación de pago a la máquina de estados
    ///
    /// Cada `pidx` alquila como mucho un vehículo y el importe cobrado debe
    /// cubrir el `rent_price`; ambas comprobaciones viven en el check-and-set.
    pub async fn apply(&self, confirmation: PaymentConfirmation) -> AppResult<ApplyOutcome> {
        if confirmation.status != PaymentStatus::Completed {
            log::info!(
                "⏸️ Confirmación {} ignorada para vehículo {}: estado {}",
                confirmation.transaction_id,
                confirmation.vehicle_id,
                confirmation.status
            );
            return Ok(ApplyOutcome::Ignored(confirmation.status));
        }

        let amount = confirmation.total_amount.ok_or_else(|| {
            AppError::PaymentVerification("completed payment without amount".to_string())
        })?;

        let record = self
            .store
            .rent_vehicle(RentCommand {
                vehicle_id: confirmation.vehicle_id,
                renter_id: confirmation.payer_id,
                transaction_id: confirmation.transaction_id,
                pidx: confirmation.pidx,
                amount,
            })
            .await?;

        log::info!(
            "✅ Vehículo {} alquilado por usuario {} (transacción {})",
            record.vehicle.id,
            confirmation.payer_id,
            record.transaction.transaction_id
        );

        Ok(ApplyOutcome::Rented(record))
    }

    /// `Rented -> Available` a petición del propietario
    pub async fn mark_returned(&self, vehicle_id: i64, owner_id: i64) -> AppResult<Vehicle> {
        let vehicle = self.store.release_vehicle(vehicle_id, owner_id).await?;
        log::info!("🔄 Vehículo {} marcado como devuelto", vehicle_id);
        Ok(vehicle)
    }

    async fn notify_owner(&self, record: &RentalRecord) -> NotificationStatus {
        let owner = match self.store.find_user(record.vehicle.owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return skipped(format!("owner {} not found", record.vehicle.owner_id)),
            Err(e) => return skipped(e.to_string()),
        };

        let renter_username = match self.store.find_user(record.transaction.user_id).await {
            Ok(Some(renter)) => renter.username,
            Ok(None) => return skipped(format!("renter {} not found", record.transaction.user_id)),
            Err(e) => return skipped(e.to_string()),
        };

        let notice = RentalNotice {
            owner_email: owner.email,
            vehicle_model: record.vehicle.vehicle_model.clone(),
            renter_username,
        };

        match self.notifier.notify(&notice).await {
            Ok(()) => NotificationStatus::Sent,
            Err(e) => {
                log::warn!(
                    "⚠️ No se pudo avisar al propietario del vehículo {}: {}",
                    record.vehicle.id,
                    e
                );
                NotificationStatus::Failed(e.to_string())
            }
        }
    }
}

fn skipped(reason: String) -> NotificationStatus {
    log::warn!("⚠️ Aviso de alquiler omitido: {}", reason);
    NotificationStatus::Skipped(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::PaymentLookup;
    use crate::models::user::{Role, UserAccount};
    use crate::repositories::{InMemoryRentalStore, TransactionStore, VehicleStore};
    use crate::services::khalti_service::PaymentGatewayError;
    use crate::services::notification_service::{LogNotifier, NotificationError};
    use async_trait::async_trait;
    use chrono::Utc;

    struct StatusGateway(&'static str);

    #[async_trait]
    impl PaymentGateway for StatusGateway {
        async fn initiate(&self, request: PaymentRequest) -> Result<InitiatedPayment, PaymentGatewayError> {
            Ok(InitiatedPayment {
                payment_url: "https://pay.example/session".to_string(),
                pidx: Some("pidx-1".to_string()),
                transaction_id: "tx-1".to_string(),
                purchase_order_id: request.vehicle_id.to_string(),
            })
        }

        async fn lookup(&self, pidx: &str) -> Result<PaymentLookup, PaymentGatewayError> {
            Ok(PaymentLookup {
                pidx: pidx.to_string(),
                status: PaymentStatus::from_gateway(self.0),
                gateway_status: self.0.to_string(),
                total_amount: Some(1000),
            })
        }
    }

    struct BrokenMailer;

    #[async_trait]
    impl Notifier for BrokenMailer {
        async fn notify(&self, _notice: &RentalNotice) -> Result<(), NotificationError> {
            Err(NotificationError::Rejected(503))
        }
    }

    async fn seeded_store() -> InMemoryRentalStore {
        let store = InMemoryRentalStore::new();
        store.insert_category(1, "SUV").await;
        store
            .insert_vehicle(Vehicle {
                id: 7,
                vehicle_model: "Toyota Hilux".to_string(),
                rent_price: 1000,
                category_id: 1,
                description: None,
                owner_id: 10,
                rented_by: None,
                available: true,
                is_deleted: false,
                created_at: Utc::now(),
            })
            .await;
        store
    }

    fn user(id: i64, username: &str, role: Role) -> UserAccount {
        UserAccount {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: None,
            phone_number: None,
            role,
            created_at: Utc::now(),
        }
    }

    fn callback() -> PaymentCallback {
        PaymentCallback {
            pidx: "pidx-1".to_string(),
            transaction_id: "abc-123".to_string(),
            vehicle_id: 7,
        }
    }

    #[tokio::test]
    async fn test_pending_payment_is_rejected_without_mutation() {
        let store = Arc::new(seeded_store().await);
        let service = RentalService::new(store.clone(), Arc::new(StatusGateway("Pending")), Arc::new(LogNotifier));

        let result = service.verify_payment(42, callback()).await;

        assert!(matches!(result, Err(AppError::PaymentVerification(_))));
        let vehicle = store.find_vehicle(7).await.unwrap().unwrap();
        assert!(vehicle.available);
        assert!(store.list_all_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_rental() {
        let store = seeded_store().await;
        store.insert_user(user(10, "hari", Role::Owner)).await;
        store.insert_user(user(42, "ram", Role::Customer)).await;
        let store = Arc::new(store);
        let service = RentalService::new(store.clone(), Arc::new(StatusGateway("Completed")), Arc::new(BrokenMailer));

        let outcome = service.verify_payment(42, callback()).await.unwrap();

        assert!(matches!(outcome.notification, NotificationStatus::Failed(_)));
        assert_eq!(outcome.record.vehicle.rented_by, Some(42));
        assert_eq!(store.list_all_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_initiate_requires_known_owner() {
        let store = Arc::new(seeded_store().await);
        let service = RentalService::new(store, Arc::new(StatusGateway("Completed")), Arc::new(LogNotifier));

        let renter = RenterIdentity {
            name: "Ram".to_string(),
            email: "ram@example.com".to_string(),
            phone: "9800000000".to_string(),
        };

        assert!(matches!(
            service.initiate_rental(7, renter).await,
            Err(AppError::Internal(_))
        ));
    }
}
