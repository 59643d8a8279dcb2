//! Servicios de la aplicación
//!
//! Este módulo contiene la lógica de negocio: pasarela de pago,
//! máquina de estados de alquiler y avisos al propietario.

pub mod khalti_service;
pub mod notification_service;
pub mod rental_service;

pub use khalti_service::{KhaltiGateway, PaymentGateway, PaymentGatewayError};
pub use notification_service::{HttpMailer, LogNotifier, Notifier, RentalNotice};
pub use rental_service::{ApplyOutcome, NotificationStatus, RentalOutcome, RentalService};
