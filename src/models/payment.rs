//! Modelos de pago
//!
//! Una sesión de pago solo existe en la pasarela: se identifica por su
//! `pidx`, el `purchase_order_id` (id del vehículo) y el `transaction_id`
//! generado al iniciarla. Nada de esto se persiste localmente.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Estado de un pago según la consulta a la pasarela
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
    Unknown,
}

impl PaymentStatus {
    /// Mapear el `status` textual que devuelve Khalti
    pub fn from_gateway(status: &str) -> Self {
        match status {
            "Completed" => PaymentStatus::Completed,
            "Pending" | "Initiated" => PaymentStatus::Pending,
            "Expired" | "User canceled" | "Refunded" | "Partially Refunded" => PaymentStatus::Failed,
            _ => PaymentStatus::Unknown,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Datos del pagador enviados a la pasarela
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenterIdentity {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Solicitud para abrir una sesión de pago
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub vehicle_id: i64,
    pub vehicle_name: String,
    pub merchant_username: String,
    pub renter: RenterIdentity,
    pub amount: i64,
}

/// Sesión abierta en la pasarela
#[derive(Debug, Clone, PartialEq)]
pub struct InitiatedPayment {
    pub payment_url: String,
    pub pidx: Option<String>,
    pub transaction_id: String,
    pub purchase_order_id: String,
}

/// Resultado de `lookup`
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLookup {
    pub pidx: String,
    pub status: PaymentStatus,
    pub gateway_status: String,
    pub total_amount: Option<i64>,
}

/// Parámetros de la redirección de vuelta desde la pasarela
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCallback {
    pub pidx: String,
    pub transaction_id: String,
    pub vehicle_id: i64,
}

/// Confirmación que consume la máquina de estados de alquiler
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub pidx: String,
    pub status: PaymentStatus,
    pub vehicle_id: i64,
    pub transaction_id: String,
    pub total_amount: Option<i64>,
    pub payer_id: i64,
}
