//! Modelo de RentTransaction
//!
//! Registro inmutable de un alquiler pagado. Solo se inserta, nunca se
//! actualiza ni se borra.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::vehicle::Vehicle;

/// Transacción de alquiler - mapea a la tabla rent_transactions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RentTransaction {
    pub id: i64,
    pub vehicle_id: i64,
    pub transaction_id: String,
    /// Sesión de pago de la pasarela que cubrió el alquiler
    pub pidx: String,
    pub amount: i64,
    pub user_id: i64,
    pub date_rented: DateTime<Utc>,
}

/// Comando de alquiler que el store aplica como un único check-and-set
#[derive(Debug, Clone, PartialEq)]
pub struct RentCommand {
    pub vehicle_id: i64,
    pub renter_id: i64,
    pub transaction_id: String,
    pub pidx: String,
    pub amount: i64,
}

/// Resultado de un alquiler confirmado: vehículo actualizado + fila del log
#[derive(Debug, Clone, Serialize)]
pub struct RentalRecord {
    pub vehicle: Vehicle,
    pub transaction: RentTransaction,
}
