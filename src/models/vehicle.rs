//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, su estado de alquiler y las
//! reglas de transición que comparten todos los stores.
//!
//! Invariante: `rented_by.is_some()` implica `available == false`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Estado de alquiler derivado del flag `available`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalState {
    Available,
    Rented,
}

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: i64,
    pub vehicle_model: String,
    pub rent_price: i64,
    pub category_id: i64,
    pub description: Option<String>,
    pub owner_id: i64,
    pub rented_by: Option<i64>,
    pub available: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Datos para registrar un vehículo nuevo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub vehicle_model: String,
    pub rent_price: i64,
    pub category_id: i64,
    pub description: Option<String>,
    pub owner_id: i64,
}

/// Cambios editables por el propietario (nunca disponibilidad ni arrendatario)
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub vehicle_model: Option<String>,
    pub rent_price: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

impl Vehicle {
    pub fn state(&self) -> RentalState {
        if self.available {
            RentalState::Available
        } else {
            RentalState::Rented
        }
    }

    /// Visible en los listados de clientes
    pub fn is_listed(&self) -> bool {
        !self.is_deleted
    }

    /// Precondición de `Available -> Rented`
    pub fn ensure_rentable(&self, transaction_id: &str) -> AppResult<()> {
        if self.is_deleted {
            return Err(not_found_error("Vehicle", self.id));
        }
        if self.state() == RentalState::Rented {
            return Err(AppError::RentalConflict {
                vehicle_id: self.id,
                transaction_id: transaction_id.to_string(),
            });
        }
        Ok(())
    }

    /// El importe cobrado debe cubrir el precio del alquiler
    pub fn ensure_paid(&self, amount: i64) -> AppResult<()> {
        if amount < self.rent_price {
            return Err(AppError::PaymentVerification(format!(
                "paid amount {} is below the rent price {} of vehicle {}",
                amount, self.rent_price, self.id
            )));
        }
        Ok(())
    }

    /// Precondición de `Rented -> Available`
    pub fn ensure_returnable(&self, owner_id: i64) -> AppResult<()> {
        self.ensure_owned_by(owner_id, "mark vehicle as returned")?;
        if self.state() == RentalState::Available {
            return Err(AppError::Conflict(format!(
                "Vehicle {} is not currently rented",
                self.id
            )));
        }
        Ok(())
    }

    /// Precondición del borrado lógico
    pub fn ensure_deletable(&self, owner_id: i64) -> AppResult<()> {
        self.ensure_owned_by(owner_id, "delete vehicle")?;
        if self.state() == RentalState::Rented {
            return Err(AppError::Conflict(format!(
                "Vehicle {} is currently rented and cannot be deleted",
                self.id
            )));
        }
        Ok(())
    }

    /// El propietario es inmutable; solo él puede modificar el vehículo
    pub fn ensure_owned_by(&self, owner_id: i64, operation: &str) -> AppResult<()> {
        if self.is_deleted {
            return Err(not_found_error("Vehicle", self.id));
        }
        if self.owner_id != owner_id {
            return Err(crate::utils::errors::forbidden_error(
                operation,
                "vehicle belongs to another owner",
            ));
        }
        Ok(())
    }

    /// Aplicar la transición `Available -> Rented` en memoria
    pub fn bind_renter(&mut self, renter_id: i64) {
        self.available = false;
        self.rented_by = Some(renter_id);
    }

    /// Aplicar la transición `Rented -> Available` en memoria
    ///
    /// El arrendatario se limpia; el historial queda en `rent_transactions`.
    pub fn release(&mut self) {
        self.available = true;
        self.rented_by = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(available: bool) -> Vehicle {
        Vehicle {
            id: 7,
            vehicle_model: "Toyota Hilux".to_string(),
            rent_price: 1000,
            category_id: 1,
            description: None,
            owner_id: 10,
            rented_by: if available { None } else { Some(42) },
            available,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rentable_only_when_available() {
        assert!(vehicle(true).ensure_rentable("tx-1").is_ok());
        assert!(matches!(
            vehicle(false).ensure_rentable("tx-1"),
            Err(AppError::RentalConflict { vehicle_id: 7, .. })
        ));
    }

    #[test]
    fn test_deleted_vehicle_is_not_rentable() {
        let mut v = vehicle(true);
        v.is_deleted = true;
        assert!(matches!(v.ensure_rentable("tx-1"), Err(AppError::NotFound(_))));
        assert!(!v.is_listed());
    }

    #[test]
    fn test_underpayment_does_not_cover_rent() {
        assert!(vehicle(true).ensure_paid(1000).is_ok());
        assert!(vehicle(true).ensure_paid(1500).is_ok());
        assert!(matches!(
            vehicle(true).ensure_paid(999),
            Err(AppError::PaymentVerification(_))
        ));
    }

    #[test]
    fn test_return_requires_owner_and_rented_state() {
        assert!(vehicle(false).ensure_returnable(10).is_ok());
        assert!(matches!(vehicle(false).ensure_returnable(11), Err(AppError::Forbidden(_))));
        assert!(matches!(vehicle(true).ensure_returnable(10), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_rented_vehicle_cannot_be_deleted() {
        assert!(vehicle(true).ensure_deletable(10).is_ok());
        assert!(matches!(vehicle(false).ensure_deletable(10), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_transitions_keep_renter_invariant() {
        let mut v = vehicle(true);
        v.bind_renter(42);
        assert_eq!(v.state(), RentalState::Rented);
        assert_eq!(v.rented_by, Some(42));

        v.release();
        assert_eq!(v.state(), RentalState::Available);
        assert_eq!(v.rented_by, None);
    }
}
