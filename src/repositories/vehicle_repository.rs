//! Catálogo de vehículos en PostgreSQL
//!
//! Las transiciones de alquiler son UPDATE condicionales: la condición
//! sobre `available` se evalúa con el lock de la fila, así que de dos
//! confirmaciones concurrentes solo una encuentra la fila disponible.

use async_trait::async_trait;
use chrono::Utc;

use super::{PgRentalStore, VehicleStore};
use crate::models::rent_transaction::{RentCommand, RentTransaction, RentalRecord};
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleChanges};
use crate::utils::errors::{map_db_error, not_found_error, AppError, AppResult};

impl PgRentalStore {
    /// Explicar por qué un UPDATE condicional no tocó ninguna fila
    async fn diagnose_rent_failure(&self, command: &RentCommand) -> AppError {
        match self.find_vehicle(command.vehicle_id).await {
            Ok(vehicle) => explain_rent_failure(vehicle, command),
            Err(e) => e,
        }
    }
}

fn explain_rent_failure(vehicle: Option<Vehicle>, command: &RentCommand) -> AppError {
    let Some(vehicle) = vehicle else {
        return not_found_error("Vehicle", command.vehicle_id);
    };

    match vehicle
        .ensure_rentable(&command.transaction_id)
        .and_then(|()| vehicle.ensure_paid(command.amount))
    {
        Err(e) => e,
        // la fila cambió entre el UPDATE y la lectura
        Ok(()) => AppError::RentalConflict {
            vehicle_id: command.vehicle_id,
            transaction_id: command.transaction_id.clone(),
        },
    }
}

/// Un 23505 al insertar la fila del log: `transaction_id` o `pidx` repetidos
fn rent_insert_error(command: &RentCommand, error: sqlx::Error) -> AppError {
    match map_db_error("Error recording rent transaction", error) {
        AppError::Conflict(_) => AppError::RentalConflict {
            vehicle_id: command.vehicle_id,
            transaction_id: command.transaction_id.clone(),
        },
        other => other,
    }
}

#[async_trait]
impl VehicleStore for PgRentalStore {
    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (vehicle_model, rent_price, category_id, description, owner_id, available, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, FALSE, $6)
            RETURNING *
            "#,
        )
        .bind(vehicle.vehicle_model)
        .bind(vehicle.rent_price)
        .bind(vehicle.category_id)
        .bind(vehicle.description)
        .bind(vehicle.owner_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Error creating vehicle", e))
    }

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Error finding vehicle", e))
    }

    async fn update_vehicle(&self, id: i64, owner_id: i64, changes: VehicleChanges) -> AppResult<Vehicle> {
        let current = self
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;
        current.ensure_owned_by(owner_id, "update vehicle")?;

        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET vehicle_model = COALESCE($3, vehicle_model),
                rent_price = COALESCE($4, rent_price),
                category_id = COALESCE($5, category_id),
                description = COALESCE($6, description)
            WHERE id = $1 AND owner_id = $2 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.vehicle_model)
        .bind(changes.rent_price)
        .bind(changes.category_id)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Error updating vehicle", e))?
        .ok_or_else(|| not_found_error("Vehicle", id))
    }

    async fn soft_delete_vehicle(&self, id: i64, owner_id: i64) -> AppResult<Vehicle> {
        let current = self
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;
        current.ensure_deletable(owner_id)?;

        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET is_deleted = TRUE
            WHERE id = $1 AND owner_id = $2 AND available = TRUE AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Error deleting vehicle", e))?
        .ok_or_else(|| AppError::Conflict(format!("Vehicle {} changed while deleting", id)))
    }

    async fn list_listed_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE is_deleted = FALSE ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Error listing vehicles", e))
    }

    async fn list_owner_vehicles(&self, owner_id: i64) -> AppResult<Vec<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE owner_id = $1 AND is_deleted = FALSE ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Error listing owner vehicles", e))
    }

    async fn list_rented_by(&self, renter_id: i64) -> AppResult<Vec<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE rented_by = $1 AND available = FALSE AND is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Error listing rented vehicles", e))
    }

    async fn rent_vehicle(&self, command: RentCommand) -> AppResult<RentalRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Error opening rental transaction", e))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET available = FALSE, rented_by = $2
            WHERE id = $1 AND available = TRUE AND is_deleted = FALSE AND rent_price <= $3
            RETURNING *
            "#,
        )
        .bind(command.vehicle_id)
        .bind(command.renter_id)
        .bind(command.amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("Error renting vehicle", e))?;

        let Some(vehicle) = vehicle else {
            // el drop de `tx` hace rollback
            drop(tx);
            return Err(self.diagnose_rent_failure(&command).await);
        };

        let transaction = sqlx::query_as::<_, RentTransaction>(
            r#"
            INSERT INTO rent_transactions (vehicle_id, transaction_id, pidx, amount, user_id, date_rented)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(command.vehicle_id)
        .bind(&command.transaction_id)
        .bind(&command.pidx)
        .bind(command.amount)
        .bind(command.renter_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| rent_insert_error(&command, e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Error committing rental", e))?;

        Ok(RentalRecord { vehicle, transaction })
    }

    async fn release_vehicle(&self, id: i64, owner_id: i64) -> AppResult<Vehicle> {
        let released = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET available = TRUE, rented_by = NULL
            WHERE id = $1 AND owner_id = $2 AND available = FALSE AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Error releasing vehicle", e))?;

        if let Some(vehicle) = released {
            return Ok(vehicle);
        }

        let current = self
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;
        current.ensure_returnable(owner_id)?;
        Err(AppError::Conflict(format!("Vehicle {} changed while returning", id)))
    }
}
