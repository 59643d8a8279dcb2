//! Repositorios
//!
//! Puertos de persistencia del sistema de alquiler y sus dos
//! implementaciones: PostgreSQL (`PgRentalStore`) y memoria
//! (`InMemoryRentalStore`).

pub mod in_memory;
pub mod review_repository;
pub mod transaction_repository;
pub mod user_repository;
pub mod vehicle_repository;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::rent_transaction::{RentCommand, RentTransaction, RentalRecord};
use crate::models::review::{NewReview, Review};
use crate::models::user::UserAccount;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleChanges};
use crate::utils::errors::AppResult;

pub use in_memory::InMemoryRentalStore;

/// Catálogo de vehículos
#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<Vehicle>>;

    async fn update_vehicle(&self, id: i64, owner_id: i64, changes: VehicleChanges) -> AppResult<Vehicle>;

    /// Borrado lógico; falla si el vehículo está alquilado
    async fn soft_delete_vehicle(&self, id: i64, owner_id: i64) -> AppResult<Vehicle>;

    /// Vehículos no borrados, visibles para clientes
    async fn list_listed_vehicles(&self) -> AppResult<Vec<Vehicle>>;

    async fn list_owner_vehicles(&self, owner_id: i64) -> AppResult<Vec<Vehicle>>;

    /// Vehículos alquilados actualmente por `renter_id`
    async fn list_rented_by(&self, renter_id: i64) -> AppResult<Vec<Vehicle>>;

    /// `Available -> Rented` + alta en el log de transacciones, todo o nada
    async fn rent_vehicle(&self, command: RentCommand) -> AppResult<RentalRecord>;

    /// `Rented -> Available`, solo para el propietario
    async fn release_vehicle(&self, id: i64, owner_id: i64) -> AppResult<Vehicle>;
}

/// Log de transacciones de alquiler (solo lectura; las altas van por `rent_vehicle`)
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn list_transactions_for_user(&self, user_id: i64) -> AppResult<Vec<RentTransaction>>;

    async fn list_all_transactions(&self) -> AppResult<Vec<RentTransaction>>;

    async fn find_transaction(&self, transaction_id: &str) -> AppResult<Option<RentTransaction>>;
}

/// Directorio de usuarios gestionado por el servicio de identidad
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: i64) -> AppResult<Option<UserAccount>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create_review(&self, review: NewReview) -> AppResult<Review>;

    async fn list_reviews(&self, vehicle_id: i64) -> AppResult<Vec<Review>>;
}

/// Store completo que consume la aplicación
pub trait RentalStore: VehicleStore + TransactionStore + UserDirectory + ReviewStore {}

impl<T> RentalStore for T where T: VehicleStore + TransactionStore + UserDirectory + ReviewStore {}

/// Store respaldado por PostgreSQL
#[derive(Clone)]
pub struct PgRentalStore {
    pool: PgPool,
}

impl PgRentalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
