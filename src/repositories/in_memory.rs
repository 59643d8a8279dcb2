use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{ReviewStore, TransactionStore, UserDirectory, VehicleStore};
use crate::models::rent_transaction::{RentCommand, RentTransaction, RentalRecord};
use crate::models::review::{NewReview, Review};
use crate::models::user::UserAccount;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleChanges};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
struct Tables {
    categories: HashMap<i64, String>,
    users: HashMap<i64, UserAccount>,
    vehicles: BTreeMap<i64, Vehicle>,
    transactions: Vec<RentTransaction>,
    reviews: Vec<Review>,
    last_vehicle_id: i64,
    last_transaction_id: i64,
    last_review_id: i64,
}

impl Tables {
    fn vehicle_mut(&mut self, id: i64) -> AppResult<&mut Vehicle> {
        self.vehicles
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    fn ensure_category(&self, category_id: i64) -> AppResult<()> {
        if self.categories.contains_key(&category_id) {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!("Category {} does not exist", category_id)))
        }
    }
}

/// Store en memoria para tests y desarrollo local.
///
/// Un único `Mutex` protege todas las tablas, así que cada operación
/// (incluido el check-and-set de `rent_vehicle`) es atómica.
#[derive(Default, Clone)]
pub struct InMemoryRentalStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRentalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_category(&self, id: i64, name: &str) {
        let mut tables = self.tables.lock().await;
        tables.categories.insert(id, name.to_string());
    }

    pub async fn insert_user(&self, user: UserAccount) {
        let mut tables = self.tables.lock().await;
        tables.users.insert(user.id, user);
    }

    /// Insertar un vehículo con su id tal cual (fixtures)
    pub async fn insert_vehicle(&self, vehicle: Vehicle) {
        let mut tables = self.tables.lock().await;
        tables.last_vehicle_id = tables.last_vehicle_id.max(vehicle.id);
        tables.vehicles.insert(vehicle.id, vehicle);
    }
}

#[async_trait]
impl VehicleStore for InMemoryRentalStore {
    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.lock().await;
        tables.ensure_category(vehicle.category_id)?;

        tables.last_vehicle_id += 1;
        let created = Vehicle {
            id: tables.last_vehicle_id,
            vehicle_model: vehicle.vehicle_model,
            rent_price: vehicle.rent_price,
            category_id: vehicle.category_id,
            description: vehicle.description,
            owner_id: vehicle.owner_id,
            rented_by: None,
            available: true,
            is_deleted: false,
            created_at: Utc::now(),
        };
        tables.vehicles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<Vehicle>> {
        let tables = self.tables.lock().await;
        Ok(tables.vehicles.get(&id).cloned())
    }

    async fn update_vehicle(&self, id: i64, owner_id: i64, changes: VehicleChanges) -> AppResult<Vehicle> {
        let mut tables = self.tables.lock().await;
        if let Some(category_id) = changes.category_id {
            tables.ensure_category(category_id)?;
        }

        let vehicle = tables.vehicle_mut(id)?;
        vehicle.ensure_owned_by(owner_id, "update vehicle")?;

        if let Some(model) = changes.vehicle_model {
            vehicle.vehicle_model = model;
        }
        if let Some(price) = changes.rent_price {
            vehicle.rent_price = price;
        }
        if let Some(category_id) = changes.category_id {
            vehicle.category_id = category_id;
        }
        if let Some(description) = changes.description {
            vehicle.description = Some(description);
        }
        Ok(vehicle.clone())
    }

    async fn soft_delete_vehicle(&self, id: i64, owner_id: i64) -> AppResult<Vehicle> {
        let mut tables = self.tables.lock().await;
        let vehicle = tables.vehicle_mut(id)?;
        vehicle.ensure_deletable(owner_id)?;
        vehicle.is_deleted = true;
        Ok(vehicle.clone())
    }

    async fn list_listed_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .vehicles
            .values()
            .rev()
            .filter(|v| v.is_listed())
            .cloned()
            .collect())
    }

    async fn list_owner_vehicles(&self, owner_id: i64) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .vehicles
            .values()
            .rev()
            .filter(|v| v.is_listed() && v.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_rented_by(&self, renter_id: i64) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .vehicles
            .values()
            .filter(|v| v.is_listed() && !v.available && v.rented_by == Some(renter_id))
            .cloned()
            .collect())
    }

    async fn rent_vehicle(&self, command: RentCommand) -> AppResult<RentalRecord> {
        let mut tables = self.tables.lock().await;

        if tables
            .transactions
            .iter()
            .any(|t| t.transaction_id == command.transaction_id || t.pidx == command.pidx)
        {
            return Err(AppError::RentalConflict {
                vehicle_id: command.vehicle_id,
                transaction_id: command.transaction_id,
            });
        }

        let vehicle = tables.vehicle_mut(command.vehicle_id)?;
        vehicle.ensure_rentable(&command.transaction_id)?;
        vehicle.ensure_paid(command.amount)?;
        vehicle.bind_renter(command.renter_id);
        let vehicle = vehicle.clone();

        tables.last_transaction_id += 1;
        let transaction = RentTransaction {
            id: tables.last_transaction_id,
            vehicle_id: command.vehicle_id,
            transaction_id: command.transaction_id,
            pidx: command.pidx,
            amount: command.amount,
            user_id: command.renter_id,
            date_rented: Utc::now(),
        };
        tables.transactions.push(transaction.clone());

        Ok(RentalRecord { vehicle, transaction })
    }

    async fn release_vehicle(&self, id: i64, owner_id: i64) -> AppResult<Vehicle> {
        let mut tables = self.tables.lock().await;
        let vehicle = tables.vehicle_mut(id)?;
        vehicle.ensure_returnable(owner_id)?;
        vehicle.release();
        Ok(vehicle.clone())
    }
}

#[async_trait]
impl TransactionStore for InMemoryRentalStore {
    async fn list_transactions_for_user(&self, user_id: i64) -> AppResult<Vec<RentTransaction>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all_transactions(&self) -> AppResult<Vec<RentTransaction>> {
        let tables = self.tables.lock().await;
        Ok(tables.transactions.iter().rev().cloned().collect())
    }

    async fn find_transaction(&self, transaction_id: &str) -> AppResult<Option<RentTransaction>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transactions
            .iter()
            .find(|t| t.transaction_id == transaction_id)
            .cloned())
    }
}

#[async_trait]
impl UserDirectory for InMemoryRentalStore {
    async fn find_user(&self, id: i64) -> AppResult<Option<UserAccount>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).cloned())
    }
}

#[async_trait]
impl ReviewStore for InMemoryRentalStore {
    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        let mut tables = self.tables.lock().await;
        if !tables.vehicles.contains_key(&review.vehicle_id) {
            return Err(not_found_error("Vehicle", review.vehicle_id));
        }

        tables.last_review_id += 1;
        let created = Review {
            id: tables.last_review_id,
            vehicle_id: review.vehicle_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        tables.reviews.push(created.clone());
        Ok(created)
    }

    async fn list_reviews(&self, vehicle_id: i64) -> AppResult<Vec<Review>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reviews
            .iter()
            .rev()
            .filter(|r| r.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_category() -> InMemoryRentalStore {
        let store = InMemoryRentalStore::new();
        store.insert_category(1, "SUV").await;
        store
    }

    fn new_vehicle(owner_id: i64) -> NewVehicle {
        NewVehicle {
            vehicle_model: "Mahindra Scorpio".to_string(),
            rent_price: 3500,
            category_id: 1,
            description: None,
            owner_id,
        }
    }

    fn rent(vehicle_id: i64, transaction_id: &str) -> RentCommand {
        RentCommand {
            vehicle_id,
            renter_id: 42,
            transaction_id: transaction_id.to_string(),
            pidx: format!("pidx-{}", transaction_id),
            amount: 3500,
        }
    }

    #[tokio::test]
    async fn test_create_vehicle_requires_known_category() {
        let store = store_with_category().await;
        let mut vehicle = new_vehicle(10);
        vehicle.category_id = 99;

        assert!(matches!(store.create_vehicle(vehicle).await, Err(AppError::BadRequest(_))));
        let created = store.create_vehicle(new_vehicle(10)).await.unwrap();
        assert!(created.available);
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn test_rent_and_release_cycle() {
        let store = store_with_category().await;
        let vehicle = store.create_vehicle(new_vehicle(10)).await.unwrap();

        let record = store.rent_vehicle(rent(vehicle.id, "tx-1")).await.unwrap();
        assert!(!record.vehicle.available);
        assert_eq!(record.vehicle.rented_by, Some(42));
        assert_eq!(store.list_rented_by(42).await.unwrap().len(), 1);

        let released = store.release_vehicle(vehicle.id, 10).await.unwrap();
        assert!(released.available);
        assert_eq!(released.rented_by, None);
        assert!(store.list_rented_by(42).await.unwrap().is_empty());

        // el historial sobrevive a la devolución
        assert!(store.find_transaction("tx-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_replayed_transaction_id_is_rejected_after_return() {
        let store = store_with_category().await;
        let vehicle = store.create_vehicle(new_vehicle(10)).await.unwrap();

        store.rent_vehicle(rent(vehicle.id, "tx-1")).await.unwrap();
        store.release_vehicle(vehicle.id, 10).await.unwrap();

        let replay = store.rent_vehicle(rent(vehicle.id, "tx-1")).await;
        assert!(matches!(replay, Err(AppError::RentalConflict { .. })));
        assert!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().available);
        assert_eq!(store.list_all_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_session_rents_a_single_vehicle() {
        let store = store_with_category().await;
        let first = store.create_vehicle(new_vehicle(10)).await.unwrap();
        let second = store.create_vehicle(new_vehicle(11)).await.unwrap();

        store.rent_vehicle(rent(first.id, "tx-1")).await.unwrap();

        let mut reused = rent(second.id, "tx-other");
        reused.pidx = "pidx-tx-1".to_string();
        let result = store.rent_vehicle(reused).await;

        assert!(matches!(
            result,
            Err(AppError::RentalConflict { ref transaction_id, .. }) if transaction_id == "tx-other"
        ));
        assert!(store.find_vehicle(second.id).await.unwrap().unwrap().available);
        assert_eq!(store.list_all_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_underpaid_rent_leaves_vehicle_available() {
        let store = store_with_category().await;
        let vehicle = store.create_vehicle(new_vehicle(10)).await.unwrap();

        let mut short = rent(vehicle.id, "tx-1");
        short.amount = 3499;

        assert!(matches!(
            store.rent_vehicle(short).await,
            Err(AppError::PaymentVerification(_))
        ));
        assert!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().available);
        assert!(store.list_all_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_vehicle_leaves_listings() {
        let store = store_with_category().await;
        let vehicle = store.create_vehicle(new_vehicle(10)).await.unwrap();

        store.soft_delete_vehicle(vehicle.id, 10).await.unwrap();

        assert!(store.list_listed_vehicles().await.unwrap().is_empty());
        assert!(store.list_owner_vehicles(10).await.unwrap().is_empty());
        assert!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().is_deleted);
        assert!(matches!(
            store.rent_vehicle(rent(vehicle.id, "tx-2")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_availability() {
        let store = store_with_category().await;
        let vehicle = store.create_vehicle(new_vehicle(10)).await.unwrap();
        store.rent_vehicle(rent(vehicle.id, "tx-1")).await.unwrap();

        let changes = VehicleChanges {
            rent_price: Some(4000),
            ..Default::default()
        };
        let updated = store.update_vehicle(vehicle.id, 10, changes).await.unwrap();
        assert_eq!(updated.rent_price, 4000);
        assert!(!updated.available);

        let forbidden = store.update_vehicle(vehicle.id, 11, VehicleChanges::default()).await;
        assert!(matches!(forbidden, Err(AppError::Forbidden(_))));
    }
}
