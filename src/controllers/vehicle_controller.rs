use std::sync::Arc;

use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::review_dto::ReviewResponse;
use crate::dto::vehicle_dto::{
    CreateVehicleRequest, UpdateVehicleRequest, VehicleCatalogResponse, VehicleDetailResponse,
    VehicleResponse,
};
use crate::models::vehicle::{RentalState, VehicleChanges};
use crate::repositories::RentalStore;
use crate::utils::errors::{not_found_error, AppResult};

pub struct VehicleController {
    store: Arc<dyn RentalStore>,
}

impl VehicleController {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        owner_id: i64,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;

        let vehicle = self
            .store
            .create_vehicle(request.into_new_vehicle(owner_id))
            .await?;

        log::info!("🚗 Vehículo {} registrado por propietario {}", vehicle.id, owner_id);

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle created successfully",
        ))
    }

    pub async fn update(
        &self,
        id: i64,
        owner_id: i64,
        request: UpdateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;

        let vehicle = self
            .store
            .update_vehicle(id, owner_id, VehicleChanges::from(request))
            .await?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle updated successfully",
        ))
    }

    pub async fn delete(&self, id: i64, owner_id: i64) -> AppResult<ApiResponse<VehicleResponse>> {
        let vehicle = self.store.soft_delete_vehicle(id, owner_id).await?;

        log::info!("🗑️ Vehículo {} dado de baja por propietario {}", id, owner_id);

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle deleted successfully",
        ))
    }

    pub async fn catalog(&self) -> AppResult<VehicleCatalogResponse> {
        let vehicles = self.store.list_listed_vehicles().await?;
        Ok(VehicleCatalogResponse::from_vehicles(vehicles))
    }

    pub async fn detail(&self, id: i64) -> AppResult<VehicleDetailResponse> {
        let vehicle = self
            .store
            .find_vehicle(id)
            .await?
            .filter(|v| v.is_listed())
            .ok_or_else(|| not_found_error("Vehicle", id))?;

        let reviews = self.store.list_reviews(id).await?;

        Ok(VehicleDetailResponse {
            vehicle: VehicleResponse::from(vehicle),
            reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
        })
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.store.list_owner_vehicles(owner_id).await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    /// Vehículos del propietario que están alquilados ahora mismo
    pub async fn on_rent_by_owner(&self, owner_id: i64) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.store.list_owner_vehicles(owner_id).await?;
        Ok(vehicles
            .into_iter()
            .filter(|v| v.state() == RentalState::Rented)
            .map(VehicleResponse::from)
            .collect())
    }

    /// Panel del arrendatario
    pub async fn rented_by(&self, renter_id: i64) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.store.list_rented_by(renter_id).await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }
}
