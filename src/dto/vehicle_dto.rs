use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::review_dto::ReviewResponse;
use crate::models::vehicle::{NewVehicle, RentalState, Vehicle, VehicleChanges};
use crate::utils::validation::validate_not_blank;

// Request para registrar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub vehicle_model: String,
    #[validate(range(min = 0))]
    pub rent_price: i64,
    pub category_id: i64,
    #[validate(length(max = 250))]
    pub description: Option<String>,
}

impl CreateVehicleRequest {
    pub fn into_new_vehicle(self, owner_id: i64) -> NewVehicle {
        NewVehicle {
            vehicle_model: self.vehicle_model.trim().to_string(),
            rent_price: self.rent_price,
            category_id: self.category_id,
            description: self.description,
            owner_id,
        }
    }
}

// Request para editar un vehículo; disponibilidad y arrendatario no se tocan aquí
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub vehicle_model: Option<String>,
    #[validate(range(min = 0))]
    pub rent_price: Option<i64>,
    pub category_id: Option<i64>,
    #[validate(length(max = 250))]
    pub description: Option<String>,
}

impl From<UpdateVehicleRequest> for VehicleChanges {
    fn from(request: UpdateVehicleRequest) -> Self {
        VehicleChanges {
            vehicle_model: request.vehicle_model.map(|m| m.trim().to_string()),
            rent_price: request.rent_price,
            category_id: request.category_id,
            description: request.description,
        }
    }
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: i64,
    pub vehicle_model: String,
    pub rent_price: i64,
    pub category_id: i64,
    pub description: Option<String>,
    pub owner_id: i64,
    pub rented_by: Option<i64>,
    pub available: bool,
    pub state: RentalState,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        let state = vehicle.state();
        Self {
            id: vehicle.id,
            vehicle_model: vehicle.vehicle_model,
            rent_price: vehicle.rent_price,
            category_id: vehicle.category_id,
            description: vehicle.description,
            owner_id: vehicle.owner_id,
            rented_by: vehicle.rented_by,
            available: vehicle.available,
            state,
            created_at: vehicle.created_at,
        }
    }
}

/// Catálogo público separado por disponibilidad
#[derive(Debug, Serialize)]
pub struct VehicleCatalogResponse {
    pub available: Vec<VehicleResponse>,
    pub unavailable: Vec<VehicleResponse>,
}

impl VehicleCatalogResponse {
    pub fn from_vehicles(vehicles: Vec<Vehicle>) -> Self {
        let (available, unavailable): (Vec<_>, Vec<_>) =
            vehicles.into_iter().partition(|v| v.available);

        Self {
            available: available.into_iter().map(VehicleResponse::from).collect(),
            unavailable: unavailable.into_iter().map(VehicleResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VehicleDetailResponse {
    pub vehicle: VehicleResponse,
    pub reviews: Vec<ReviewResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let request = CreateVehicleRequest {
            vehicle_model: "   ".to_string(),
            rent_price: -5,
            category_id: 1,
            description: None,
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("vehicle_model"));
        assert!(fields.contains_key("rent_price"));
    }

    #[test]
    fn test_catalog_splits_by_availability() {
        let vehicle = |id: i64, available: bool| Vehicle {
            id,
            vehicle_model: format!("Model {}", id),
            rent_price: 1000,
            category_id: 1,
            description: None,
            owner_id: 10,
            rented_by: if available { None } else { Some(42) },
            available,
            is_deleted: false,
            created_at: Utc::now(),
        };

        let catalog = VehicleCatalogResponse::from_vehicles(vec![
            vehicle(1, true),
            vehicle(2, false),
            vehicle(3, true),
        ]);

        assert_eq!(catalog.available.len(), 2);
        assert_eq!(catalog.unavailable.len(), 1);
        assert_eq!(catalog.unavailable[0].state, RentalState::Rented);
    }
}
