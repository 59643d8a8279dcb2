use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::VehicleResponse;
use crate::middleware::auth::{Authorized, OwnerOnly};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_owner_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_my_vehicles))
        .route("/on-rent", get(list_on_rent))
        .route("/vehicles/:id/returned", post(mark_returned))
}

async fn list_my_vehicles(
    State(state): State<AppState>,
    auth: Authorized<OwnerOnly>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.list_by_owner(auth.user.id).await?;
    Ok(Json(response))
}

async fn list_on_rent(
    State(state): State<AppState>,
    auth: Authorized<OwnerOnly>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.on_rent_by_owner(auth.user.id).await?;
    Ok(Json(response))
}

async fn mark_returned(
    State(state): State<AppState>,
    auth: Authorized<OwnerOnly>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let vehicle = state.rental_service().mark_returned(id, auth.user.id).await?;
    Ok(Json(ApiResponse::success_with_message(
        VehicleResponse::from(vehicle),
        "Vehicle marked as returned",
    )))
}
