use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::transaction_controller::TransactionController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::transaction_dto::TransactionResponse;
use crate::dto::vehicle_dto::VehicleResponse;
use crate::middleware::auth::{Authorized, CustomerOnly};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_rental_router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(my_rentals))
        .route("/transactions", get(my_transactions))
}

/// Panel del arrendatario: vehículos que tiene alquilados
async fn my_rentals(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.rented_by(auth.user.id).await?;
    Ok(Json(response))
}

async fn my_transactions(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.store.clone());
    let response = controller.list_for_user(auth.user.id).await?;
    Ok(Json(response))
}
