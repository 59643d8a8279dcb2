use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::transaction_controller::TransactionController;
use crate::dto::transaction_dto::TransactionResponse;
use crate::middleware::auth::{AdminOnly, Authorized};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_admin_router() -> Router<AppState> {
    Router::new().route("/transactions", get(list_transactions))
}

async fn list_transactions(
    State(state): State<AppState>,
    _auth: Authorized<AdminOnly>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.store.clone());
    let response = controller.list_all().await?;
    Ok(Json(response))
}
