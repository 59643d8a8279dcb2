use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::controllers::review_controller::ReviewController;
use crate::dto::api_response::ApiResponse;
use crate::dto::review_dto::{CreateReviewRequest, ReviewResponse};
use crate::middleware::auth::{Authorized, CustomerOnly};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Se monta junto a las rutas de vehículos: `/api/vehicles/:id/reviews`
pub fn create_review_router() -> Router<AppState> {
    Router::new().route("/:id/reviews", post(create_review))
}

async fn create_review(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Path(vehicle_id): Path<i64>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), AppError> {
    let controller = ReviewController::new(state.store.clone());
    let response = controller.create(vehicle_id, auth.user.id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
