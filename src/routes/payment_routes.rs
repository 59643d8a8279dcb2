use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::dto::payment_dto::{InitiatePaymentRequest, VerifyPaymentQuery};
use crate::middleware::auth::{Authorized, CustomerOnly};
use crate::services::rental_service::NotificationStatus;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(initiate_payment))
        .route("/verify", get(verify_payment))
}

/// Abre la sesión en Khalti y redirige al cliente a `payment_url`
async fn initiate_payment(
    State(state): State<AppState>,
    _auth: Authorized<CustomerOnly>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<Redirect, AppError> {
    request.validate()?;

    let payment = state
        .rental_service()
        .initiate_rental(request.vehicle_id, request.renter())
        .await?;

    Ok(Redirect::to(&payment.payment_url))
}

/// Vuelta desde Khalti: lookup → apply → aviso, y redirección al panel
async fn verify_payment(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Query(query): Query<VerifyPaymentQuery>,
) -> Result<Redirect, AppError> {
    let callback = query.into_callback()?;
    let outcome = state
        .rental_service()
        .verify_payment(auth.user.id, callback)
        .await?;

    if outcome.notification != NotificationStatus::Sent {
        log::warn!(
            "⚠️ Alquiler de vehículo {} confirmado sin aviso al propietario: {:?}",
            outcome.record.vehicle.id,
            outcome.notification
        );
    }

    Ok(Redirect::to(&state.config.renter_dashboard_url))
}
