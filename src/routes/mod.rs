//! Rutas HTTP
//!
//! Cada recurso expone su `create_*_router`; `create_app_router` los monta
//! bajo `/api` con las capas de trazas y CORS.

pub mod admin_routes;
pub mod owner_routes;
pub mod payment_routes;
pub mod rental_routes;
pub mod review_routes;
pub mod vehicle_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/vehicles",
            vehicle_routes::create_vehicle_router().merge(review_routes::create_review_router()),
        )
        .nest("/api/owner", owner_routes::create_owner_router())
        .nest("/api/rentals", rental_routes::create_rental_router())
        .nest("/api/payments", payment_routes::create_payment_router())
        .nest("/api/admin", admin_routes::create_admin_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "vehicle-rental",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
