//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Pago capturado por la pasarela para un vehículo que ya está alquilado
    #[error("Rental conflict: vehicle {vehicle_id} already rented (transaction {transaction_id})")]
    RentalConflict {
        vehicle_id: i64,
        transaction_id: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payment initiation failed: {message}")]
    PaymentInitiation {
        message: String,
        details: serde_json::Value,
    },

    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código HTTP asociado a cada variante
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::PaymentInitiation { .. }
            | AppError::PaymentVerification(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::RentalConflict { .. } => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            AppError::Database(e) => {
                tracing::error!("❌ Database error: {}", e);
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "An error occurred while accessing the database".to_string(),
                    details: None,
                    code: Some("DB_ERROR".to_string()),
                }
            }

            AppError::Validation(e) => {
                tracing::warn!("⚠️ Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code: Some("VALIDATION_ERROR".to_string()),
                }
            }

            AppError::Unauthorized(msg) => {
                tracing::warn!("🔒 Unauthorized access: {}", msg);
                ErrorResponse {
                    error: "Unauthorized".to_string(),
                    message: msg,
                    details: None,
                    code: Some("UNAUTHORIZED".to_string()),
                }
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("🚫 Forbidden access: {}", msg);
                ErrorResponse {
                    error: "Forbidden".to_string(),
                    message: msg,
                    details: None,
                    code: Some("FORBIDDEN".to_string()),
                }
            }

            AppError::NotFound(msg) => {
                tracing::info!("🔍 Resource not found: {}", msg);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: msg,
                    details: None,
                    code: Some("NOT_FOUND".to_string()),
                }
            }

            AppError::Conflict(msg) => {
                tracing::warn!("⚠️ Conflict: {}", msg);
                ErrorResponse {
                    error: "Conflict".to_string(),
                    message: msg,
                    details: None,
                    code: Some("CONFLICT".to_string()),
                }
            }

            AppError::RentalConflict { vehicle_id, transaction_id } => {
                // El dinero ya fue capturado: requiere intervención manual
                tracing::error!(
                    "💸 Double booking: vehicle {} already rented, payment {} needs manual review",
                    vehicle_id,
                    transaction_id
                );
                ErrorResponse {
                    error: "Rental Conflict".to_string(),
                    message: "The vehicle was rented by someone else. Your payment was received and will be reviewed manually".to_string(),
                    details: Some(json!({
                        "vehicle_id": vehicle_id,
                        "transaction_id": transaction_id,
                    })),
                    code: Some("DOUBLE_BOOKING".to_string()),
                }
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("⚠️ Bad request: {}", msg);
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: msg,
                    details: None,
                    code: Some("BAD_REQUEST".to_string()),
                }
            }

            AppError::PaymentInitiation { message, details } => {
                tracing::warn!("💳 Payment initiation failed: {}", message);
                ErrorResponse {
                    error: "Failed to initiate payment".to_string(),
                    message,
                    details: Some(details),
                    code: Some("PAYMENT_INITIATION_FAILED".to_string()),
                }
            }

            AppError::PaymentVerification(reason) => {
                tracing::warn!("💳 Payment verification failed: {}", reason);
                ErrorResponse {
                    error: "Payment verification failed".to_string(),
                    message: "Payment failed, please try again".to_string(),
                    details: None,
                    code: Some("PAYMENT_VERIFICATION_FAILED".to_string()),
                }
            }

            AppError::Jwt(msg) => {
                tracing::warn!("🔒 JWT error: {}", msg);
                ErrorResponse {
                    error: "JWT Error".to_string(),
                    message: msg,
                    details: None,
                    code: Some("JWT_ERROR".to_string()),
                }
            }

            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    details: None,
                    code: Some("INTERNAL_ERROR".to_string()),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

/// Traducir errores de PostgreSQL a errores de la aplicación
///
/// `23505` (unique) pasa a conflicto y `23503` (foreign key) a solicitud incorrecta.
pub fn map_db_error(context: &str, error: sqlx::Error) -> AppError {
    let code = error
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    match constraint_error(context, code.as_deref()) {
        Some(mapped) => mapped,
        None => {
            tracing::error!("❌ {}: {}", context, error);
            AppError::Database(error)
        }
    }
}

fn constraint_error(context: &str, code: Option<&str>) -> Option<AppError> {
    match code? {
        "23505" => Some(AppError::Conflict(format!("{}: duplicate value", context))),
        "23503" => Some(AppError::BadRequest(format!(
            "{}: referenced record does not exist",
            context
        ))),
        _ => None,
    }
}
