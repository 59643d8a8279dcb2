use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reseña de un vehículo - mapea a la tabla reviews
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Review {
    pub id: i64,
    pub vehicle_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub vehicle_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: String,
}
