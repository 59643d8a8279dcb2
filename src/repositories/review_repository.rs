use async_trait::async_trait;
use chrono::Utc;

use super::{PgRentalStore, ReviewStore};
use crate::models::review::{NewReview, Review};
use crate::utils::errors::{map_db_error, AppResult};

#[async_trait]
impl ReviewStore for PgRentalStore {
    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (vehicle_id, user_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(review.vehicle_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(review.comment)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Error creating review", e))
    }

    async fn list_reviews(&self, vehicle_id: i64) -> AppResult<Vec<Review>> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE vehicle_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Error listing reviews", e))
    }
}
