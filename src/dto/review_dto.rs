use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::review::{NewReview, Review};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 1000), custom = "validate_not_blank")]
    pub comment: String,
}

impl CreateReviewRequest {
    pub fn into_new_review(self, vehicle_id: i64, user_id: i64) -> NewReview {
        NewReview {
            vehicle_id,
            user_id,
            rating: self.rating,
            comment: self.comment.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub vehicle_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            vehicle_id: review.vehicle_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}
