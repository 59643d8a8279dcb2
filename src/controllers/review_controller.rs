use std::sync::Arc;

use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::review_dto::{CreateReviewRequest, ReviewResponse};
use crate::repositories::RentalStore;
use crate::utils::errors::{not_found_error, AppResult};

pub struct ReviewController {
    store: Arc<dyn RentalStore>,
}

impl ReviewController {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        vehicle_id: i64,
        user_id: i64,
        request: CreateReviewRequest,
    ) -> AppResult<ApiResponse<ReviewResponse>> {
        request.validate()?;

        // Solo se reseñan vehículos visibles en el catálogo
        self.store
            .find_vehicle(vehicle_id)
            .await?
            .filter(|v| v.is_listed())
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        let review = self
            .store
            .create_review(request.into_new_review(vehicle_id, user_id))
            .await?;

        Ok(ApiResponse::success_with_message(
            ReviewResponse::from(review),
            "Review submitted successfully",
        ))
    }
}
