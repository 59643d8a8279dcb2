//! DTOs de la API
//!
//! Requests validados con `validator` y responses serializables.

pub mod api_response;
pub mod payment_dto;
pub mod review_dto;
pub mod transaction_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;
