//! Controladores
//!
//! Lógica de cada recurso entre los handlers HTTP y el store.

pub mod review_controller;
pub mod transaction_controller;
pub mod vehicle_controller;

pub use review_controller::ReviewController;
pub use transaction_controller::TransactionController;
pub use vehicle_controller::VehicleController;
