//! Backend de alquiler de vehículos
//!
//! Catálogo de vehículos, pago del alquiler por Khalti y la máquina de
//! estados `Available <-> Rented` que lo respalda.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
