//! Middleware del sistema
//!
//! Autenticación por JWT, control de acceso por rol y CORS.

pub mod auth;
pub mod cors;

pub use auth::*;
pub use cors::*;
