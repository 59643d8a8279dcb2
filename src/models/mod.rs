//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean
//! al schema PostgreSQL del sistema de alquiler.

pub mod payment;
pub mod rent_transaction;
pub mod review;
pub mod user;
pub mod vehicle;
