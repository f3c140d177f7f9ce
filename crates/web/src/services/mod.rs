//! Business logic services.

pub mod auth;
pub mod export;
pub mod fixtures;
