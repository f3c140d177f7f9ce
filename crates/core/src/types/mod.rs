//! Core types for mysite.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod permission;
pub mod price;
pub mod status;
pub mod username;

pub use id::*;
pub use permission::{Permission, PermissionError};
pub use price::{Price, PriceError};
pub use status::ProductStatus;
pub use username::{Username, UsernameError};
