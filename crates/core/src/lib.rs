//! mysite core - shared domain types.
//!
//! Used by every mysite component:
//! - `web` - shop and accounts web application
//! - `cli` - migrations, user management and fixture loading
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encoding for the ID types is available behind the
//! `sqlite` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, usernames, product status and permissions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
