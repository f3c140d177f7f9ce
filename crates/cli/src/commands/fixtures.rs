//! Fixture loading command.
//!
//! # Usage
//!
//! ```bash
//! mysite-cli fixtures load fixtures.json
//! ```
//!
//! See `mysite_web::services::fixtures` for the document format.

use std::path::Path;

use mysite_web::services::fixtures::{self, Fixtures};

use super::connect;

/// Load a fixture document into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if any row fails
/// to insert.
pub async fn load(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let document = Fixtures::from_json(&json)?;

    let pool = connect().await?;
    let summary = fixtures::load(&pool, &document).await?;

    tracing::info!(
        users = summary.users,
        products = summary.products,
        orders = summary.orders,
        "Loaded {}",
        path.display()
    );
    Ok(())
}
