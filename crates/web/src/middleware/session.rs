//! Session middleware configuration.
//!
//! Sets up `SQLite`-backed sessions using tower-sessions. Cookies are signed
//! with the configured session secret when the layer is installed.

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use tower_sessions::cookie::{Key, KeyError};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mysite_session";

/// Session expiry time in seconds (2 weeks).
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Create the session layer with `SQLite` store.
///
/// The `tower_sessions` table must already exist (see [`crate::db::migrate`]).
///
/// # Arguments
///
/// * `pool` - `SQLite` connection pool
/// * `config` - Web configuration (for determining HTTPS mode)
#[must_use]
pub fn create_session_layer(
    pool: &SqlitePool,
    config: &WebConfig,
) -> SessionManagerLayer<SqliteStore> {
    let store = SqliteStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Derive the cookie signing key from the session secret.
///
/// # Errors
///
/// Returns `KeyError` if the secret is shorter than 64 bytes.
pub fn session_key(config: &WebConfig) -> Result<Key, KeyError> {
    Key::try_from(config.session_secret.expose_secret().as_bytes())
}
