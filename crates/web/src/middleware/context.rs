//! Per-request context: session, current user, their grants and cookies.
//!
//! Handlers take a [`RequestContext`] instead of reaching for ambient state.
//! The user is reloaded from the database on every request, so deactivating
//! an account or revoking a permission takes effect immediately.

use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{header, request::Parts},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tower_sessions::cookie::Cookie;

use mysite_core::{Permission, UserId};

use super::authz::{Decision, Operation};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{User, session_keys};
use crate::state::AppState;

/// Everything a handler needs to know about the caller.
pub struct RequestContext {
    session: Session,
    user: Option<User>,
    permissions: BTreeSet<Permission>,
    cookies: HashMap<String, String>,
    path: String,
    login_url: String,
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let users = UserRepository::new(state.pool());
        let user = match session.get::<UserId>(session_keys::USER_ID).await? {
            Some(id) => users.get_by_id(id).await?.filter(|u| u.is_active),
            None => None,
        };
        let permissions = match &user {
            Some(user) => users.permissions(user.id).await?,
            None => BTreeSet::new(),
        };

        // Nested routers see a stripped URI; `next` needs the full one.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        let path = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string);

        Ok(Self {
            session,
            user,
            permissions,
            cookies: parse_cookies(parts),
            path,
            login_url: state.config().login_url.clone(),
        })
    }
}

impl RequestContext {
    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Value of a request cookie.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Check the caller against the operation's policy.
    ///
    /// # Errors
    ///
    /// Returns `AppError::LoginRequired` for anonymous callers of
    /// login-required operations, `AppError::Forbidden` otherwise.
    pub fn authorize(&self, operation: Operation) -> Result<(), AppError> {
        let caller = self.user.as_ref().map(|u| (u, &self.permissions));
        match operation.policy().decide(caller) {
            Decision::Allow => Ok(()),
            Decision::RedirectToLogin => Err(AppError::LoginRequired {
                location: login_redirect(&self.login_url, &self.path),
            }),
            Decision::Forbidden => {
                tracing::debug!(?operation, path = %self.path, "access denied");
                Err(AppError::Forbidden)
            }
        }
    }

    /// Start an authenticated session for `user`.
    ///
    /// The session ID is rotated first so a pre-login ID cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    /// Returns `AppError::Database` if the user's grants cannot be loaded.
    pub async fn login(&mut self, pool: &SqlitePool, user: User) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.session.insert(session_keys::USER_ID, user.id).await?;
        self.permissions = UserRepository::new(pool).permissions(user.id).await?;
        self.user = Some(user);
        Ok(())
    }

    /// Drop all session data and the session itself.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn logout(&mut self) -> Result<(), AppError> {
        self.session.flush().await?;
        self.user = None;
        self.permissions.clear();
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_cookies(parts: &Parts) -> HashMap<String, String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect()
}

/// `{login_url}?next={path}` with the path percent-encoded except for `/`.
#[must_use]
pub fn login_redirect(login_url: &str, path: &str) -> String {
    let next = urlencoding::encode(path).replace("%2F", "/");
    format!("{login_url}?next={next}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_slashes() {
        assert_eq!(
            login_redirect("/accounts/login/", "/shop/orders/"),
            "/accounts/login/?next=/shop/orders/"
        );
        assert_eq!(
            login_redirect("/accounts/login/", "/shop/orders/?page=2"),
            "/accounts/login/?next=/shop/orders/%3Fpage%3D2"
        );
    }

    #[test]
    fn test_parse_cookies() {
        let request = axum::http::Request::builder()
            .header(header::COOKIE, "fizz=buzz; other=1")
            .header(header::COOKIE, "last=x")
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();
        let cookies = parse_cookies(&parts);
        assert_eq!(cookies.get("fizz").map(String::as_str), Some("buzz"));
        assert_eq!(cookies.get("other").map(String::as_str), Some("1"));
        assert_eq!(cookies.get("last").map(String::as_str), Some("x"));
        parts.headers.clear();
        assert!(parse_cookies(&parts).is_empty());
    }
}
