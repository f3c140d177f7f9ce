//! Cookie and session demonstration endpoints.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use tower_sessions::cookie::{Cookie, time::Duration};

use crate::error::AppError;
use crate::middleware::{Operation, RequestContext};
use crate::models::session_keys;

/// Name of the demo cookie.
pub const DEMO_COOKIE: &str = "fizz";

const DEMO_COOKIE_VALUE: &str = "buzz";
const DEMO_SESSION_VALUE: &str = "spameggs";

/// Set `fizz=buzz` for one hour. Superusers only.
pub async fn set_cookie(ctx: RequestContext) -> Result<Response, AppError> {
    ctx.authorize(Operation::CookieSet)?;

    let cookie = Cookie::build((DEMO_COOKIE, DEMO_COOKIE_VALUE))
        .path("/")
        .max_age(Duration::hours(1))
        .build();

    Ok(([(header::SET_COOKIE, cookie.to_string())], "Cookie set").into_response())
}

/// Echo the demo cookie.
pub async fn get_cookie(ctx: RequestContext) -> Result<String, AppError> {
    ctx.authorize(Operation::CookieGet)?;

    let value = ctx.cookie(DEMO_COOKIE).unwrap_or("default value");
    Ok(format!("Cookie value: {}", quoted(value)))
}

/// Store `foobar` in the caller's session.
pub async fn set_session(ctx: RequestContext) -> Result<&'static str, AppError> {
    ctx.authorize(Operation::SessionSet)?;

    ctx.session()
        .insert(session_keys::FOOBAR, DEMO_SESSION_VALUE)
        .await?;
    Ok("Session set!")
}

/// Echo `foobar` from the caller's session.
pub async fn get_session(ctx: RequestContext) -> Result<String, AppError> {
    ctx.authorize(Operation::SessionGet)?;

    let value = ctx
        .session()
        .get::<String>(session_keys::FOOBAR)
        .await?
        .unwrap_or_else(|| "default".to_string());
    Ok(format!("Session value: {}", quoted(&value)))
}

/// Quote a value, switching to double quotes when it contains only single ones.
fn quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\");
    if value.contains('\'') && !value.contains('"') {
        format!("\"{escaped}\"")
    } else {
        format!("'{}'", escaped.replace('\'', "\\'"))
    }
}
