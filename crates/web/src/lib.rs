//! mysite web application library.
//!
//! This crate provides the shop and accounts site as a library, allowing it
//! to be driven by the binary, the CLI and the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::cookie::KeyError;
use tracing::Span;

use crate::state::AppState;

/// Build the full router: routes, signed sessions and HTTP tracing.
///
/// Sentry layers are left to the binary so tests run without a client.
///
/// # Errors
///
/// Returns `KeyError` if the session secret is too short to sign cookies.
pub fn app(state: AppState) -> Result<Router, KeyError> {
    let key = middleware::session_key(state.config())?;
    let session_layer =
        middleware::create_session_layer(state.pool(), state.config()).with_signed(key);

    Ok(routes::routes()
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state))
}
