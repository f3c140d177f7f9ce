//! Test harness for driving the mysite router in-process.
//!
//! Every `TestApp` owns a private in-memory database, so tests can run in
//! parallel without sharing state.
//!
//! ```rust,ignore
//! let mut app = TestApp::with_fixtures().await;
//! app.login("manager", MANAGER_PASSWORD).await;
//! let response = app.get("/shop/orders/").await;
//! assert_eq!(response.status, StatusCode::OK);
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_sessions::cookie::Cookie;

use mysite_web::config::{DEFAULT_LOGIN_URL, WebConfig};
use mysite_web::db;
use mysite_web::services::fixtures::{self, Fixtures};
use mysite_web::state::AppState;

/// Shop fixture document: four users, four products (one archived), two orders.
pub const SHOP_FIXTURES: &str = include_str!("../fixtures/shop.json");

pub const ADMIN_PASSWORD: &str = "Adm1n-pass-word";
pub const MANAGER_PASSWORD: &str = "Man4ger-pass-word";
pub const VIEWER_PASSWORD: &str = "V1ewer-pass-word";
pub const PROFILER_PASSWORD: &str = "Prof1ler-pass-word";

const TEST_SESSION_SECRET: &str =
    "q7Vk2Lm9Xz4Rt8Wp1Bn6Jc3Hd5Fg0Sa7Ye2Ui9Oo4Pl8Kj1Mh6Nb3Vc5Xt0Zr7Qw2Er9Ty4Uu8Ii1Op6As3Df5Gh";

/// Configuration for an in-process test server.
#[must_use]
pub fn test_config() -> WebConfig {
    WebConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 8000,
        base_url: "http://localhost:8000".to_string(),
        session_secret: SecretString::from(TEST_SESSION_SECRET),
        login_url: DEFAULT_LOGIN_URL.to_string(),
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header, if any.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Every `Set-Cookie` header value.
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    /// Assert a 302 and return its target.
    pub fn redirect_target(&self) -> &str {
        assert_eq!(
            self.status,
            StatusCode::FOUND,
            "expected redirect, got body: {}",
            self.body
        );
        self.location().expect("redirect without Location")
    }
}

/// The router plus a cookie jar, acting like a single browser.
pub struct TestApp {
    router: Router,
    pool: SqlitePool,
    cookies: BTreeMap<String, String>,
}

impl TestApp {
    /// Empty migrated database.
    pub async fn new() -> Self {
        let pool = db::create_memory_pool().await.unwrap();
        db::migrate(&pool).await.unwrap();

        let state = AppState::new(test_config(), pool.clone());
        let router = mysite_web::app(state).unwrap();

        Self {
            router,
            pool,
            cookies: BTreeMap::new(),
        }
    }

    /// Database seeded with `SHOP_FIXTURES`.
    pub async fn with_fixtures() -> Self {
        let app = Self::new().await;
        let document = Fixtures::from_json(SHOP_FIXTURES).unwrap();
        fixtures::load(&app.pool, &document).await.unwrap();
        app
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Current jar value of a cookie.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Put a cookie in the jar as if the browser already had it.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(&mut self, path: &str, body: &str) -> TestResponse {
        self.send(Method::POST, path, Some(body.to_string())).await
    }

    /// Log in through the login form and assert it succeeded.
    pub async fn login(&mut self, username: &str, password: &str) {
        let body = format!("username={username}&password={password}&next=");
        let response = self.post_form("/accounts/login/", &body).await;
        assert_eq!(
            response.status,
            StatusCode::FOUND,
            "login as {username} failed: {}",
            response.body
        );
    }

    async fn send(&mut self, method: Method, path: &str, form: Option<String>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(path);

        if !self.cookies.is_empty() {
            let jar = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            request = request.header(header::COOKIE, jar);
        }

        let body = match form {
            Some(form) => {
                request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        self.store_cookies(&headers);

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    fn store_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Some(cookie) = value
                .to_str()
                .ok()
                .and_then(|raw| Cookie::parse(raw.to_string()).ok())
            else {
                continue;
            };

            let removed = cookie.value().is_empty()
                || cookie.max_age().is_some_and(|age| age.is_zero());
            if removed {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }
}
