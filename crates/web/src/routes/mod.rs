//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database)
//!
//! # Shop
//! GET  /shop/                           - Shop index
//! GET  /shop/products/                  - Active product list
//! GET  /shop/products/create/           - Product form
//! POST /shop/products/create/           - Create product
//! GET  /shop/products/export/           - Product export (JSON)
//! GET  /shop/products/{pk}/             - Product detail
//! GET  /shop/products/{pk}/update/      - Edit form
//! POST /shop/products/{pk}/update/      - Update product
//! GET  /shop/products/{pk}/archive/     - Archive confirmation
//! POST /shop/products/{pk}/archive/     - Archive product
//! GET  /shop/orders/                    - Order list (login required)
//! GET  /shop/orders/create/             - Order form
//! POST /shop/orders/create/             - Create order
//! GET  /shop/orders/export/             - Order export (staff, JSON)
//! GET  /shop/orders/{pk}/               - Order detail (shop.view_order)
//!
//! # Accounts
//! GET  /accounts/register/              - Registration form
//! POST /accounts/register/              - Register and log in
//! GET  /accounts/login/                 - Login form
//! POST /accounts/login/                 - Log in
//! POST /accounts/logout/                - Log out
//! GET  /accounts/about-me/              - Current user
//! GET  /accounts/cookie/set/            - Set the demo cookie (superuser)
//! GET  /accounts/cookie/get/            - Read the demo cookie
//! GET  /accounts/session/set/           - Set the demo session key
//! GET  /accounts/session/get/           - Read the demo session key
//! ```

pub mod accounts;
pub mod demo;
pub mod export;
pub mod health;
pub mod orders;
pub mod products;
pub mod shop;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::state::AppState;

/// URL builders for every routed page.
pub mod paths {
    use mysite_core::{OrderId, ProductId};

    pub const SHOP_INDEX: &str = "/shop/";
    pub const PRODUCT_LIST: &str = "/shop/products/";
    pub const PRODUCT_CREATE: &str = "/shop/products/create/";
    pub const PRODUCTS_EXPORT: &str = "/shop/products/export/";
    pub const ORDER_LIST: &str = "/shop/orders/";
    pub const ORDER_CREATE: &str = "/shop/orders/create/";
    pub const ORDERS_EXPORT: &str = "/shop/orders/export/";
    pub const REGISTER: &str = "/accounts/register/";
    pub const LOGIN: &str = "/accounts/login/";
    pub const LOGOUT: &str = "/accounts/logout/";
    pub const ABOUT_ME: &str = "/accounts/about-me/";

    #[must_use]
    pub fn product_detail(id: ProductId) -> String {
        format!("/shop/products/{id}/")
    }

    #[must_use]
    pub fn product_update(id: ProductId) -> String {
        format!("/shop/products/{id}/update/")
    }

    #[must_use]
    pub fn product_archive(id: ProductId) -> String {
        format!("/shop/products/{id}/archive/")
    }

    #[must_use]
    pub fn order_detail(id: OrderId) -> String {
        format!("/shop/orders/{id}/")
    }
}

/// `302 Found` to `location`.
///
/// Form posts redirect with 302 like the browser-facing convention, rather
/// than the 303 of [`axum::response::Redirect::to`].
pub fn found(location: impl AsRef<str>) -> Response {
    match header::HeaderValue::from_str(location.as_ref()) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(products::list))
        .route(
            "/products/create/",
            get(products::create_page).post(products::create),
        )
        .route("/products/export/", get(export::products))
        .route("/products/{pk}/", get(products::detail))
        .route(
            "/products/{pk}/update/",
            get(products::update_page).post(products::update),
        )
        .route(
            "/products/{pk}/archive/",
            get(products::archive_page).post(products::archive),
        )
        .route("/orders/", get(orders::list))
        .route(
            "/orders/create/",
            get(orders::create_page).post(orders::create),
        )
        .route("/orders/export/", get(export::orders))
        .route("/orders/{pk}/", get(orders::detail))
}

/// Create the accounts routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register/",
            get(accounts::register_page).post(accounts::register),
        )
        .route("/login/", get(accounts::login_page).post(accounts::login))
        .route("/logout/", post(accounts::logout))
        .route("/about-me/", get(accounts::about_me))
        .route("/cookie/set/", get(demo::set_cookie))
        .route("/cookie/get/", get(demo::get_cookie))
        .route("/session/set/", get(demo::set_session))
        .route("/session/get/", get(demo::get_session))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // A nested "/" would only match "/shop", so the index lives here.
        .route(paths::SHOP_INDEX, get(shop::index))
        .nest("/shop", shop_routes())
        .nest("/accounts", account_routes())
}
