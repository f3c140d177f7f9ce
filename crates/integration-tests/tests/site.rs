//! Health checks, the shop index and the shared helpers.

use axum::http::StatusCode;
use mysite_integration_tests::TestApp;
use mysite_web::utils::add_two_numbers;

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new().await;

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness() {
    let mut app = TestApp::new().await;

    let response = app.get("/health/ready").await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_shop_index() {
    let mut app = TestApp::new().await;

    let response = app.get("/shop/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Laptop"));
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let mut app = TestApp::new().await;

    let response = app.get("/nowhere/").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_add_two_numbers() {
    assert_eq!(add_two_numbers(2, 3), 5);
    assert_eq!(add_two_numbers(-4, 4), 0);
}
