//! JSON exports of products and orders.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use mysite_integration_tests::{ADMIN_PASSWORD, MANAGER_PASSWORD, PROFILER_PASSWORD, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_products_export_includes_archived() {
    let mut app = TestApp::with_fixtures().await;

    let response = app.get("/shop/products/export/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(
        response.json(),
        json!({
            "products": [
                {"pk": 1, "name": "Laptop", "price": "1999.00", "archived": false},
                {"pk": 2, "name": "Desktop", "price": "2999.00", "archived": false},
                {"pk": 3, "name": "Smartphone", "price": "999.00", "archived": false},
                {"pk": 4, "name": "Fax", "price": "15.50", "archived": true},
            ]
        })
    );
}

#[tokio::test]
async fn test_products_export_empty() {
    let mut app = TestApp::new().await;

    let response = app.get("/shop/products/export/").await;

    assert_eq!(response.json(), json!({"products": []}));
}

#[tokio::test]
async fn test_orders_export_redirects_anonymous() {
    let mut app = TestApp::with_fixtures().await;

    let response = app.get("/shop/orders/export/").await;

    assert_eq!(
        response.redirect_target(),
        "/accounts/login/?next=/shop/orders/export/"
    );
}

#[tokio::test]
async fn test_orders_export_forbidden_for_non_staff() {
    let mut app = TestApp::with_fixtures().await;
    app.login("profiler", PROFILER_PASSWORD).await;

    let response = app.get("/shop/orders/export/").await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_orders_export_for_staff() {
    let mut app = TestApp::with_fixtures().await;
    app.login("manager", MANAGER_PASSWORD).await;

    let response = app.get("/shop/orders/export/").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);

    let first = &orders[0];
    assert_eq!(first["pk"], 1);
    assert_eq!(first["user_id"], 2);
    assert_eq!(first["promocode"], "SALE123");
    assert_eq!(first["delivery_address"], "1 Main St");
    assert!(first["created_at"].as_str().unwrap().ends_with("+00:00"));
    assert_eq!(
        first["products"],
        json!([
            {"name": "Laptop", "price": "1999.00"},
            {"name": "Smartphone", "price": "999.00"},
        ])
    );

    let second = &orders[1];
    assert_eq!(second["pk"], 2);
    assert_eq!(second["promocode"], "");
    assert_eq!(
        second["products"],
        json!([
            {"name": "Desktop", "price": "2999.00"},
            {"name": "Fax", "price": "15.50"},
        ])
    );
}

#[tokio::test]
async fn test_orders_export_reflects_new_orders() {
    let mut app = TestApp::with_fixtures().await;
    app.login("admin", ADMIN_PASSWORD).await;

    let before = app.get("/shop/orders/export/").await.json();
    assert_eq!(before["orders"].as_array().unwrap().len(), 2);

    app.post_form("/shop/orders/create/", "user=1&promocode=&delivery_address=HQ")
        .await
        .redirect_target();

    let after = app.get("/shop/orders/export/").await.json();
    let orders = after["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 3);
    assert_eq!(orders[2]["user_id"], 1);
    assert_eq!(orders[2]["products"], json!([]));
}
