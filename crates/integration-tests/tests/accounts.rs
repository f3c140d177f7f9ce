//! Registration, login, logout and the profile page.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use mysite_core::Username;
use mysite_integration_tests::{MANAGER_PASSWORD, TestApp};
use mysite_web::db::{ProfileRepository, UserRepository};

#[tokio::test]
async fn test_register_creates_profile_and_logs_in() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form(
            "/accounts/register/",
            "username=newbie&password1=Str0ng-passphrase&password2=Str0ng-passphrase",
        )
        .await;
    assert_eq!(response.redirect_target(), "/accounts/about-me/");
    assert!(app.cookie("mysite_session").is_some());

    let user = UserRepository::new(app.pool())
        .get_by_username(&Username::parse("newbie").unwrap())
        .await
        .unwrap()
        .unwrap();
    let profile = ProfileRepository::new(app.pool())
        .get_by_user(user.id)
        .await
        .unwrap();
    assert!(profile.is_some());

    let about = app.get("/accounts/about-me/").await;
    assert!(about.body.contains("Username: newbie"));
}

#[tokio::test]
async fn test_register_password_mismatch_is_rerendered() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form(
            "/accounts/register/",
            "username=newbie&password1=Str0ng-passphrase&password2=Other-passphrase",
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("The two password fields didn\u{2019}t match."));
    assert!(
        UserRepository::new(app.pool())
            .get_by_username(&Username::parse("newbie").unwrap())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let mut app = TestApp::with_fixtures().await;

    let response = app
        .post_form(
            "/accounts/register/",
            "username=viewer&password1=Str0ng-passphrase&password2=Str0ng-passphrase",
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("A user with that username already exists."));
}

#[tokio::test]
async fn test_login_page_keeps_next() {
    let mut app = TestApp::new().await;

    let response = app.get("/accounts/login/?next=/shop/orders/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("name=\"next\""));
    assert!(response.body.contains("orders"));
}

#[tokio::test]
async fn test_login_follows_next() {
    let mut app = TestApp::with_fixtures().await;

    let response = app
        .post_form(
            "/accounts/login/",
            &format!("username=manager&password={MANAGER_PASSWORD}&next=%2Fshop%2Forders%2F"),
        )
        .await;

    assert_eq!(response.redirect_target(), "/shop/orders/");
    assert_eq!(app.get("/shop/orders/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let mut app = TestApp::with_fixtures().await;

    let response = app
        .post_form(
            "/accounts/login/",
            &format!(
                "username=manager&password={MANAGER_PASSWORD}&next=https%3A%2F%2Fevil.example%2F"
            ),
        )
        .await;

    assert_eq!(response.redirect_target(), "/accounts/about-me/");
}

#[tokio::test]
async fn test_login_ignores_next_with_control_characters() {
    for next in [
        "%2F%09%2Fevil.example%2F",
        "%2F%0A%2Fevil.example%2F",
        "%2F%20%2Fevil.example%2F",
    ] {
        let mut app = TestApp::with_fixtures().await;

        let response = app
            .post_form(
                "/accounts/login/",
                &format!("username=manager&password={MANAGER_PASSWORD}&next={next}"),
            )
            .await;

        assert_eq!(response.redirect_target(), "/accounts/about-me/", "{next}");
    }
}

#[tokio::test]
async fn test_login_wrong_password_is_rerendered() {
    let mut app = TestApp::with_fixtures().await;

    let response = app
        .post_form("/accounts/login/", "username=manager&password=wrong&next=")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Please enter a correct username and password."));
    assert!(app.cookie("mysite_session").is_none());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let mut app = TestApp::with_fixtures().await;
    app.login("manager", MANAGER_PASSWORD).await;
    assert!(app.get("/accounts/about-me/").await.body.contains("Username: manager"));

    let response = app.post_form("/accounts/logout/", "").await;
    assert_eq!(response.redirect_target(), "/accounts/login/");

    let about = app.get("/accounts/about-me/").await;
    assert!(about.body.contains("User is anonymous"));
    assert_eq!(app.get("/shop/orders/").await.status, StatusCode::FOUND);
}

#[tokio::test]
async fn test_about_me_shows_bio() {
    let mut app = TestApp::with_fixtures().await;
    app.login("manager", MANAGER_PASSWORD).await;

    let response = app.get("/accounts/about-me/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Runs the shop"));
    assert!(response.body.contains("Staff: true"));
}
