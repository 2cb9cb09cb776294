mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, response_text, TestApp, ADMIN_EMAIL};
use serde_json::json;

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "ADMIN@demo.com", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 24 * 3600);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "nobody@demo.com", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_requires_valid_token() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/proposals", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Unauthorized");

    let response = app
        .request(Method::GET, "/api/routines/stakeholders", None, Some("not.a.token"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/routines/stakeholders", None, Some(app.token()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_returns_token_claims() {
    let app = TestApp::new().await;

    let body = app.get_json("/api/auth/me").await;
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["name"], "Administrator");
    assert!(body["exp"].as_i64().unwrap() > body["iat"].as_i64().unwrap());
}

#[tokio::test]
async fn test_banner_is_public() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response_text(response).await.contains("running"));
}
