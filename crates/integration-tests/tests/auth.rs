//! Authentication flow tests.
//!
//! These tests require a running server (see the crate docs).
//! Run with: `cargo test -p store-ratings-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::json;

use store_ratings_integration_tests::{PASSWORD, TestContext, account_body, read, unique_email};

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_register_login_profile() {
    let ctx = TestContext::new();
    let email = unique_email("flow");

    let resp = ctx
        .post("/auth/register", None, &account_body(&email))
        .send()
        .await
        .expect("Failed to register");
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());

    let token = ctx.login(&email, PASSWORD).await;
    let resp = ctx
        .get("/auth/profile", Some(&token))
        .send()
        .await
        .expect("Failed to get profile");
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email.as_str());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_register_ignores_supplied_role() {
    let ctx = TestContext::new();
    let mut body = account_body(&unique_email("sneaky"));
    body["role"] = json!("admin");

    let resp = ctx
        .post("/auth/register", None, &body)
        .send()
        .await
        .expect("Failed to register");
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_duplicate_email_is_rejected() {
    let ctx = TestContext::new();
    let body = account_body(&unique_email("dup"));

    let first = ctx.post("/auth/register", None, &body).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let resp = ctx.post("/auth/register", None, &body).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_name_length_boundary() {
    let ctx = TestContext::new();

    let mut short = account_body(&unique_email("short"));
    short["name"] = json!("N".repeat(19));
    let resp = ctx.post("/auth/register", None, &short).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "name");

    let mut exact = account_body(&unique_email("exact"));
    exact["name"] = json!("N".repeat(20));
    let resp = ctx.post("/auth/register", None, &exact).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_wrong_password_is_invalid_credentials() {
    let ctx = TestContext::new();
    let email = unique_email("login");
    ctx.post("/auth/register", None, &account_body(&email))
        .send()
        .await
        .unwrap();

    let resp = ctx
        .post(
            "/auth/login",
            None,
            &json!({"email": email, "password": "Wrong#Pass1"}),
        )
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_update_password() {
    let ctx = TestContext::new();
    let email = unique_email("rotate");
    ctx.post("/auth/register", None, &account_body(&email))
        .send()
        .await
        .unwrap();
    let token = ctx.login(&email, PASSWORD).await;

    let resp = ctx
        .put(
            "/auth/update-password",
            Some(&token),
            &json!({"currentPassword": "Nope#Pass1", "newPassword": "Next#Pass2"}),
        )
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Current password is incorrect");

    let resp = ctx
        .put(
            "/auth/update-password",
            Some(&token),
            &json!({"currentPassword": PASSWORD, "newPassword": "Next#Pass2"}),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    ctx.login(&email, "Next#Pass2").await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_gate_messages() {
    let ctx = TestContext::new();

    let resp = ctx.get("/auth/profile", None).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token, authorization denied");

    let resp = ctx
        .get("/auth/profile", Some("not-a-token"))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");

    let (token, _) = ctx.register_user().await;
    let resp = ctx.get("/users", Some(&token)).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");
}
