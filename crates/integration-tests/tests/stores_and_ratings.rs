//! Store browsing, rating submission and owner dashboard tests.
//!
//! These tests require a running server and an admin account (see the crate
//! docs). Run with: `cargo test -p store-ratings-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use store_ratings_integration_tests::{TestContext, id_of, read};

fn find_store(body: &Value, id: i64) -> Value {
    body["stores"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| id_of(s) == id)
        .cloned()
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running server and admin account"]
async fn test_submit_then_overwrite_rating() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (_, owner_id) = ctx.create_account(&admin, "store_owner").await;
    let store_id = ctx.create_store(&admin, owner_id).await;
    let (user, _) = ctx.register_user().await;

    let resp = ctx
        .post("/ratings", Some(&user), &json!({"storeId": store_id, "rating": 3}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Rating submitted successfully");
    let rating_id = id_of(&body["rating"]);

    let resp = ctx
        .post("/ratings", Some(&user), &json!({"storeId": store_id, "rating": 5}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating updated successfully");
    assert_eq!(id_of(&body["rating"]), rating_id);

    let resp = ctx
        .get(&format!("/ratings/store/{store_id}"), Some(&user))
        .send()
        .await
        .unwrap();
    let (_, body) = read(resp).await;
    assert_eq!(body["rating"]["rating"], 5);

    let resp = ctx
        .get(&format!("/stores/{store_id}"), None)
        .send()
        .await
        .unwrap();
    let (_, body) = read(resp).await;
    assert_eq!(body["store"]["ratingCount"], 1);
    assert_eq!(body["store"]["averageRating"], 5.0);
}

#[tokio::test]
#[ignore = "Requires running server and admin account"]
async fn test_rating_validation_and_roles() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (owner, owner_id) = ctx.create_account(&admin, "store_owner").await;
    let store_id = ctx.create_store(&admin, owner_id).await;
    let (user, _) = ctx.register_user().await;

    let resp = ctx
        .post("/ratings", Some(&user), &json!({"storeId": store_id, "rating": 6}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "rating");

    let resp = ctx
        .post("/ratings", Some(&owner), &json!({"storeId": store_id, "rating": 4}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "User access required");

    let resp = ctx
        .post("/ratings", Some(&user), &json!({"storeId": i32::MAX, "rating": 4}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Store not found");
}

#[tokio::test]
#[ignore = "Requires running server and admin account"]
async fn test_rating_deletion_by_other_user_is_forbidden() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (_, owner_id) = ctx.create_account(&admin, "store_owner").await;
    let store_id = ctx.create_store(&admin, owner_id).await;
    let (author, _) = ctx.register_user().await;
    let (other, _) = ctx.register_user().await;

    let resp = ctx
        .post("/ratings", Some(&author), &json!({"storeId": store_id, "rating": 2}))
        .send()
        .await
        .unwrap();
    let (_, body) = read(resp).await;
    let rating_id = id_of(&body["rating"]);

    let resp = ctx
        .delete(&format!("/ratings/{rating_id}"), Some(&other))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = ctx
        .delete(&format!("/ratings/{rating_id}"), Some(&admin))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating deleted successfully");

    let resp = ctx
        .get(&format!("/ratings/store/{store_id}"), Some(&author))
        .send()
        .await
        .unwrap();
    let (_, body) = read(resp).await;
    assert!(body["rating"].is_null());
}

#[tokio::test]
#[ignore = "Requires running server and admin account"]
async fn test_listing_annotations_by_caller() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (_, owner_id) = ctx.create_account(&admin, "store_owner").await;
    let rated = ctx.create_store(&admin, owner_id).await;
    let unrated = ctx.create_store(&admin, owner_id).await;
    let (user, _) = ctx.register_user().await;

    ctx.post("/ratings", Some(&user), &json!({"storeId": rated, "rating": 4}))
        .send()
        .await
        .unwrap();

    let resp = ctx.get("/stores", Some(&user)).send().await.unwrap();
    let (_, body) = read(resp).await;
    assert_eq!(find_store(&body, rated)["userRating"], 4);
    assert!(find_store(&body, unrated).get("userRating").is_none());
    assert!(find_store(&body, unrated)["averageRating"].is_null());

    let resp = ctx.get("/stores", None).send().await.unwrap();
    let (_, body) = read(resp).await;
    assert!(find_store(&body, rated).get("userRating").is_none());

    // An expired or forged token on an optional route is treated as anonymous.
    let resp = ctx.get("/stores", Some("forged")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and admin account"]
async fn test_store_name_filter_is_case_insensitive() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (_, owner_id) = ctx.create_account(&admin, "store_owner").await;
    ctx.create_store(&admin, owner_id).await;

    let resp = ctx.get("/stores?name=sample", None).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::OK);

    let stores = body["stores"].as_array().unwrap();
    assert!(!stores.is_empty());
    assert_eq!(body["count"], stores.len());
    assert!(
        stores
            .iter()
            .all(|s| s["name"].as_str().unwrap().to_lowercase().contains("sample"))
    );
}

#[tokio::test]
#[ignore = "Requires running server and admin account"]
async fn test_store_owner_must_have_owner_role() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (_, user_id) = ctx.register_user().await;

    let body = json!({
        "name": "Store With The Wrong Owner",
        "email": store_ratings_integration_tests::unique_email("store"),
        "address": "4 Wrong Way",
        "ownerId": user_id,
    });
    let resp = ctx.post("/stores", Some(&admin), &body).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid store owner ID");
}

#[tokio::test]
#[ignore = "Requires running server and admin account"]
async fn test_owner_dashboard() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (owner, owner_id) = ctx.create_account(&admin, "store_owner").await;
    let rated = ctx.create_store(&admin, owner_id).await;
    ctx.create_store(&admin, owner_id).await;
    let (user, _) = ctx.register_user().await;

    ctx.post("/ratings", Some(&user), &json!({"storeId": rated, "rating": 4}))
        .send()
        .await
        .unwrap();

    let resp = ctx
        .get("/stores/owner/dashboard", Some(&owner))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stores"].as_array().unwrap().len(), 2);
    assert_eq!(body["ratingUsers"][0]["rating"], 4);
    assert_eq!(body["overallAverageRating"], 2.0);

    let resp = ctx
        .get("/stores/owner/dashboard", Some(&user))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Store owner access required");
}
