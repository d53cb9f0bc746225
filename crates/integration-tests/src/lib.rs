//! End-to-end tests for the Store Ratings API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the database and an admin account
//! sr-cli migrate
//! RATINGS_ADMIN_PASSWORD='Admin@123' sr-cli admin create \
//!     -n "System Administrator Account" -e admin@storerating.com -a "Admin Office"
//!
//! # Start the server with rate limiting off, then run the ignored tests
//! RATINGS_RATE_LIMIT=false cargo run -p store-ratings-server &
//! cargo test -p store-ratings-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `RATINGS_BASE_URL` - Server root (default `http://localhost:5000`)
//! - `RATINGS_TEST_ADMIN_EMAIL` / `RATINGS_TEST_ADMIN_PASSWORD` - Admin login

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// A password that passes the complexity rules.
pub const PASSWORD: &str = "Test#Pass1";

/// HTTP client bound to a running server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        let base_url =
            std::env::var("RATINGS_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".into());
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Absolute URL for an `/api` path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.get(self.url(path)), token)
    }

    #[must_use]
    pub fn post(&self, path: &str, token: Option<&str>, body: &Value) -> RequestBuilder {
        with_token(self.client.post(self.url(path)), token).json(body)
    }

    #[must_use]
    pub fn put(&self, path: &str, token: Option<&str>, body: &Value) -> RequestBuilder {
        with_token(self.client.put(self.url(path)), token).json(body)
    }

    #[must_use]
    pub fn delete(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.delete(self.url(path)), token)
    }

    /// Log in and return the token.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or the login fails.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let resp = self
            .post(
                "/auth/login",
                None,
                &json!({"email": email, "password": password}),
            )
            .send()
            .await
            .expect("Failed to send login request");
        let (status, body) = read(resp).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        token_of(&body)
    }

    /// Token for the admin account named by the environment.
    ///
    /// # Panics
    ///
    /// Panics if the admin cannot log in.
    pub async fn admin_token(&self) -> String {
        let email = std::env::var("RATINGS_TEST_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@storerating.com".into());
        let password =
            std::env::var("RATINGS_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "Admin@123".into());
        self.login(&email, &password).await
    }

    /// Register a fresh `user` account. Returns `(token, user id)`.
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub async fn register_user(&self) -> (String, i64) {
        let resp = self
            .post("/auth/register", None, &account_body(&unique_email("user")))
            .send()
            .await
            .expect("Failed to send register request");
        let (status, body) = read(resp).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        (token_of(&body), id_of(&body["user"]))
    }

    /// Create an account with `role` as admin. Returns `(token, user id)`.
    ///
    /// # Panics
    ///
    /// Panics if creation or login fails.
    pub async fn create_account(&self, admin: &str, role: &str) -> (String, i64) {
        let email = unique_email(role);
        let mut body = account_body(&email);
        body["role"] = json!(role);

        let resp = self
            .post("/users", Some(admin), &body)
            .send()
            .await
            .expect("Failed to send create user request");
        let (status, body) = read(resp).await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");

        let id = id_of(&body["user"]);
        (self.login(&email, PASSWORD).await, id)
    }

    /// Create a store for `owner_id`. Returns the store id.
    ///
    /// # Panics
    ///
    /// Panics if creation fails.
    pub async fn create_store(&self, admin: &str, owner_id: i64) -> i64 {
        let body = json!({
            "name": format!("Sample Store {}", Uuid::new_v4().simple()),
            "email": unique_email("store"),
            "address": "111 Retail Plaza, Shopping District",
            "ownerId": owner_id,
        });
        let resp = self
            .post("/stores", Some(admin), &body)
            .send()
            .await
            .expect("Failed to send create store request");
        let (status, body) = read(resp).await;
        assert_eq!(status, StatusCode::CREATED, "create store failed: {body}");
        id_of(&body["store"])
    }
}

fn with_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Registration body for `email` with valid remaining fields.
#[must_use]
pub fn account_body(email: &str) -> Value {
    json!({
        "name": "Integration Test Account Name",
        "email": email,
        "password": PASSWORD,
        "address": "789 User Lane, Village",
    })
}

/// An email no other test run uses.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// Status and JSON body of a response.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn read(resp: Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = resp.json().await.expect("Response body is not JSON");
    (status, body)
}

fn token_of(body: &Value) -> String {
    body["token"]
        .as_str()
        .expect("Response has no token")
        .to_owned()
}

/// The `id` field of a JSON object.
///
/// # Panics
///
/// Panics if the field is missing.
#[must_use]
pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("Object has no id")
}
