//! Integration tests for the GXI backend.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p gxi-cli -- migrate
//!
//! # Start the API
//! cargo run -p gxi-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p gxi-integration-tests -- --ignored
//! ```
//!
//! Tests target a live server at `API_BASE_URL` (default
//! `http://localhost:3000`) and register throwaway accounts with random
//! emails so they can run against a shared database.

use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email for one test run.
#[must_use]
pub fn random_email() -> String {
    format!("integration-test-{}@example.com", Uuid::new_v4())
}

/// Assert the `{status, message, ...}` envelope and return the body.
///
/// # Panics
///
/// Panics if the body is not a valid envelope or the status tag differs.
pub fn assert_envelope(body: &Value, expected_status: &str) -> Value {
    assert_eq!(
        body.get("status").and_then(Value::as_str),
        Some(expected_status),
        "unexpected envelope status in {body}"
    );
    assert!(
        body.get("message").and_then(Value::as_str).is_some(),
        "envelope missing message in {body}"
    );
    body.clone()
}

/// Register a throwaway account, returning its email.
///
/// # Panics
///
/// Panics if the registration request fails.
pub async fn register_account(client: &Client) -> String {
    let email = random_email();
    let resp = client
        .post(format!("{}/register", base_url()))
        .json(&serde_json::json!({
            "email": email,
            "first_name": "Integration",
            "last_name": "Test"
        }))
        .send()
        .await
        .expect("Failed to register account");
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    email
}
