//! End-to-end tests for registration and login.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p gxi-api)
//!
//! Run with: cargo test -p gxi-integration-tests -- --ignored

use gxi_integration_tests::{assert_envelope, base_url, client, random_email, register_account};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_returns_created_with_profile() {
    let client = client();
    let email = random_email();

    let resp = client
        .post(format!("{}/register", base_url()))
        .json(&json!({
            "email": email,
            "first_name": "Integration",
            "last_name": "Test"
        }))
        .send()
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let body = assert_envelope(&body, "success");

    let data = body.get("data").expect("registration returns a profile");
    assert_eq!(data.get("email").and_then(Value::as_str), Some(email.as_str()));
    // The hash must never leak
    assert!(data.get("password_hash").is_none());
    assert!(data.get("password").is_none());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_duplicate_email_rejected_case_insensitively() {
    let client = client();
    let email = register_account(&client).await;

    let resp = client
        .post(format!("{}/register", base_url()))
        .json(&json!({ "email": email.to_uppercase() }))
        .send()
        .await
        .expect("Failed to re-register");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_envelope(&body, "error");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_unknown_email_is_not_found() {
    let client = client();

    let resp = client
        .post(format!("{}/login", base_url()))
        .json(&json!({
            "email": random_email(),
            "password": "whatever"
        }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_pending_account_is_forbidden_before_bad_password() {
    let client = client();
    // Registrations after the bootstrap superadmin land inactive
    let email = register_account(&client).await;

    // The inactive check must win even though this password is wrong too
    let resp = client
        .post(format!("{}/login", base_url()))
        .json(&json!({ "email": email, "password": "definitely-wrong" }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server, database, and a superadmin login in env"]
async fn test_superadmin_login_returns_token_pair() {
    // Provide the bootstrap superadmin credentials when running
    let Ok(email) = std::env::var("TEST_SUPERADMIN_EMAIL") else {
        return;
    };
    let Ok(password) = std::env::var("TEST_SUPERADMIN_PASSWORD") else {
        return;
    };

    let client = client();
    let resp = client
        .post(format!("{}/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let body = assert_envelope(&body, "success");

    let token = &body["data"]["token"];
    assert!(token.get("access").and_then(Value::as_str).is_some());
    assert!(token.get("refresh").and_then(Value::as_str).is_some());

    // The access token opens the user listing
    let access = token["access"].as_str().expect("access token");
    let resp = client
        .get(format!("{}/users", base_url()))
        .bearer_auth(access)
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_users_listing_requires_bearer_token() {
    let client = client();

    let resp = client
        .get(format!("{}/users", base_url()))
        .send()
        .await
        .expect("Failed to request users");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
