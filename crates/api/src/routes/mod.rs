//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Accounts (rate limited per IP)
//! POST /register               - Register (first user bootstraps superadmin)
//! POST /login                  - Login, returns access + refresh tokens
//! POST /otp/request            - Issue a password recovery code
//! POST /otp/verify             - Verify a recovery code (consuming)
//! POST /password/forgot        - Reset password with a recovery code
//!
//! # Users (bearer token required)
//! GET    /users                - List visible users
//! GET    /users/{id}           - User detail
//! PATCH  /users/{id}           - Partial update (superadmin or parent)
//! DELETE /users/{id}           - Delete (superadmin or parent)
//!
//! # Categories (reads open, writes superadmin only)
//! GET    /categories           - List categories
//! GET    /categories/{id}      - Category detail
//! POST   /categories           - Create
//! PATCH  /categories/{id}      - Partial update
//! DELETE /categories/{id}      - Delete
//! ```
//!
//! Every JSON response uses the `{status, message, data?}` envelope.
//! Trailing slashes are normalized away before routing.

pub mod auth;
pub mod categories;
pub mod health;
pub mod otp;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the account routes router (registration, login, recovery).
///
/// These are the unauthenticated endpoints, so they all sit behind the
/// per-IP rate limiter.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/otp/request", post(otp::request))
        .route("/otp/verify", post(otp::verify))
        .route("/password/forgot", post(auth::forgot_password))
        .layer(auth_rate_limiter())
}

/// Create the user management routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route(
            "/{id}",
            get(users::show).patch(users::update).delete(users::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .patch(categories::update)
                .delete(categories::delete),
        )
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .merge(account_routes())
        .nest("/users", user_routes())
        .nest("/categories", category_routes())
}
