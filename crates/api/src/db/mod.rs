//! Database operations for the API `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `user_profile` - Accounts, roles, and the ownership forest
//! - `otp_code` - One-time codes for password recovery
//! - `category` - The catalog
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p gxi-cli -- migrate
//! ```
//!
//! Queries use sqlx's runtime API with `FromRow` domain types; uniqueness
//! invariants (case-insensitive email and category name) live in the schema
//! as `lower(...)` unique indexes and surface here as `Conflict`.

pub mod categories;
pub mod otp;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::{CategoryPatch, CategoryRepository};
pub use otp::{IssueOutcome, OtpRepository};
pub use users::{NewRegistration, UserPatch, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Translate a unique-index violation into `Conflict`, leaving other
/// database failures untouched.
fn map_unique_violation(e: sqlx::Error, conflict_message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(conflict_message.to_owned());
    }
    RepositoryError::Database(e)
}
