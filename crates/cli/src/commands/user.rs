//! Account management commands.
//!
//! `user activate` is the out-of-band approval step: registrations after
//! the first land inactive, and an operator flips them on here.

use secrecy::SecretString;
use thiserror::Error;

use gxi_api::db::{self, RepositoryError, UserRepository};
use gxi_core::{Email, EmailError};

/// Errors that can occur in account commands.
#[derive(Debug, Error)]
pub enum UserCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No user found with that email")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for UserCommandError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Set the activation flag on the account with the given email.
///
/// # Errors
///
/// Returns `UserCommandError` if the email is malformed, the account does
/// not exist, or the database is unreachable.
pub async fn set_active(raw_email: &str, is_active: bool) -> Result<(), UserCommandError> {
    let email = Email::parse(raw_email)?;
    let pool = connect().await?;

    let repo = UserRepository::new(&pool);
    let user = repo.get_by_email(&email).await?.ok_or(UserCommandError::NotFound)?;
    let user = repo.set_active(user.id, is_active).await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        is_active = user.is_active,
        "Account activation updated"
    );
    Ok(())
}

/// List all accounts, newest first.
///
/// # Errors
///
/// Returns `UserCommandError` if the database is unreachable.
pub async fn list() -> Result<(), UserCommandError> {
    let pool = connect().await?;

    let repo = UserRepository::new(&pool);
    let users = repo.list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<6} {:<36} {:<12} {:<8} {}", "ID", "EMAIL", "ROLE", "ACTIVE", "JOINED");
        for user in users {
            println!(
                "{:<6} {:<36} {:<12} {:<8} {}",
                user.id,
                user.email,
                user.role,
                user.is_active,
                user.date_joined.format("%Y-%m-%d %H:%M"),
            );
        }
    }
    Ok(())
}

async fn connect() -> Result<sqlx::PgPool, UserCommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| UserCommandError::MissingEnvVar("DATABASE_URL"))?;

    db::create_pool(&SecretString::from(database_url))
        .await
        .map_err(UserCommandError::Database)
}
