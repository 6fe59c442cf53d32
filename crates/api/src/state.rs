//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::{AccountService, EmailService, OtpService, TokenSigner};

/// Application state shared across all handlers.
///
/// Cheap to clone; the inner data is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    tokens: TokenSigner,
    accounts: AccountService,
    otp: OtpService,
}

impl AppState {
    /// Build the application state, wiring services from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(
        config: ApiConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let email = EmailService::new(&config.email)?;
        let tokens = TokenSigner::new(&config.jwt);
        let otp = OtpService::new(pool.clone(), config.otp, email.clone());
        let accounts =
            AccountService::new(pool.clone(), email, tokens.clone(), otp.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                tokens,
                accounts,
                otp,
            }),
        })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }

    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    #[must_use]
    pub fn otp(&self) -> &OtpService {
        &self.inner.otp
    }
}
