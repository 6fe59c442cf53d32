//! OTP repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gxi_core::Email;

use super::RepositoryError;
use crate::models::OtpCode;

const OTP_COLUMNS: &str = "id, email, code, created_at, expires_at, consumed";

/// Outcome of an issuance attempt.
#[derive(Debug)]
pub enum IssueOutcome {
    /// A fresh code was stored; any prior valid code is now consumed.
    Issued(OtpCode),
    /// An unconsumed, unexpired code issued within the cooldown window
    /// already exists. Nothing was written.
    Throttled(OtpCode),
}

/// Repository for one-time code storage.
pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Issue a fresh code, invalidating any prior unconsumed codes for the
    /// same email (at most one valid code per email).
    ///
    /// The whole transition runs in one transaction under a per-email
    /// advisory lock, so concurrent requests for the same email serialize:
    /// the cooldown check, the consumption of prior codes, and the insert
    /// cannot interleave with another issuance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn issue(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        cooldown_secs: i64,
    ) -> Result<IssueOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "SELECT {OTP_COLUMNS} FROM otp_code \
             WHERE email = $1 AND NOT consumed AND expires_at > $2 \
             ORDER BY created_at DESC LIMIT 1"
        );
        let existing = sqlx::query_as::<_, OtpCode>(&sql)
            .bind(email)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(existing) = existing
            && (now - existing.created_at).num_seconds() < cooldown_secs
        {
            // Rolls back on drop; nothing was written.
            return Ok(IssueOutcome::Throttled(existing));
        }

        sqlx::query("UPDATE otp_code SET consumed = TRUE WHERE email = $1 AND NOT consumed")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO otp_code (email, code, expires_at) \
             VALUES ($1, $2, $3) RETURNING {OTP_COLUMNS}"
        );
        let record = sqlx::query_as::<_, OtpCode>(&sql)
            .bind(email)
            .bind(code)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(IssueOutcome::Issued(record))
    }

    /// Atomically redeem a code: a single conditional UPDATE marks it
    /// consumed only if it matches, is unconsumed, and is unexpired.
    /// Returns whether a code was redeemed; concurrent double-consume of
    /// the same code cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let redeemed: Option<i32> = sqlx::query_scalar(
            "UPDATE otp_code SET consumed = TRUE \
             WHERE email = $1 AND code = $2 AND NOT consumed AND expires_at > $3 \
             RETURNING id",
        )
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(redeemed.is_some())
    }
}
