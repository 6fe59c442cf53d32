//! One-time code issuance and verification for password recovery.
//!
//! Per email the code lifecycle is: none → issued → (verified | expired),
//! where a re-request collapses back to issued by consuming the prior code.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use gxi_core::Email;

use crate::config::OtpConfig;
use crate::db::{IssueOutcome, OtpRepository};
use crate::error::AppError;
use crate::models::OtpCode;
use crate::services::EmailService;

/// OTP issuance and redemption.
#[derive(Clone)]
pub struct OtpService {
    pool: PgPool,
    config: OtpConfig,
    email: EmailService,
}

impl OtpService {
    /// Create a new OTP service.
    #[must_use]
    pub const fn new(pool: PgPool, config: OtpConfig, email: EmailService) -> Self {
        Self {
            pool,
            config,
            email,
        }
    }

    /// Issue a fresh code for an email and dispatch it in the background.
    ///
    /// Succeeds whether or not an account exists for the email, so the
    /// endpoint cannot be used to enumerate accounts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::TooManyRequests` while a valid code issued within
    /// the cooldown window exists.
    pub async fn request(&self, email: &Email) -> Result<(), AppError> {
        let repo = OtpRepository::new(&self.pool);
        let now = Utc::now();
        let code = generate_otp_code();
        let expires_at = now + Duration::minutes(self.config.ttl_mins);

        // The repository decides issued-vs-throttled under a per-email lock,
        // so two simultaneous requests cannot both mint a code.
        let issued = match repo
            .issue(email, &code, now, expires_at, self.config.cooldown_secs)
            .await?
        {
            IssueOutcome::Issued(issued) => issued,
            IssueOutcome::Throttled(existing) => {
                let wait =
                    cooldown_remaining(&existing, now, self.config.cooldown_secs).unwrap_or(1);
                return Err(AppError::TooManyRequests(format!(
                    "An OTP was sent recently. Try again in {wait} seconds."
                )));
            }
        };

        self.email.send_otp_code_in_background(email, &issued.code);

        tracing::info!(email = %email, "OTP issued");
        Ok(())
    }

    /// Redeem a code. Consuming: a verified code cannot be used again.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidOrExpiredOtp` on mismatch, expiry, or reuse.
    pub async fn verify(&self, email: &Email, code: &str) -> Result<(), AppError> {
        let repo = OtpRepository::new(&self.pool);
        let redeemed = repo.consume(email, code, Utc::now()).await?;

        if !redeemed {
            return Err(AppError::InvalidOrExpiredOtp);
        }

        tracing::info!(email = %email, "OTP verified");
        Ok(())
    }
}

/// Seconds left before a new code may be requested, or `None` when the
/// cooldown has elapsed.
fn cooldown_remaining(existing: &OtpCode, now: DateTime<Utc>, cooldown_secs: i64) -> Option<i64> {
    let elapsed = (now - existing.created_at).num_seconds();
    let remaining = cooldown_secs - elapsed;
    (remaining > 0).then_some(remaining)
}

/// Generate a 6-digit recovery code.
#[must_use]
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gxi_core::OtpId;

    fn issued_at(secs_ago: i64) -> OtpCode {
        let now = Utc::now();
        OtpCode {
            id: OtpId::new(1),
            email: "a@x.com".to_string(),
            code: "123456".to_string(),
            created_at: now - Duration::seconds(secs_ago),
            expires_at: now + Duration::minutes(10),
            consumed: false,
        }
    }

    #[test]
    fn test_generate_otp_code_format() {
        let code = generate_otp_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_otp_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_otp_code().parse().expect("valid number");
            assert!(code >= 100_000);
            assert!(code < 1_000_000);
        }
    }

    #[test]
    fn test_cooldown_active_just_after_issue() {
        let existing = issued_at(10);
        let remaining = cooldown_remaining(&existing, Utc::now(), 60);
        assert!(matches!(remaining, Some(wait) if wait > 0 && wait <= 50));
    }

    #[test]
    fn test_cooldown_elapsed() {
        let existing = issued_at(61);
        assert_eq!(cooldown_remaining(&existing, Utc::now(), 60), None);
    }

    #[test]
    fn test_cooldown_boundary() {
        let now = Utc::now();
        let existing = OtpCode {
            created_at: now - Duration::seconds(60),
            ..issued_at(0)
        };
        assert_eq!(cooldown_remaining(&existing, now, 60), None);
    }
}
