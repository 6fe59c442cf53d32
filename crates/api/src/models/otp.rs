//! OTP record domain type.

use chrono::{DateTime, Utc};

use gxi_core::OtpId;

/// A one-time code issued for password recovery.
///
/// Per email at most one record is valid (unconsumed, unexpired) at a time;
/// issuing a new code consumes all prior unconsumed ones.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OtpCode {
    pub id: OtpId,
    /// Normalized email the code was issued for.
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl OtpCode {
    /// Whether this record can still be redeemed at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(consumed: bool, expires_in_secs: i64) -> OtpCode {
        let now = Utc::now();
        OtpCode {
            id: OtpId::new(1),
            email: "a@x.com".to_string(),
            code: "123456".to_string(),
            created_at: now,
            expires_at: now + Duration::seconds(expires_in_secs),
            consumed,
        }
    }

    #[test]
    fn test_valid_when_fresh() {
        let otp = record(false, 600);
        assert!(otp.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_invalid_when_consumed_or_expired() {
        assert!(!record(true, 600).is_valid_at(Utc::now()));
        assert!(!record(false, -1).is_valid_at(Utc::now()));
    }
}
