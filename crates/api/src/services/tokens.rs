//! Session issuer: stateless signed tokens.
//!
//! Access and refresh tokens are HS256 JWTs signed with a single secret
//! loaded at startup. There is no server-side session store and no
//! revocation list; a token is valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use gxi_core::Role;

use crate::config::JwtConfig;
use crate::models::User;

/// What a token is good for. Encoded in the claims so an access check can
/// reject a refresh token presented as an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Claims carried by every signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's numeric ID.
    pub sub: i32,
    pub email: String,
    pub role: Role,
    pub token_use: TokenUse,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

/// An access/refresh pair returned at login. Only the access token is
/// accepted for request authentication.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Errors from signing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),

    /// Bad signature, expired, or otherwise unparseable.
    #[error("invalid token")]
    Invalid,

    /// A structurally valid token presented for the wrong use.
    #[error("wrong token type")]
    WrongTokenUse,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    /// Build a signer from the loaded JWT configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(config.access_ttl_mins),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    /// Issue an access/refresh pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        let access = self.sign(user, TokenUse::Access, self.access_ttl)?;
        let refresh = self.sign(user, TokenUse::Refresh, self.refresh_ttl)?;
        Ok(TokenPair { access, refresh })
    }

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for tampered, expired, or unparseable
    /// tokens, and `TokenError::WrongTokenUse` for a refresh token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.token_use != TokenUse::Access {
            return Err(TokenError::WrongTokenUse);
        }
        Ok(claims)
    }

    fn sign(&self, user: &User, token_use: TokenUse, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.as_str().to_owned(),
            role: user.role,
            token_use,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Sign)
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gxi_core::{Email, UserId};
    use secrecy::SecretString;

    fn signer() -> TokenSigner {
        TokenSigner::new(&JwtConfig {
            secret: SecretString::from("k9#mP2$vL8@qR4!wX7&nT3*zJ6^bH1%d"),
            access_ttl_mins: 15,
            refresh_ttl_days: 7,
        })
    }

    fn user() -> User {
        User {
            id: UserId::new(42),
            email: Email::parse("admin@example.com").unwrap(),
            password_hash: Some("hash".to_string()),
            role: Role::Superadmin,
            first_name: None,
            last_name: None,
            company_name: None,
            street_address: None,
            address_line_2: None,
            city: None,
            state: None,
            zip_code: None,
            phone_number: None,
            is_active: true,
            parent_id: None,
            root_company_id: None,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_access() {
        let signer = signer();
        let pair = signer.issue_pair(&user()).unwrap();

        let claims = signer.verify_access(&pair.access).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, Role::Superadmin);
        assert_eq!(claims.token_use, TokenUse::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let signer = signer();
        let pair = signer.issue_pair(&user()).unwrap();

        let result = signer.verify_access(&pair.refresh);
        assert!(matches!(result, Err(TokenError::WrongTokenUse)));
    }

    #[test]
    fn test_refresh_token_carries_refresh_use() {
        let signer = signer();
        let pair = signer.issue_pair(&user()).unwrap();

        let claims = signer.decode(&pair.refresh).unwrap();
        assert_eq!(claims.token_use, TokenUse::Refresh);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = signer();
        let pair = signer.issue_pair(&user()).unwrap();

        let mut tampered = pair.access;
        tampered.push('x');
        assert!(matches!(
            signer.verify_access(&tampered),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = signer();
        let other = TokenSigner::new(&JwtConfig {
            secret: SecretString::from("f4!jW8#sD2$gK6@hN9%mQ1&rV5*xB3^c"),
            access_ttl_mins: 15,
            refresh_ttl_days: 7,
        });

        let pair = signer.issue_pair(&user()).unwrap();
        assert!(matches!(
            other.verify_access(&pair.access),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_token_ids_are_unique() {
        let signer = signer();
        let pair = signer.issue_pair(&user()).unwrap();
        let access = signer.verify_access(&pair.access).unwrap();
        let refresh = signer.decode(&pair.refresh).unwrap();
        assert_ne!(access.jti, refresh.jti);
    }
}
