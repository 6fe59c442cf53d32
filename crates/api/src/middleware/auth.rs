//! Authentication extractor for route handlers.
//!
//! Verifies the bearer token and loads the live user row, so activation
//! changes take effect on the next request even though tokens are stateless.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use gxi_core::UserId;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::services::tokens::TokenError;
use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// Carries the freshly loaded user row; handlers build the presented
/// identity from it and consult the authorization engine for anything
/// beyond "who is this".
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token.".to_string()))?;

        let claims = state.tokens().verify_access(token).map_err(|e| match e {
            TokenError::WrongTokenUse => {
                AppError::Unauthorized("Not an access token.".to_string())
            }
            _ => AppError::Unauthorized("Invalid or expired token.".to_string()),
        })?;

        let repo = UserRepository::new(state.pool());
        let user = repo
            .get_by_id(UserId::new(claims.sub))
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown user.".to_string()))?;

        Ok(Self(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_parsing() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }
}
