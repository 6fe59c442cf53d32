//! Account route handlers: registration, login, and password reset.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use gxi_core::Email;

use crate::db::NewRegistration;
use crate::error::AppError;
use crate::models::{UserProfile, UserSummary};
use crate::response::ApiResponse;
use crate::services::tokens::TokenPair;
use crate::state::AppState;

/// Registration request body. Only the email is required; the server
/// generates the initial password.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub street_address: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response payload: the session tokens plus a slim identity
/// summary (the full profile lives behind `GET /users/{id}`).
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: TokenPair,
    pub user: UserSummary,
}

/// Password reset request body.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Register an account.
///
/// The first account in an empty store becomes an active superadmin; later
/// registrations are inactive customers awaiting approval. The generated
/// password arrives by email.
///
/// # Errors
///
/// Returns 400 for a malformed or already-registered email.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = parse_email(&body.email)?;
    let profile = NewRegistration {
        first_name: body.first_name,
        last_name: body.last_name,
        company_name: body.company_name,
        street_address: body.street_address,
        address_line_2: body.address_line_2,
        city: body.city,
        state: body.state,
        zip_code: body.zip_code,
        phone_number: body.phone_number,
    };

    let user = state.accounts().register(&email, &profile).await?;

    let message = if user.is_active {
        "Registration successful."
    } else {
        "Registration successful. Your account is pending admin approval."
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(message, UserProfile::from(&user))),
    ))
}

/// Log in and receive an access/refresh token pair.
///
/// # Errors
///
/// Returns 404 when no account matches the email, 403 when the account is
/// inactive, and 401 when the password is wrong — in that order.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = parse_email(&body.email)?;
    let (user, token) = state.accounts().login(&email, &body.password).await?;

    Ok(Json(ApiResponse::success(
        "Login successful.",
        LoginData {
            token,
            user: UserSummary::from(&user),
        },
    )))
}

/// Reset a password with a previously issued recovery code.
///
/// # Errors
///
/// Returns 400 for missing fields, mismatched confirmation, or a bad code
/// (the field checks run first), and 404 when no account matches the email.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = parse_email(&body.email)?;
    state
        .accounts()
        .forgot_password(&email, &body.otp, &body.password, &body.confirm_password)
        .await?;

    Ok(Json(ApiResponse::message("Password reset successfully.")))
}

/// Parse a request email, surfacing the failure as a validation error.
pub fn parse_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(|e| AppError::Validation(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gxi_core::{Role, UserId};

    use crate::models::User;

    #[test]
    fn test_login_payload_is_a_slim_summary() {
        let user = User {
            id: UserId::new(7),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: Some("hash".to_string()),
            role: Role::Customer,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            company_name: Some("Analytical Engines".to_string()),
            street_address: Some("1 Engine Way".to_string()),
            address_line_2: None,
            city: Some("London".to_string()),
            state: None,
            zip_code: None,
            phone_number: None,
            is_active: true,
            parent_id: None,
            root_company_id: None,
            date_joined: Utc::now(),
        };
        let data = LoginData {
            token: TokenPair {
                access: "access".to_string(),
                refresh: "refresh".to_string(),
            },
            user: UserSummary::from(&user),
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["user"]["full_name"], "Ada Lovelace");
        assert_eq!(json["user"]["role"], "customer");
        // Identity only; the address block stays on the profile endpoint
        assert!(json["user"].get("street_address").is_none());
        assert!(json["user"].get("company_name").is_none());
        assert!(json["user"].get("is_active").is_none());
    }
}
